use std::path::Path;

use image::RgbaImage;

use super::{HuWindow, Slice};
use crate::consts::gray::OPAQUE;
use crate::{VolumeError, VolumeResult};

/// 可直接显示的 RGBA 图像. 每个像素 4 个交错的 `u8` 通道.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl DisplayImage {
    /// 图像宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 图像高.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// 交错的 RGBA 数据, 长度为 `width * height * 4`.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 获取第 `row` 行、第 `col` 列的 RGBA 值. 越界时返回 `None`.
    pub fn pixel(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let start = (row * self.width + col) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[start..start + 4]);
        Some(px)
    }

    /// 转为 `image` crate 的 RGBA 图像.
    ///
    /// 尺寸超出 `u32` 时返回 `None`.
    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        let w = u32::try_from(self.width).ok()?;
        let h = u32::try_from(self.height).ok()?;
        RgbaImage::from_raw(w, h, self.pixels)
    }

    /// 以 RGBA 格式保存到 `path`. 格式由扩展名决定.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> VolumeResult<()> {
        let (w, h) = image_size(self.width, self.height)?;
        image::save_buffer(path, &self.pixels, w, h, image::ColorType::Rgba8)?;
        Ok(())
    }
}

/// `image` 以 `u32` 表示尺寸.
pub(crate) fn image_size(width: usize, height: usize) -> VolumeResult<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(VolumeError::ImageTooLarge { width, height }),
    }
}

/// 将切片按固定空气/骨窗转换为 RGBA 显示图像.
///
/// R, G, B 三个通道取同一灰度值, A 恒为 255. 遇到第一个非有限采样即返回
/// [`VolumeError::InvalidSample`], 不产生部分结果.
pub fn to_display_image(slice: &Slice) -> VolumeResult<DisplayImage> {
    const WINDOW: HuWindow = HuWindow::air_to_bone();

    let mut pixels = Vec::with_capacity(slice.samples().len() * 4);
    for (index, &value) in slice.samples().iter().enumerate() {
        let gray = WINDOW
            .eval(value)
            .ok_or(VolumeError::InvalidSample { index, value })?;
        pixels.extend_from_slice(&[gray, gray, gray, OPAQUE]);
    }
    Ok(DisplayImage {
        width: slice.width(),
        height: slice.height(),
        pixels,
    })
}
