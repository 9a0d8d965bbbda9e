//! 切片的持久化存储.

use std::path::Path;

use super::{Slice, SliceView};
use crate::data::display::image_size;
use crate::{HuWindow, VolumeError, VolumeResult};

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 以 HU 值存储的切片在保存时会用固定的空气/骨窗规范化为 8-bit 灰度图.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径. 格式由扩展名决定.
    fn save<P: AsRef<Path>>(&self, path: P) -> VolumeResult<()>;
}

/// 将行优先的 HU 采样写成灰度图.
fn save_gray<'a, I, P>(samples: I, width: usize, height: usize, path: P) -> VolumeResult<()>
where
    I: IntoIterator<Item = &'a f32>,
    P: AsRef<Path>,
{
    const WINDOW: HuWindow = HuWindow::air_to_bone();

    let (w, h) = image_size(width, height)?;
    let mut buf = image::GrayImage::new(w, h);
    for ((index, &value), px) in samples.into_iter().enumerate().zip(buf.pixels_mut()) {
        let gray = WINDOW
            .eval(value)
            .ok_or(VolumeError::InvalidSample { index, value })?;
        *px = image::Luma([gray]);
    }
    buf.save(path)?;
    Ok(())
}

/// 空气/骨窗: 窗位 0, 窗宽 2000.
impl ImgWriteVis for Slice {
    fn save<P: AsRef<Path>>(&self, path: P) -> VolumeResult<()> {
        save_gray(self.samples(), self.width(), self.height(), path)
    }
}

/// 空气/骨窗: 窗位 0, 窗宽 2000.
impl ImgWriteVis for SliceView<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> VolumeResult<()> {
        save_gray(self.iter(), self.width(), self.height(), path)
    }
}
