use itertools::Itertools;
use log::debug;
use ndarray::iter::Iter;
use ndarray::{ArrayView2, Ix2};
use ordered_float::OrderedFloat;

use crate::{CbctVolume, Orientation, VolumeResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 不可变、借用的二维切片.
///
/// 行对应切片的第二个轴, 列对应第一个轴; 按行优先迭代时第一个轴变化最快.
#[derive(Clone, Debug)]
pub struct SliceView<'a> {
    orientation: Orientation,
    index: usize,

    /// 底层数据的轻量级视图, 借用于 [`crate::CbctVolume`]. 形状为 `(height, width)`.
    data: ArrayView2<'a, f32>,
}

impl<'a> SliceView<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(orientation: Orientation, index: usize, data: ArrayView2<'a, f32>) -> Self {
        Self {
            orientation,
            index,
            data,
        }
    }

    /// 切片方向.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// 切片在其法向轴上的索引.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 获得数据的一份不可变 shallow copy, 形状为 `(height, width)`.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 按行优先序迭代采样.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 获取第 `row` 行、第 `col` 列的采样. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        self.data.get((row, col)).copied()
    }

    /// 切片宽 (第一个轴的长度).
    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// 切片高 (第二个轴的长度).
    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// 克隆自己, 获得一个拥有所有权的切片对象.
    pub fn to_owned(&self) -> Slice {
        Slice {
            orientation: self.orientation,
            index: self.index,
            width: self.width(),
            height: self.height(),
            samples: self.data.iter().copied().collect(),
        }
    }
}

/// 拥有所有权的二维切片. 与来源体数据不共享任何可变状态.
///
/// `samples` 以行优先序存储, 长度恒为 `width * height`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSlice"))]
pub struct Slice {
    orientation: Orientation,
    index: usize,
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

/// 反序列化的中间形态, 校验 `samples.len() == width * height` 后才成为 [`Slice`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawSlice {
    orientation: Orientation,
    index: usize,
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSlice> for Slice {
    type Error = crate::VolumeError;

    fn try_from(raw: RawSlice) -> VolumeResult<Self> {
        let expected = raw.width.checked_mul(raw.height);
        if expected != Some(raw.samples.len()) {
            return Err(crate::VolumeError::ShapeMismatch {
                expected: expected.unwrap_or(usize::MAX),
                actual: raw.samples.len(),
            });
        }
        Ok(Self {
            orientation: raw.orientation,
            index: raw.index,
            width: raw.width,
            height: raw.height,
            samples: raw.samples,
        })
    }
}

impl Slice {
    /// 切片方向.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// 切片在其法向轴上的索引.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 切片宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// 切片高.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// 行优先的全部采样.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// 获取第 `row` 行、第 `col` 列的采样. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        (col < self.width && row < self.height).then(|| self.samples[row * self.width + col])
    }

    /// 逐行迭代.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // `width == 0` 时 `chunks_exact` 会 panic.
        self.samples.chunks_exact(self.width.max(1))
    }

    /// 采样的 `(min, max)`, 忽略 NaN. 没有有效采样时返回 `None`.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .filter(|v| !v.is_nan())
            .map(|&v| OrderedFloat(v))
            .minmax()
            .into_option()
            .map(|(lo, hi)| (lo.0, hi.0))
    }
}

/// 提取 `volume` 在 `orientation` 方向第 `index` 层的切片.
///
/// - 轴位: 形状 `(x, y)`, `sample[j * x + i] = volume.get(i, j, index)`.
/// - 冠状: 形状 `(x, z)`, `sample[k * x + i] = volume.get(i, index, k)`.
/// - 矢状: 形状 `(y, z)`, `sample[k * y + j] = volume.get(index, j, k)`.
///
/// `index` 越界时返回 [`crate::VolumeError::IndexOutOfRange`].
pub fn extract(volume: &CbctVolume, orientation: Orientation, index: usize) -> VolumeResult<Slice> {
    let view = volume.view_along(orientation, index)?;
    debug!(
        "extract {orientation} #{index}: {}x{}",
        view.width(),
        view.height()
    );
    Ok(view.to_owned())
}

/// 按升序提取 `orientation` 方向的全部切片.
#[inline]
pub fn extract_all(
    volume: &CbctVolume,
    orientation: Orientation,
) -> impl ExactSizeIterator<Item = Slice> + '_ {
    volume.slice_iter(orientation).map(|v| v.to_owned())
}

/// 借助 `rayon`, 并行地提取 `orientation` 方向的全部切片. 结果仍按索引升序排列.
#[cfg(feature = "rayon")]
pub fn par_extract_all(volume: &CbctVolume, orientation: Orientation) -> Vec<Slice> {
    use ndarray::parallel::prelude::*;

    volume
        .data()
        .axis_iter(orientation.axis())
        .into_par_iter()
        .enumerate()
        .map(|(index, data)| SliceView::new(orientation, index, data).to_owned())
        .collect()
}
