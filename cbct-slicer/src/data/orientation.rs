use std::fmt;
use std::str::FromStr;

use ndarray::Axis;

use crate::data::Dimensions;
use crate::VolumeError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 切片方向. 三个正交解剖平面之一.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// 固定 z, 平面为 `(x, y)`.
    Axial,

    /// 固定 y, 平面为 `(x, z)`.
    Coronal,

    /// 固定 x, 平面为 `(y, z)`.
    Sagittal,
}

impl Orientation {
    /// 全部方向, 按 轴位/冠状/矢状 排列.
    pub const ALL: [Orientation; 3] = [Self::Axial, Self::Coronal, Self::Sagittal];

    /// 在 `(z, y, x)` 存储中被固定的轴.
    #[inline]
    pub(crate) const fn axis(&self) -> Axis {
        match self {
            Self::Axial => Axis(0),
            Self::Coronal => Axis(1),
            Self::Sagittal => Axis(2),
        }
    }

    /// 该方向切片的 `(width, height)`.
    #[inline]
    pub const fn slice_shape(&self, dims: Dimensions) -> (usize, usize) {
        match self {
            Self::Axial => (dims.x, dims.y),
            Self::Coronal => (dims.x, dims.z),
            Self::Sagittal => (dims.y, dims.z),
        }
    }

    /// 该方向合法索引的上界 (不含).
    #[inline]
    pub const fn len(&self, dims: Dimensions) -> usize {
        match self {
            Self::Axial => dims.z,
            Self::Coronal => dims.y,
            Self::Sagittal => dims.x,
        }
    }

    /// 小写标签.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Axial => "axial",
            Self::Coronal => "coronal",
            Self::Sagittal => "sagittal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = VolumeError;

    /// 不区分大小写. 其它任何标签都返回 [`VolumeError::InvalidOrientation`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VolumeError::InvalidOrientation(s.to_owned()))
    }
}
