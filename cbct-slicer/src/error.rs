//! 运行时错误.

use crate::{Dimensions, Orientation, Region};

/// 体数据访问、切片提取、区域统计与导出的运行时错误.
///
/// 所有错误都是同步、局部的. 计算是确定性的, 因此在输入不变的情况下重试没有意义.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// 体素坐标超出体数据范围.
    #[error("voxel ({i}, {j}, {k}) is outside volume {dims}")]
    OutOfBounds {
        /// x 方向坐标.
        i: usize,
        /// y 方向坐标.
        j: usize,
        /// z 方向坐标.
        k: usize,
        /// 体数据尺寸.
        dims: Dimensions,
    },

    /// 无法识别的切片方向标签.
    #[error("unknown slice orientation `{0}`")]
    InvalidOrientation(String),

    /// 切片索引不在该方向的合法范围 `[0, len)` 内.
    #[error("{orientation} slice index {index} is outside [0, {len})")]
    IndexOutOfRange {
        /// 切片方向.
        orientation: Orientation,
        /// 请求的索引. 允许为负, 以便原样报告导航层传入的值.
        index: i64,
        /// 该方向的切片个数.
        len: usize,
    },

    /// 面积为零的统计区域.
    #[error("statistics region {0:?} is empty")]
    EmptyRegion(Region),

    /// 统计区域超出平面布局或体素缓冲区.
    #[error("statistics region {region:?} exceeds plane (stride {stride}, offset {offset}) of {len} voxels")]
    RegionOutOfBounds {
        /// 请求的区域.
        region: Region,
        /// 平面行宽.
        stride: usize,
        /// 平面起点的线性偏移.
        offset: usize,
        /// 体素总数.
        len: usize,
    },

    /// 非有限 (NaN, inf) 的采样值到达了灰度映射.
    #[error("sample #{index} is not finite ({value})")]
    InvalidSample {
        /// 采样在切片中的线性位置.
        index: usize,
        /// 采样值.
        value: f32,
    },

    /// 无法识别的导出格式标签.
    #[error("unknown export format `{0}`")]
    UnknownExportFormat(String),

    /// 体素个数与尺寸不一致.
    #[error("expected {expected} voxels for the given dimensions, got {actual}")]
    ShapeMismatch {
        /// `x * y * z`.
        expected: usize,
        /// 实际提供的体素个数.
        actual: usize,
    },

    /// 图像宽或高超出 `u32`, 无法编码.
    #[error("image of {width}x{height} pixels is too large to encode")]
    ImageTooLarge {
        /// 图像宽.
        width: usize,
        /// 图像高.
        height: usize,
    },

    /// 图像编码错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// `.npy` 写出错误.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// 其他底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 导出包编码错误.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

/// 体数据相关操作的结果类型.
pub type VolumeResult<T> = Result<T, VolumeError>;
