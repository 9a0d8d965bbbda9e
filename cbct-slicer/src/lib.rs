#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 C 臂 CBCT 重建体数据的多平面切片提取、HU 灰度映射,
//! 以及基于矩形区域统计的图像质量指标.
//!
//! 该 crate 目前仅提供 `safe` 接口. 所有调用方可控的越界/非法输入都以
//! [`VolumeError`] 返回, 不会 panic.
//!
//! # 注意
//!
//! 1. 该 crate 不做真实的锥束重建 (FDK 等), 也不读写真实的 DICOM/NIfTI 二进制格式.
//!   重建体由外部 (或 [`Phantom`]) 直接提供.
//! 2. 体数据一经构建即只读. 所有组件只持有共享引用, 因此不需要任何锁.
//!
//! # 开发计划
//!
//! ### 重建体与三方向切片提取 ✅
//!
//! 体素按 `k * x * y + j * x + i` 线性存储. 轴位/冠状/矢状三个方向的输出顺序
//! 均为 "第一个轴变化最快" 的行优先序.
//!
//! 实现位于 `cbct-slicer/src/data`.
//!
//! ### HU -> 8-bit 灰度显示 ✅
//!
//! 固定的空气/骨窗 (-1000 HU 到 1000 HU), 线性映射到 0..=255, 按 RGBA 输出.
//!
//! 实现位于 `cbct-slicer/src/data/window.rs` 与 `cbct-slicer/src/data/display.rs`.
//!
//! ### 矩形区域统计 ✅
//!
//! 步长 (stride) 由 [`PlaneLayout`] 显式给出. 旧版固定 256 步长仅作兼容.
//!
//! 实现位于 `cbct-slicer/src/stats`.
//!
//! ### 质量指标 ✅
//!
//! SNR, CNR 由区域统计组合得到. 伪影评分和分辨率目前仍是占位实现,
//! 但以 trait 的形式留出了真实算法的接入点.
//!
//! 实现位于 `cbct-slicer/src/quality`.
//!
//! ### 十字光标导航 ✅
//!
//! 实现位于 `cbct-slicer/src/navigator.rs`.
//!
//! ### 导出包与会话 ✅
//!
//! 1. DICOM 风格 (轴位切片序列), NIfTI 风格 (整体体数据), raw 三种导出包. ✅
//! 2. raw 包可落盘为 `.npy`. ✅
//! 3. 用 [`ReconSession`] 替代全局状态. ✅

/// 三维体素索引 `(i, j, k)`, 分别沿 x, y, z 方向.
pub type Idx3d = (usize, usize, usize);

/// 平面上的连续坐标 `(x, y)`, 用于测量工具.
pub type Point2d = (f64, f64);

pub mod consts;

mod error;

pub use error::{VolumeError, VolumeResult};

/// 重建体数据结构.
mod data;

pub use data::{
    extract, extract_all, to_display_image, CbctVolume, Dimensions, DisplayImage, HuWindow,
    ImgWriteVis, Orientation, Phantom, ReconParams, Slice, SliceView,
};

#[cfg(feature = "rayon")]
pub use data::par_extract_all;

pub mod stats;

pub use stats::{compute_region, PlaneLayout, Region, RegionStats};

pub mod quality;

pub use quality::{QualityConfig, QualityMetrics, QualityReport};

pub mod navigator;

pub use navigator::{CrosshairNavigator, CrosshairPosition, SliceIndices};

pub mod measure;

pub mod export;

pub use export::{ExportBundle, ExportFormat};

mod session;

pub use session::ReconSession;

pub mod prelude;
