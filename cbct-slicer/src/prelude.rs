//! 🩻欢迎光临🩻
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Point2d};

pub use crate::data::slice::{ImgWriteVis, Slice, SliceView};
pub use crate::data::{
    extract, extract_all, to_display_image, CbctVolume, Dimensions, DisplayImage, HuWindow,
    Orientation, Phantom, ReconParams,
};

#[cfg(feature = "rayon")]
pub use crate::data::par_extract_all;

pub use crate::consts::hu::{AIR, DENSE_BONE, WATER};

pub use crate::stats::{compute_region, region_mean, PlaneLayout, Region, RegionStats};

pub use crate::quality::{
    ArtifactDetector, QualityConfig, QualityMetrics, QualityReport, ResolutionEstimator,
};

pub use crate::navigator::{CrosshairNavigator, CrosshairPosition, SliceIndices};

pub use crate::measure::{angle_deg, distance_mm};

pub use crate::export::{ExportBundle, ExportFormat};

pub use crate::{ReconSession, VolumeError, VolumeResult};
