use crate::consts::placeholder::{CONTRAST_RESOLUTION_HU, SPATIAL_RESOLUTION_MM};
use crate::CbctVolume;

/// 分辨率测量.
///
/// 真实实现应基于边缘扩展函数 (空间分辨率) 或对比度-细节体模 (对比分辨率).
pub trait ResolutionEstimator: Send + Sync {
    /// 空间分辨率, 以毫米为单位.
    fn spatial_resolution_mm(&self, volume: &CbctVolume) -> f64;

    /// 对比分辨率, 以 HU 为单位.
    fn contrast_resolution_hu(&self, volume: &CbctVolume) -> f64;
}

/// 尚未测量: 总是返回 0.5 mm 与 10 HU.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlaceholderResolution;

impl ResolutionEstimator for PlaceholderResolution {
    #[inline]
    fn spatial_resolution_mm(&self, _volume: &CbctVolume) -> f64 {
        SPATIAL_RESOLUTION_MM
    }

    #[inline]
    fn contrast_resolution_hu(&self, _volume: &CbctVolume) -> f64 {
        CONTRAST_RESOLUTION_HU
    }
}
