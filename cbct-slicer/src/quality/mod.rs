//! 图像质量指标.
//!
//! SNR 与 CNR 由若干固定区域的统计量组合得到; 伪影评分与分辨率目前是占位实现,
//! 通过 [`ArtifactDetector`] 与 [`ResolutionEstimator`] 替换.

use std::fmt;

use log::{debug, warn};

use crate::consts::regions;
use crate::stats::{compute_region, region_mean};
use crate::{CbctVolume, PlaneLayout, Region, VolumeResult};

mod artifact;
mod resolution;

pub use artifact::{default_detectors, ArtifactDetector, PlaceholderArtifact};
pub use resolution::{PlaceholderResolution, ResolutionEstimator};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 质量评估所用的区域与平面布局.
///
/// 区域坐标与图像内容无关, 是纯配置.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityConfig {
    /// SNR 分子: 信号区域.
    pub signal: Region,

    /// CNR: 软组织区域.
    pub tissue: Region,

    /// CNR: 与软组织比较的参考区域.
    pub contrast_reference: Region,

    /// 噪声区域. 其标准差是 SNR 与 CNR 的分母.
    pub noise: Region,

    /// 所有区域共用的平面布局.
    pub layout: PlaneLayout,
}

impl Default for QualityConfig {
    /// 默认区域, 在第 0 层轴位切片上按体数据真实宽度读取.
    fn default() -> Self {
        Self {
            signal: Region::from_tuple(regions::SIGNAL),
            tissue: Region::from_tuple(regions::TISSUE),
            contrast_reference: Region::from_tuple(regions::CONTRAST_REFERENCE),
            noise: Region::from_tuple(regions::NOISE),
            layout: PlaneLayout::default(),
        }
    }
}

impl QualityConfig {
    /// 默认区域 + 旧版固定 256 行宽.
    pub fn legacy() -> Self {
        Self {
            layout: PlaneLayout::Legacy256,
            ..Self::default()
        }
    }

    /// 替换平面布局.
    #[inline]
    pub fn with_layout(mut self, layout: PlaneLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// 一次质量评估的结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityReport {
    /// 信噪比.
    pub snr: f64,
    /// 对比噪声比.
    pub cnr: f64,
    /// 空间分辨率 (毫米).
    pub spatial_resolution_mm: f64,
    /// 对比分辨率 (HU).
    pub contrast_resolution_hu: f64,
    /// 综合伪影评分, `[0, 1]`, 越低越好.
    pub artifact_score: f64,
}

/// 以噪声标准差为分母的比值. 分母为 0 时返回 `+inf`.
#[inline]
fn noise_ratio(numerator: f64, noise_std: f64) -> f64 {
    if noise_std == 0.0 {
        f64::INFINITY
    } else {
        numerator / noise_std
    }
}

/// 质量指标计算器.
pub struct QualityMetrics {
    config: QualityConfig,
    detectors: Vec<Box<dyn ArtifactDetector>>,
    resolution: Box<dyn ResolutionEstimator>,
}

impl fmt::Debug for QualityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityMetrics")
            .field("config", &self.config)
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for QualityMetrics {
    #[inline]
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityMetrics {
    /// 使用默认的占位伪影检测器和分辨率估计.
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            detectors: default_detectors(),
            resolution: Box::new(PlaceholderResolution),
        }
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// 替换全部伪影检测器.
    pub fn with_detectors(mut self, detectors: Vec<Box<dyn ArtifactDetector>>) -> Self {
        self.detectors = detectors;
        self
    }

    /// 替换分辨率估计.
    pub fn with_resolution<R: ResolutionEstimator + 'static>(mut self, estimator: R) -> Self {
        self.resolution = Box::new(estimator);
        self
    }

    /// 噪声区域的标准差.
    pub fn noise_std(&self, volume: &CbctVolume) -> VolumeResult<f64> {
        compute_region(volume, self.config.noise, self.config.layout).map(|s| s.std)
    }

    /// 信噪比: `mean(signal) / std(noise)`.
    pub fn snr(&self, volume: &CbctVolume) -> VolumeResult<f64> {
        let signal = region_mean(volume, self.config.signal, self.config.layout)?;
        Ok(noise_ratio(signal, self.noise_std(volume)?))
    }

    /// 对比噪声比: `|mean(tissue) - mean(reference)| / std(noise)`.
    pub fn cnr(&self, volume: &CbctVolume) -> VolumeResult<f64> {
        let tissue = region_mean(volume, self.config.tissue, self.config.layout)?;
        let reference = region_mean(volume, self.config.contrast_reference, self.config.layout)?;
        Ok(noise_ratio((tissue - reference).abs(), self.noise_std(volume)?))
    }

    /// 综合伪影评分, 截断到 `[0, 1]`. 加权和为 NaN 时按最差处理, 记为 1.
    pub fn artifact_score(&self, volume: &CbctVolume) -> f64 {
        let total: f64 = self
            .detectors
            .iter()
            .map(|d| {
                let s = d.score(volume);
                debug!("artifact `{}`: {s} (weight {})", d.name(), d.weight());
                d.weight() * s
            })
            .sum();
        if total.is_nan() {
            warn!("artifact score is NaN, reported as 1");
            return 1.0;
        }
        num::clamp(total, 0.0, 1.0)
    }

    /// 计算完整的质量报告. 任一区域非法即返回错误, 不产生部分结果.
    pub fn compute(&self, volume: &CbctVolume) -> VolumeResult<QualityReport> {
        let report = QualityReport {
            snr: self.snr(volume)?,
            cnr: self.cnr(volume)?,
            spatial_resolution_mm: self.resolution.spatial_resolution_mm(volume),
            contrast_resolution_hu: self.resolution.contrast_resolution_hu(volume),
            artifact_score: self.artifact_score(volume),
        };
        debug!("quality report: {report:?}");
        Ok(report)
    }
}
