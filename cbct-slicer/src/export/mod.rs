//! 导出包.
//!
//! 三种包的结构是对外约定: 格式标签 + 切片序列或整体体数据 + 重建参数 + (可选的) 质量报告.
//! 这里不产生真实的 DICOM/NIfTI 二进制布局, 只提供 `.npy`, PNG 预览和 bincode 编码.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use ndarray::Array3;

use crate::quality::QualityMetrics;
use crate::{
    CbctVolume, ImgWriteVis, Orientation, QualityReport, ReconParams, Slice, VolumeError,
    VolumeResult,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 导出格式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExportFormat {
    /// 轴位切片序列.
    #[default]
    Dicom,
    /// 整体体数据 + 质量报告.
    Nifti,
    /// 整体体数据, 不含质量报告.
    Raw,
}

impl ExportFormat {
    /// 所有格式.
    pub const ALL: [ExportFormat; 3] = [Self::Dicom, Self::Nifti, Self::Raw];

    /// 小写标签.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dicom => "dicom",
            Self::Nifti => "nifti",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = VolumeError;

    /// 不区分大小写. 未知标签返回 [`VolumeError::UnknownExportFormat`], 不会退回默认格式.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| VolumeError::UnknownExportFormat(s.to_string()))
    }
}

/// 导出包.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExportBundle {
    /// 全部轴位切片, 按层序排列.
    Dicom {
        /// 轴位切片, 第 `k` 个元素是第 `k` 层.
        slices: Vec<Slice>,
        /// 重建参数.
        parameters: ReconParams,
        /// 区域放不进体数据时为 `None`.
        quality: Option<QualityReport>,
    },

    /// 整体体数据.
    Nifti {
        /// 体数据快照.
        volume: CbctVolume,
        /// 重建参数.
        parameters: ReconParams,
        /// 区域放不进体数据时为 `None`.
        quality: Option<QualityReport>,
    },

    /// 整体体数据, 不含质量报告.
    Raw {
        /// 体数据快照.
        volume: CbctVolume,
        /// 重建参数.
        parameters: ReconParams,
    },
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        /// 按层序取出全部轴位切片.
        fn axial_slices(volume: &CbctVolume) -> Vec<Slice> {
            crate::par_extract_all(volume, Orientation::Axial)
        }
    } else {
        /// 按层序取出全部轴位切片.
        fn axial_slices(volume: &CbctVolume) -> Vec<Slice> {
            crate::extract_all(volume, Orientation::Axial).collect()
        }
    }
}

/// 质量报告失败时不让导出失败, 只记录日志.
fn optional_quality(volume: &CbctVolume, metrics: &QualityMetrics) -> Option<QualityReport> {
    metrics
        .compute(volume)
        .map_err(|e| warn!("export without quality metrics: {e}"))
        .ok()
}

impl ExportBundle {
    /// 按 `format` 组装导出包.
    ///
    /// `parameters.volume_size` 以 `volume` 的实际尺寸为准被覆盖.
    pub fn build(
        format: ExportFormat,
        volume: &CbctVolume,
        parameters: ReconParams,
        metrics: &QualityMetrics,
    ) -> Self {
        if parameters.volume_size != volume.dimensions() {
            warn!(
                "volume_size {} replaced by actual volume {}",
                parameters.volume_size,
                volume.dimensions()
            );
        }
        let parameters = ReconParams {
            volume_size: volume.dimensions(),
            ..parameters
        };
        let bundle = match format {
            ExportFormat::Dicom => Self::Dicom {
                slices: axial_slices(volume),
                parameters,
                quality: optional_quality(volume, metrics),
            },
            ExportFormat::Nifti => Self::Nifti {
                volume: volume.clone(),
                parameters,
                quality: optional_quality(volume, metrics),
            },
            ExportFormat::Raw => Self::Raw {
                volume: volume.clone(),
                parameters,
            },
        };
        info!("{format} bundle built for volume {}", volume.dimensions());
        bundle
    }

    /// 格式标签.
    #[inline]
    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Dicom { .. } => ExportFormat::Dicom,
            Self::Nifti { .. } => ExportFormat::Nifti,
            Self::Raw { .. } => ExportFormat::Raw,
        }
    }

    /// 重建参数.
    #[inline]
    pub fn parameters(&self) -> &ReconParams {
        match self {
            Self::Dicom { parameters, .. }
            | Self::Nifti { parameters, .. }
            | Self::Raw { parameters, .. } => parameters,
        }
    }

    /// 质量报告. raw 包总是 `None`.
    #[inline]
    pub fn quality(&self) -> Option<&QualityReport> {
        match self {
            Self::Dicom { quality, .. } | Self::Nifti { quality, .. } => quality.as_ref(),
            Self::Raw { .. } => None,
        }
    }

    /// 包含的体数据. dicom 包只有切片, 返回 `None`.
    #[inline]
    pub fn volume(&self) -> Option<&CbctVolume> {
        match self {
            Self::Nifti { volume, .. } | Self::Raw { volume, .. } => Some(volume),
            Self::Dicom { .. } => None,
        }
    }

    /// 以 `(z, y, x)` 形状写出 `.npy`. dicom 包把轴位切片重新堆叠成体.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> VolumeResult<()> {
        match self {
            Self::Nifti { volume, .. } | Self::Raw { volume, .. } => {
                ndarray_npy::write_npy(path, &volume.data())?;
            }
            Self::Dicom {
                slices, parameters, ..
            } => {
                let dims = parameters.volume_size;
                let voxels: Vec<f32> = slices.iter().flat_map(|s| s.samples()).copied().collect();
                let actual = voxels.len();
                let stacked = Array3::from_shape_vec((slices.len(), dims.y, dims.x), voxels)
                    .map_err(|_| VolumeError::ShapeMismatch {
                        expected: slices.len() * dims.y * dims.x,
                        actual,
                    })?;
                ndarray_npy::write_npy(path, &stacked)?;
            }
        }
        Ok(())
    }

    /// 把每一层轴位切片写成 `dir/axial_{k:04}.png` 灰度预览. 返回写出的文件个数.
    pub fn save_previews<P: AsRef<Path>>(&self, dir: P) -> VolumeResult<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let name = |k: usize| dir.join(format!("axial_{k:04}.png"));
        match self {
            Self::Dicom { slices, .. } => {
                for s in slices {
                    s.save(name(s.index()))?;
                }
                Ok(slices.len())
            }
            Self::Nifti { volume, .. } | Self::Raw { volume, .. } => {
                let mut count = 0;
                for view in volume.slice_iter(Orientation::Axial) {
                    view.save(name(view.index()))?;
                    count += 1;
                }
                Ok(count)
            }
        }
    }

    /// bincode 编码.
    #[cfg(feature = "serde")]
    pub fn to_bincode(&self) -> VolumeResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// bincode 解码.
    #[cfg(feature = "serde")]
    pub fn from_bincode(bytes: &[u8]) -> VolumeResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportBundle, ExportFormat};
    use crate::quality::QualityMetrics;
    use crate::{CbctVolume, Dimensions, ReconParams, VolumeError};

    fn small_volume() -> CbctVolume {
        CbctVolume::from_fn(Dimensions::new(4, 3, 2), |(i, j, k)| (i + 10 * j + 100 * k) as f32)
    }

    fn large_volume() -> CbctVolume {
        CbctVolume::from_fn(Dimensions::new(160, 160, 2), |(i, j, _)| ((i * 7 + j * 3) % 50) as f32)
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("dicom".parse::<ExportFormat>().unwrap(), ExportFormat::Dicom);
        assert_eq!(" NIfTI ".parse::<ExportFormat>().unwrap(), ExportFormat::Nifti);
        assert_eq!("Raw".parse::<ExportFormat>().unwrap(), ExportFormat::Raw);
        assert!(matches!(
            "png".parse::<ExportFormat>(),
            Err(VolumeError::UnknownExportFormat(s)) if s == "png"
        ));
        for f in ExportFormat::ALL {
            assert_eq!(f.to_string().parse::<ExportFormat>().unwrap(), f);
        }
    }

    #[test]
    fn test_dicom_bundle() {
        let vol = small_volume();
        let params = ReconParams::new(vol.dimensions());
        let b = ExportBundle::build(ExportFormat::Dicom, &vol, params, &QualityMetrics::default());
        assert_eq!(b.format(), ExportFormat::Dicom);
        assert_eq!(b.parameters(), &params);
        assert!(b.volume().is_none());
        // 4x3x2 放不下默认的质量区域.
        assert!(b.quality().is_none());
        match b {
            ExportBundle::Dicom { slices, .. } => {
                assert_eq!(slices.len(), 2);
                assert_eq!(slices[1].index(), 1);
                assert_eq!(slices[1].get(3, 2), Some(123.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_volume_size_follows_volume() {
        let vol = small_volume();
        let stale = ReconParams::new(Dimensions::new(8, 8, 8)).with_spacing([0.2, 0.2, 0.4]);
        let q = QualityMetrics::default();
        let dir = std::env::temp_dir().join(format!("cbct-export-size-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        for f in ExportFormat::ALL {
            let b = ExportBundle::build(f, &vol, stale, &q);
            assert_eq!(b.parameters().volume_size, Dimensions::new(4, 3, 2));
            assert_eq!(b.parameters().voxel_spacing_mm, [0.2, 0.2, 0.4]);
            b.save_npy(dir.join(format!("{f}.npy"))).unwrap();
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_quality_presence() {
        let vol = large_volume();
        let params = ReconParams::new(vol.dimensions());
        let q = QualityMetrics::default();
        let expected = q.compute(&vol).unwrap();

        let nifti = ExportBundle::build(ExportFormat::Nifti, &vol, params, &q);
        assert_eq!(nifti.quality(), Some(&expected));
        assert_eq!(nifti.volume().unwrap().to_voxels(), vol.to_voxels());

        let dicom = ExportBundle::build(ExportFormat::Dicom, &vol, params, &q);
        assert_eq!(dicom.quality(), Some(&expected));

        let raw = ExportBundle::build(ExportFormat::Raw, &vol, params, &q);
        assert!(raw.quality().is_none());
    }

    #[test]
    fn test_save_npy_and_previews() {
        let vol = small_volume();
        let params = ReconParams::new(vol.dimensions());
        let q = QualityMetrics::default();
        let dir = std::env::temp_dir().join(format!("cbct-export-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let raw = ExportBundle::build(ExportFormat::Raw, &vol, params, &q);
        let raw_path = dir.join("raw.npy");
        raw.save_npy(&raw_path).unwrap();
        let dicom = ExportBundle::build(ExportFormat::Dicom, &vol, params, &q);
        let dicom_path = dir.join("dicom.npy");
        dicom.save_npy(&dicom_path).unwrap();
        // 重新堆叠后的切片与原体数据字节一致.
        assert_eq!(
            std::fs::read(&raw_path).unwrap(),
            std::fs::read(&dicom_path).unwrap()
        );

        assert_eq!(dicom.save_previews(dir.join("dicom")).unwrap(), 2);
        assert_eq!(raw.save_previews(dir.join("raw")).unwrap(), 2);
        assert!(dir.join("raw").join("axial_0001.png").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode() {
        let vol = large_volume();
        let params = ReconParams::new(vol.dimensions()).with_spacing([0.4, 0.4, 0.8]);
        let b = ExportBundle::build(ExportFormat::Nifti, &vol, params, &QualityMetrics::default());
        let bytes = b.to_bincode().unwrap();
        let back = ExportBundle::from_bincode(&bytes).unwrap();
        assert_eq!(back.format(), ExportFormat::Nifti);
        assert_eq!(back.parameters(), &params);
        assert_eq!(back.quality(), b.quality());
        assert_eq!(back.volume().unwrap().to_voxels(), vol.to_voxels());
    }

    /// 篡改切片宽度后, 解码失败而不是得到形状错乱的切片.
    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode_rejects_bad_slice() {
        let vol = small_volume();
        let params = ReconParams::new(vol.dimensions());
        let b = ExportBundle::build(ExportFormat::Dicom, &vol, params, &QualityMetrics::default());
        let mut bytes = b.to_bincode().unwrap();
        assert!(ExportBundle::from_bincode(&bytes).is_ok());

        // 变体标签 (u32), 切片个数 (u64), 方向标签 (u32), 索引 (u64), 宽 (u64).
        let width = 4 + 8 + 4 + 8;
        assert_eq!(bytes[width..width + 8], 4u64.to_le_bytes());
        bytes[width..width + 8].copy_from_slice(&99u64.to_le_bytes());
        assert!(matches!(
            ExportBundle::from_bincode(&bytes),
            Err(VolumeError::Bincode(_))
        ));
    }
}
