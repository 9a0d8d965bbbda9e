//! 矩形区域统计.
//!
//! 区域坐标 `(x, y)` 是一张 "展平平面" 上的列与行. 平面到体素缓冲区的映射由
//! [`PlaneLayout`] 显式给出: 第 `row` 行第 `col` 列对应线性索引
//! `offset + row * stride + col`.

use itertools::{iproduct, Itertools};
use log::{debug, warn};
use ordered_float::OrderedFloat;

use crate::consts::LEGACY_PLANE_STRIDE;
use crate::{CbctVolume, VolumeError, VolumeResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 轴对齐矩形区域, 左上角 `(x, y)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// 起始列.
    pub x: usize,
    /// 起始行.
    pub y: usize,
    /// 列数.
    pub width: usize,
    /// 行数.
    pub height: usize,
}

impl Region {
    /// 直接构建.
    #[inline]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 由 `(x, y, width, height)` 构建.
    #[inline]
    pub const fn from_tuple((x, y, width, height): (usize, usize, usize, usize)) -> Self {
        Self::new(x, y, width, height)
    }

    /// 区域内的采样个数.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// 是否为空区域.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 展平平面到体素缓冲区的布局.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaneLayout {
    /// 兼容旧行为: 固定行宽 256, 从缓冲区开头读取, 与体数据的真实宽度无关.
    ///
    /// 仅当体数据宽度恰为 256 时才等价于第 0 层轴位切片.
    Legacy256,

    /// 第 `index` 层轴位切片: 行宽为体数据的 x 宽度, 偏移为 `index * x * y`.
    Axial {
        /// 轴位切片索引.
        index: usize,
    },

    /// 任意行宽与偏移.
    Custom {
        /// 行宽.
        stride: usize,
        /// 平面起点的线性偏移.
        offset: usize,
    },
}

impl Default for PlaneLayout {
    #[inline]
    fn default() -> Self {
        Self::Axial { index: 0 }
    }
}

impl PlaneLayout {
    /// 针对 `volume` 解析出 `(stride, offset)`.
    pub fn resolve(&self, volume: &CbctVolume) -> (usize, usize) {
        let dims = volume.dimensions();
        match *self {
            Self::Legacy256 => (LEGACY_PLANE_STRIDE, 0),
            Self::Axial { index } => (
                dims.x,
                index.saturating_mul(dims.x).saturating_mul(dims.y),
            ),
            Self::Custom { stride, offset } => (stride, offset),
        }
    }
}

/// 一次区域统计的结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionStats {
    /// 平均值.
    pub mean: f64,
    /// 最小值.
    pub min: f64,
    /// 最大值.
    pub max: f64,
    /// 总体标准差 (除以 N).
    pub std: f64,
    /// 统计区域.
    pub region: Region,
    /// 采样个数.
    pub sample_count: usize,
}

/// 计算 `region` 在 `layout` 给出的展平平面上的统计量.
///
/// # 错误
///
/// - 宽或高为 0 时返回 [`VolumeError::EmptyRegion`];
/// - 区域右边界超出行宽, 或最后一个采样落在缓冲区之外时返回
///   [`VolumeError::RegionOutOfBounds`].
pub fn compute_region(
    volume: &CbctVolume,
    region: Region,
    layout: PlaneLayout,
) -> VolumeResult<RegionStats> {
    if region.is_empty() {
        return Err(VolumeError::EmptyRegion(region));
    }
    if layout == PlaneLayout::Legacy256 && volume.dimensions().x != LEGACY_PLANE_STRIDE {
        warn!(
            "legacy 256 stride used on a volume of width {}",
            volume.dimensions().x
        );
    }

    let samples = region_samples(volume, region, layout)?;
    let count = samples.len();
    let n = count as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let std = (samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
    let (min, max) = samples
        .iter()
        .map(|&s| OrderedFloat(s))
        .minmax()
        .into_option()
        .map_or((f64::NAN, f64::NAN), |(lo, hi)| (lo.0, hi.0));

    debug!("region {region:?} ({layout:?}): mean {mean}, std {std}");
    Ok(RegionStats {
        mean,
        min,
        max,
        std,
        region,
        sample_count: count,
    })
}

/// 区域平均值. 错误同 [`compute_region`].
#[inline]
pub fn region_mean(volume: &CbctVolume, region: Region, layout: PlaneLayout) -> VolumeResult<f64> {
    compute_region(volume, region, layout).map(|s| s.mean)
}

/// 按行优先序收集区域内全部采样, 同时完成边界检查.
fn region_samples(
    volume: &CbctVolume,
    region: Region,
    layout: PlaneLayout,
) -> VolumeResult<Vec<f64>> {
    let (stride, offset) = layout.resolve(volume);
    let out_of_bounds = || VolumeError::RegionOutOfBounds {
        region,
        stride,
        offset,
        len: volume.size(),
    };

    let right = region.x.checked_add(region.width).ok_or_else(out_of_bounds)?;
    if right > stride {
        return Err(out_of_bounds());
    }
    let last = region
        .y
        .checked_add(region.height - 1)
        .and_then(|v| v.checked_mul(stride))
        .and_then(|v| v.checked_add(offset))
        .and_then(|v| v.checked_add(right - 1))
        .ok_or_else(out_of_bounds)?;
    if last >= volume.size() {
        return Err(out_of_bounds());
    }

    iproduct!(region.y..region.y + region.height, region.x..right)
        .map(|(row, col)| {
            volume
                .get_linear(offset + row * stride + col)
                .map(f64::from)
                .ok_or_else(out_of_bounds)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{compute_region, region_mean, PlaneLayout, Region};
    use crate::{CbctVolume, Dimensions, VolumeError};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_region() {
        let vol = CbctVolume::filled(Dimensions::new(4, 4, 1), 1.0);
        for r in [Region::new(0, 0, 0, 2), Region::new(0, 0, 2, 0), Region::new(1, 1, 0, 0)] {
            let err = compute_region(&vol, r, PlaneLayout::default()).unwrap_err();
            assert!(matches!(err, VolumeError::EmptyRegion(e) if e == r));
        }
    }

    #[test]
    fn test_uniform_region() {
        let vol = CbctVolume::filled(Dimensions::new(8, 8, 2), 42.5);
        let s = compute_region(&vol, Region::new(2, 3, 4, 5), PlaneLayout::default()).unwrap();
        assert_eq!(s.sample_count, 20);
        assert_eq!(s.mean, 42.5);
        assert_eq!(s.min, 42.5);
        assert_eq!(s.max, 42.5);
        assert_eq!(s.std, 0.0);
    }

    /// 总体标准差: {2, 4, 4, 4, 5, 5, 7, 9} -> mean 5, std 2.
    #[test]
    fn test_population_std() {
        let vol = CbctVolume::new(
            Dimensions::new(4, 2, 1),
            vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0],
        )
        .unwrap();
        let s = compute_region(&vol, Region::new(0, 0, 4, 2), PlaneLayout::default()).unwrap();
        assert!(f64_eq(s.mean, 5.0));
        assert!(f64_eq(s.std, 2.0));
        assert_eq!((s.min, s.max), (2.0, 9.0));
    }

    #[test]
    fn test_region_out_of_bounds() {
        let vol = CbctVolume::filled(Dimensions::new(8, 8, 2), 0.0);
        let layout = PlaneLayout::Axial { index: 1 };
        assert!(compute_region(&vol, Region::new(0, 0, 8, 8), layout).is_ok());
        for r in [
            Region::new(1, 0, 8, 1),
            Region::new(0, 1, 1, 8),
            Region::new(usize::MAX, 0, 1, 1),
        ] {
            assert!(matches!(
                compute_region(&vol, r, layout),
                Err(VolumeError::RegionOutOfBounds { stride: 8, offset: 64, .. })
            ));
        }
        assert!(matches!(
            compute_region(&vol, Region::new(0, 0, 1, 1), PlaneLayout::Axial { index: 2 }),
            Err(VolumeError::RegionOutOfBounds { .. })
        ));
    }

    /// 轴位布局读取的正是对应层切片.
    #[test]
    fn test_axial_layout_reads_plane() {
        let vol = CbctVolume::from_fn(Dimensions::new(6, 5, 3), |(i, j, k)| {
            (k * 100 + j * 10 + i) as f32
        });
        let layout = PlaneLayout::Axial { index: 2 };
        let m = region_mean(&vol, Region::new(2, 1, 1, 1), layout).unwrap();
        assert_eq!(m, 212.0);
        let layout = PlaneLayout::Axial { index: 1 };
        let m = region_mean(&vol, Region::new(0, 0, 6, 5), layout).unwrap();
        assert!(f64_eq(m, 100.0 + 20.0 + 2.5));
    }

    /// 旧版 256 行宽只在宽度为 256 的体上与轴位第 0 层一致.
    #[test]
    fn test_legacy_stride_mismatch() {
        let region = Region::new(3, 2, 4, 4);

        let wide = CbctVolume::from_fn(Dimensions::new(256, 8, 1), |(i, j, _)| {
            (i + 1000 * j) as f32
        });
        assert_eq!(
            compute_region(&wide, region, PlaneLayout::Legacy256).unwrap(),
            compute_region(&wide, region, PlaneLayout::Axial { index: 0 }).unwrap()
        );

        let narrow = CbctVolume::from_fn(Dimensions::new(64, 64, 4), |(i, j, k)| {
            (i + 1000 * j + 100_000 * k) as f32
        });
        let legacy = compute_region(&narrow, region, PlaneLayout::Legacy256).unwrap();
        let axial = compute_region(&narrow, region, PlaneLayout::Axial { index: 0 }).unwrap();
        assert_ne!(legacy.mean, axial.mean);
        // 行 2 在 256 行宽下落到线性索引 512 + 3, 即体素 (3, 8, 0).
        assert_eq!(legacy.min, 8003.0);
        assert_eq!(axial.min, 2003.0);

        let custom = compute_region(
            &narrow,
            region,
            PlaneLayout::Custom {
                stride: 256,
                offset: 0,
            },
        )
        .unwrap();
        assert_eq!(custom, legacy);
    }
}
