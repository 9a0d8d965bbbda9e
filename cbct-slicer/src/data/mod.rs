use std::fmt;
use std::ops::Index;

use ndarray::{Array3, ArrayView3, Axis};

use crate::consts::DEFAULT_VOXEL_SPACING_MM;
use crate::{Idx3d, VolumeError, VolumeResult};

mod display;
mod orientation;
mod phantom;
pub mod slice;
mod window;

pub use display::{to_display_image, DisplayImage};
pub use orientation::Orientation;
pub use phantom::Phantom;
pub use slice::{extract, extract_all, ImgWriteVis, Slice, SliceView};
pub use window::HuWindow;

#[cfg(feature = "rayon")]
pub use slice::par_extract_all;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 体数据在 x, y, z 三个方向上的体素个数.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    /// x 方向 (宽) 体素个数.
    pub x: usize,
    /// y 方向 (高) 体素个数.
    pub y: usize,
    /// z 方向 (层) 体素个数.
    pub z: usize,
}

impl Dimensions {
    /// 直接构建.
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// 体素总数 `x * y * z`.
    #[inline]
    pub const fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    /// 体素总数, 乘法溢出时返回 `None`.
    #[inline]
    pub const fn checked_len(&self) -> Option<usize> {
        match self.x.checked_mul(self.y) {
            Some(xy) => xy.checked_mul(self.z),
            None => None,
        }
    }

    /// 是否不含任何体素.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 内部存储形状. 以 `(z, y, x)` 排列, 使得标准行优先布局恰好对应
    /// `k * x * y + j * x + i` 的线性索引.
    #[inline]
    pub(crate) const fn zyx(&self) -> Idx3d {
        (self.z, self.y, self.x)
    }

    /// 检查体素索引是否合法.
    #[inline]
    pub const fn contains(&self, (i, j, k): Idx3d) -> bool {
        i < self.x && j < self.y && k < self.z
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// 重建参数: 体尺寸与体素间距. 随导出包一并输出.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconParams {
    /// 体尺寸.
    pub volume_size: Dimensions,

    /// 体素间距 `[x, y, z]`, 以毫米为单位.
    pub voxel_spacing_mm: [f64; 3],
}

impl ReconParams {
    /// 以默认的各向同性间距 (0.5 mm) 构建.
    #[inline]
    pub fn new(volume_size: Dimensions) -> Self {
        Self {
            volume_size,
            voxel_spacing_mm: [DEFAULT_VOXEL_SPACING_MM; 3],
        }
    }

    /// 替换体素间距.
    #[inline]
    pub fn with_spacing(mut self, voxel_spacing_mm: [f64; 3]) -> Self {
        self.voxel_spacing_mm = voxel_spacing_mm;
        self
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    pub fn is_isotropic(&self) -> bool {
        let [x, y, z] = self.voxel_spacing_mm;
        x == y && x == z
    }

    /// 单个体素的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn voxel_volume_mm3(&self) -> f64 {
        self.voxel_spacing_mm.iter().product()
    }

    /// 整个重建体在三个方向上的物理尺寸, 以毫米为单位.
    pub fn extent_mm(&self) -> [f64; 3] {
        let Dimensions { x, y, z } = self.volume_size;
        let [sx, sy, sz] = self.voxel_spacing_mm;
        [x as f64 * sx, y as f64 * sy, z as f64 * sz]
    }
}

/// CBCT 重建体. HU 值以 `f32` 保存.
///
/// 构建后只读. 内部以 `(z, y, x)` 形状的标准布局存储,
/// 因此体素 `(i, j, k)` 的线性索引为 `k * x * y + j * x + i`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawVolume"))]
pub struct CbctVolume {
    dims: Dimensions,
    data: Array3<f32>,
}

/// 反序列化的中间形态. 经 [`CbctVolume::new`] 重新校验形状.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawVolume {
    dims: Dimensions,
    data: Array3<f32>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawVolume> for CbctVolume {
    type Error = VolumeError;

    #[inline]
    fn try_from(raw: RawVolume) -> VolumeResult<Self> {
        Self::new(raw.dims, raw.data.into_raw_vec())
    }
}

impl Index<Idx3d> for CbctVolume {
    type Output = f32;

    /// 按 `(i, j, k)` 访问. 越界时 panic, 需要检查时使用 [`CbctVolume::get`].
    #[inline]
    fn index(&self, (i, j, k): Idx3d) -> &Self::Output {
        &self.data[(k, j, i)]
    }
}

impl CbctVolume {
    /// 由尺寸和线性体素序列构建.
    ///
    /// `voxels.len()` 必须等于 `x * y * z`, 否则返回 [`VolumeError::ShapeMismatch`].
    pub fn new(dims: Dimensions, voxels: Vec<f32>) -> VolumeResult<Self> {
        let mismatch = VolumeError::ShapeMismatch {
            expected: dims.checked_len().unwrap_or(usize::MAX),
            actual: voxels.len(),
        };
        if dims.checked_len() != Some(voxels.len()) {
            return Err(mismatch);
        }
        let data = Array3::from_shape_vec(dims.zyx(), voxels).map_err(|_| mismatch)?;
        Ok(Self { dims, data })
    }

    /// 逐体素调用 `f((i, j, k))` 构建.
    pub fn from_fn<F: FnMut(Idx3d) -> f32>(dims: Dimensions, mut f: F) -> Self {
        let data = Array3::from_shape_fn(dims.zyx(), |(k, j, i)| f((i, j, k)));
        Self { dims, data }
    }

    /// 构建所有体素均为 `hu` 的体数据.
    #[inline]
    pub fn filled(dims: Dimensions, hu: f32) -> Self {
        Self {
            dims,
            data: Array3::from_elem(dims.zyx(), hu),
        }
    }

    /// 体尺寸.
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// 体素总数.
    #[inline]
    pub fn size(&self) -> usize {
        self.dims.len()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, pos: Idx3d) -> bool {
        self.dims.contains(pos)
    }

    /// 获取体素 `(i, j, k)` 的 HU 值.
    ///
    /// 任一坐标越界时返回 [`VolumeError::OutOfBounds`].
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> VolumeResult<f32> {
        self.data
            .get((k, j, i))
            .copied()
            .ok_or(VolumeError::OutOfBounds {
                i,
                j,
                k,
                dims: self.dims,
            })
    }

    /// 体素 `(i, j, k)` 的线性索引. 越界时返回 `None`.
    #[inline]
    pub fn linear_index(&self, pos: Idx3d) -> Option<usize> {
        let (i, j, k) = pos;
        self.check(pos)
            .then(|| k * self.dims.x * self.dims.y + j * self.dims.x + i)
    }

    /// 按线性索引获取 HU 值. 越界时返回 `None`.
    pub fn get_linear(&self, index: usize) -> Option<f32> {
        let Dimensions { x, y, .. } = self.dims;
        if x == 0 || y == 0 {
            return None;
        }
        let (i, j, k) = (index % x, (index / x) % y, index / (x * y));
        self.data.get((k, j, i)).copied()
    }

    /// 沿 `orientation` 方向的切片个数.
    #[inline]
    pub fn len_along(&self, orientation: Orientation) -> usize {
        self.data.len_of(orientation.axis())
    }

    /// 获取 `orientation` 方向第 `index` 层切片的借用视图.
    ///
    /// `index` 越界时返回 [`VolumeError::IndexOutOfRange`].
    pub fn view_along(
        &self,
        orientation: Orientation,
        index: usize,
    ) -> VolumeResult<SliceView<'_>> {
        let len = self.len_along(orientation);
        if index >= len {
            return Err(VolumeError::IndexOutOfRange {
                orientation,
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(SliceView::new(
            orientation,
            index,
            self.data.index_axis(orientation.axis(), index),
        ))
    }

    /// 获取能按升序迭代 `orientation` 方向全部切片视图的迭代器.
    #[inline]
    pub fn slice_iter(
        &self,
        orientation: Orientation,
    ) -> impl ExactSizeIterator<Item = SliceView<'_>> {
        self.data
            .axis_iter(orientation.axis())
            .enumerate()
            .map(move |(index, v)| SliceView::new(orientation, index, v))
    }

    /// 按线性顺序迭代全部体素.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &f32> {
        self.data.iter()
    }

    /// 获得数据的一份不可变 shallow copy, 形状为 `(z, y, x)`.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 按线性顺序取出全部体素.
    pub fn to_voxels(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 第 `k` 层轴位切片的 HU 平均值. 越界时返回 `None`.
    pub fn mean_hu_axial(&self, k: usize) -> Option<f64> {
        (k < self.dims.z).then(|| {
            let plane = self.data.index_axis(Axis(0), k);
            let sum: f64 = plane.iter().map(|&v| v as f64).sum();
            sum / plane.len() as f64
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CbctVolume, Dimensions, ReconParams};
    use crate::VolumeError;

    fn ramp(dims: Dimensions) -> CbctVolume {
        CbctVolume::new(dims, (0..dims.len()).map(|v| v as f32).collect()).unwrap()
    }

    #[test]
    fn test_shape_mismatch() {
        let err = CbctVolume::new(Dimensions::new(2, 2, 2), vec![0.0; 7]).unwrap_err();
        assert!(matches!(
            err,
            VolumeError::ShapeMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }

    /// 线性索引与构建顺序一致.
    #[test]
    fn test_get_matches_linear_layout() {
        let dims = Dimensions::new(3, 4, 5);
        let vol = ramp(dims);
        for k in 0..5 {
            for j in 0..4 {
                for i in 0..3 {
                    let linear = k * 3 * 4 + j * 3 + i;
                    assert_eq!(vol.get(i, j, k).unwrap(), linear as f32);
                    assert_eq!(vol[(i, j, k)], linear as f32);
                    assert_eq!(vol.linear_index((i, j, k)), Some(linear));
                    assert_eq!(vol.get_linear(linear), Some(linear as f32));
                }
            }
        }
        assert_eq!(vol.get_linear(dims.len()), None);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let vol = ramp(Dimensions::new(3, 4, 5));
        for (i, j, k) in [(3, 0, 0), (0, 4, 0), (0, 0, 5), (usize::MAX, 0, 0)] {
            assert!(matches!(
                vol.get(i, j, k),
                Err(VolumeError::OutOfBounds { .. })
            ));
        }
        assert_eq!(vol.linear_index((0, 0, 5)), None);
    }

    #[test]
    fn test_from_fn_agrees_with_new() {
        let dims = Dimensions::new(4, 3, 2);
        let a = CbctVolume::from_fn(dims, |(i, j, k)| (k * 12 + j * 4 + i) as f32);
        assert_eq!(a.to_voxels(), ramp(dims).to_voxels());
    }

    #[test]
    fn test_mean_hu_axial() {
        let vol = CbctVolume::from_fn(Dimensions::new(2, 2, 3), |(_, _, k)| k as f32 * 10.0);
        assert_eq!(vol.mean_hu_axial(2), Some(20.0));
        assert_eq!(vol.mean_hu_axial(3), None);
    }

    #[test]
    fn test_shape_mismatch_overflow() {
        let dims = Dimensions::new(usize::MAX, 2, 1);
        assert_eq!(dims.checked_len(), None);
        assert!(matches!(
            CbctVolume::new(dims, vec![0.0; 2]),
            Err(VolumeError::ShapeMismatch {
                expected: usize::MAX,
                actual: 2
            })
        ));
    }

    /// 尺寸与数据不一致的 bincode 载荷必须被拒绝.
    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_shape() {
        use ndarray::Array3;

        let vol = ramp(Dimensions::new(4, 3, 2));
        let bytes = bincode::serialize(&vol).unwrap();
        let back: CbctVolume = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.dimensions(), vol.dimensions());
        assert_eq!(back.to_voxels(), vol.to_voxels());

        // 字段顺序与 `CbctVolume` 相同: 尺寸, 数据.
        let forged = (Dimensions::new(8, 8, 8), Array3::<f32>::zeros((2, 3, 4)));
        let bytes = bincode::serialize(&forged).unwrap();
        assert!(bincode::deserialize::<CbctVolume>(&bytes).is_err());

        let forged = (Dimensions::new(1, 2, 3), Array3::<f32>::zeros((1, 1, 1)));
        let bytes = bincode::serialize(&forged).unwrap();
        assert!(bincode::deserialize::<CbctVolume>(&bytes).is_err());
    }

    #[test]
    fn test_recon_params() {
        let p = ReconParams::new(Dimensions::new(10, 20, 30));
        assert!(p.is_isotropic());
        assert_eq!(p.extent_mm(), [5.0, 10.0, 15.0]);
        assert_eq!(p.voxel_volume_mm3(), 0.125);
        assert!(!p.with_spacing([0.5, 0.5, 1.0]).is_isotropic());
    }
}
