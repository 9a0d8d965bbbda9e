//! 二维测量工具: 距离与角度.

use crate::consts::DEFAULT_VOXEL_SPACING_MM;
use crate::Point2d;

/// 两点之间的距离, 以毫米为单位. `spacing` 为每像素毫米数.
#[inline]
pub fn distance_mm_with_spacing(p1: Point2d, p2: Point2d, spacing: f64) -> f64 {
    (p2.0 - p1.0).hypot(p2.1 - p1.1) * spacing
}

/// 使用默认像素间距 (0.5 mm).
#[inline]
pub fn distance_mm(p1: Point2d, p2: Point2d) -> f64 {
    distance_mm_with_spacing(p1, p2, DEFAULT_VOXEL_SPACING_MM)
}

/// 以 `vertex` 为顶点, `p1`, `p3` 为两臂端点的夹角, 单位为度, 范围 `[0, 180]`.
///
/// 任一臂长度为 0 时返回 `None`.
pub fn angle_deg(p1: Point2d, vertex: Point2d, p3: Point2d) -> Option<f64> {
    let v1 = (p1.0 - vertex.0, p1.1 - vertex.1);
    let v2 = (p3.0 - vertex.0, p3.1 - vertex.1);
    let norm = v1.0.hypot(v1.1) * v2.0.hypot(v2.1);
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    // 浮点误差可能使余弦略微超出 [-1, 1].
    let cos = num::clamp((v1.0 * v2.0 + v1.1 * v2.1) / norm, -1.0, 1.0);
    Some(cos.acos().to_degrees())
}
