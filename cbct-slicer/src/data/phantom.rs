//! 合成体模. 代替 (不在本 crate 范围内的) 重建阶段为演示和测试提供体数据.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{CbctVolume, Dimensions, Idx3d};

/// 体模中的一个常数 HU 物体.
#[derive(Copy, Clone, Debug)]
enum Shape {
    /// 轴对齐长方体, `[min, min + size)`.
    Cuboid { min: Idx3d, size: Idx3d, hu: f32 },

    /// 以体素中心计算距离的球.
    Sphere {
        center: (f64, f64, f64),
        radius: f64,
        hu: f32,
    },
}

impl Shape {
    #[inline]
    fn contains(&self, (i, j, k): Idx3d) -> bool {
        match *self {
            Shape::Cuboid {
                min: (x0, y0, z0),
                size: (w, h, d),
                ..
            } => {
                (x0..x0.saturating_add(w)).contains(&i)
                    && (y0..y0.saturating_add(h)).contains(&j)
                    && (z0..z0.saturating_add(d)).contains(&k)
            }
            Shape::Sphere {
                center: (cx, cy, cz),
                radius,
                ..
            } => {
                let (dx, dy, dz) = (i as f64 - cx, j as f64 - cy, k as f64 - cz);
                dx * dx + dy * dy + dz * dz <= radius * radius
            }
        }
    }

    #[inline]
    fn hu(&self) -> f32 {
        match *self {
            Shape::Cuboid { hu, .. } | Shape::Sphere { hu, .. } => hu,
        }
    }
}

/// 体模构建器.
///
/// 后加入的物体覆盖先加入的物体. 噪声由固定种子的 ChaCha20 按体素线性顺序生成,
/// 同样的参数总是得到同样的体数据.
#[derive(Clone, Debug)]
pub struct Phantom {
    dims: Dimensions,
    background: f32,
    shapes: Vec<Shape>,
    noise: Option<(f32, u64)>,
}

impl Phantom {
    /// 以尺寸和背景 HU 值初始化.
    pub fn new(dims: Dimensions, background: f32) -> Self {
        Self {
            dims,
            background,
            shapes: Vec::new(),
            noise: None,
        }
    }

    /// 加入一个从 `min` 开始、大小为 `size` 的长方体. 超出体范围的部分被忽略.
    pub fn cuboid(mut self, min: Idx3d, size: Idx3d, hu: f32) -> Self {
        self.shapes.push(Shape::Cuboid { min, size, hu });
        self
    }

    /// 加入一个球.
    pub fn sphere(mut self, center: (f64, f64, f64), radius: f64, hu: f32) -> Self {
        self.shapes.push(Shape::Sphere { center, radius, hu });
        self
    }

    /// 叠加 `[-amplitude, amplitude]` 均匀分布的伪随机噪声.
    pub fn noise(mut self, amplitude: f32, seed: u64) -> Self {
        self.noise = Some((amplitude, seed));
        self
    }

    /// 生成体数据.
    pub fn build(&self) -> CbctVolume {
        let mut noise = self
            .noise
            .map(|(amplitude, seed)| (amplitude, ChaCha20Rng::seed_from_u64(seed)));
        CbctVolume::from_fn(self.dims, |pos| {
            let base = self
                .shapes
                .iter()
                .rev()
                .find(|s| s.contains(pos))
                .map_or(self.background, Shape::hu);
            match noise.as_mut() {
                Some((amplitude, rng)) if *amplitude > 0.0 => {
                    base + rng.gen_range(-*amplitude..=*amplitude)
                }
                _ => base,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Phantom;
    use crate::Dimensions;

    #[test]
    fn test_cuboid_and_overlap() {
        let vol = Phantom::new(Dimensions::new(6, 6, 6), -1000.0)
            .cuboid((1, 1, 1), (4, 4, 4), 40.0)
            .cuboid((2, 2, 2), (1, 1, 1), 700.0)
            .build();
        assert_eq!(vol[(0, 0, 0)], -1000.0);
        assert_eq!(vol[(1, 1, 1)], 40.0);
        assert_eq!(vol[(4, 4, 4)], 40.0);
        assert_eq!(vol[(5, 4, 4)], -1000.0);
        assert_eq!(vol[(2, 2, 2)], 700.0);
    }

    #[test]
    fn test_sphere() {
        let vol = Phantom::new(Dimensions::new(9, 9, 9), 0.0)
            .sphere((4.0, 4.0, 4.0), 2.0, 100.0)
            .build();
        assert_eq!(vol[(4, 4, 4)], 100.0);
        assert_eq!(vol[(6, 4, 4)], 100.0);
        assert_eq!(vol[(6, 6, 4)], 0.0);
    }

    #[test]
    fn test_noise_bounded_and_deterministic() {
        let p = Phantom::new(Dimensions::new(8, 8, 4), 50.0).noise(5.0, 42);
        let a = p.build();
        let b = p.build();
        assert_eq!(a.to_voxels(), b.to_voxels());
        assert!(a.iter().all(|v| (45.0..=55.0).contains(v)));
        assert!(a.iter().any(|v| *v != 50.0));
    }
}
