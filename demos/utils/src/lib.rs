//! 演示程序依赖的通用组件.

use cbct_slicer::consts::hu;
use cbct_slicer::{Dimensions, Phantom};

pub mod paths;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 演示用的头部体模: 256x256x`depth`, 空气背景.
///
/// 1. 水等效的长方体 "头部", 覆盖默认噪声区域 `(10, 10, 50, 50)`;
/// 2. 默认信号区域 `(100, 100, 50, 50)` 内为 +200 HU 的软组织块;
/// 3. 默认软组织区域 `(120, 120, 30, 30)` 内为 +400 HU 的高对比块;
/// 4. 一个 +1000 HU 的骨性小球;
/// 5. 幅度 `noise` HU 的确定性噪声.
pub fn demo_phantom(depth: usize, noise: f32) -> Phantom {
    let c = depth as f64 / 2.0;
    Phantom::new(Dimensions::new(256, 256, depth), hu::AIR)
        .cuboid((8, 8, 0), (240, 240, depth), hu::WATER)
        .cuboid((100, 100, 0), (50, 50, depth), 200.0)
        .cuboid((120, 120, 0), (30, 30, depth), 400.0)
        .sphere((190.0, 70.0, c), 12.0, hu::DENSE_BONE)
        .noise(noise, 0x00c0_ffee)
}
