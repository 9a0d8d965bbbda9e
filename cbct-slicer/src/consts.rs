//! 通用常量.

/// HU 值约定.
pub mod hu {
    /// 空气的 HU 值, 也是默认显示窗的下界.
    pub const AIR: f32 = -1000.0;

    /// 致密骨的 HU 值, 也是默认显示窗的上界.
    pub const DENSE_BONE: f32 = 1000.0;

    /// 水的 HU 值.
    pub const WATER: f32 = 0.0;
}

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 不透明 alpha 通道.
    pub const OPAQUE: u8 = u8::MAX;
}

/// 旧版区域统计写死的平面行宽. 仅在 [`crate::PlaneLayout::Legacy256`] 中使用.
pub const LEGACY_PLANE_STRIDE: usize = 256;

/// 默认体素间距 (毫米), 三个方向相同.
pub const DEFAULT_VOXEL_SPACING_MM: f64 = 0.5;

/// 默认质量评估区域, 格式为 `(x, y, width, height)`.
pub mod regions {
    /// SNR 的信号区域.
    pub const SIGNAL: (usize, usize, usize, usize) = (100, 100, 50, 50);

    /// CNR 的软组织区域.
    pub const TISSUE: (usize, usize, usize, usize) = (120, 120, 30, 30);

    /// CNR 的对比参考区域.
    pub const CONTRAST_REFERENCE: (usize, usize, usize, usize) = (100, 100, 30, 30);

    /// 噪声 (背景标准差) 区域.
    pub const NOISE: (usize, usize, usize, usize) = (10, 10, 50, 50);
}

/// 占位的分辨率指标.
pub mod placeholder {
    /// 空间分辨率 (毫米).
    pub const SPATIAL_RESOLUTION_MM: f64 = 0.5;

    /// 对比分辨率 (HU).
    pub const CONTRAST_RESOLUTION_HU: f64 = 10.0;
}
