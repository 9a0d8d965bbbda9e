use crate::consts::{gray, hu};

/// HU 显示窗, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 核心只对外提供固定的空气/骨窗; 可调窗宽窗位属于 2D 浏览器,
/// 不在此处暴露.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HuWindow {
    level: f32,
    width: f32,
}

impl HuWindow {
    /// 默认的临床空气/骨窗: 窗位 0, 窗宽 2000, 即 \[-1000, 1000\] HU.
    #[inline]
    pub const fn air_to_bone() -> HuWindow {
        Self {
            level: hu::WATER,
            width: 2000.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前窗设置下, `ct` HU 值对应的灰度图像素整数值 (0 <= value <= 255).
    ///
    /// 中间段按 "四舍六入五成双" 取整, 因此 0 HU (127.5) 映射为 128.
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, ct: f32) -> Option<u8> {
        self.eval_f32(ct).map(|g| g.round_ties_even() as u8)
    }

    /// 求在当前窗设置下, `ct` HU 值对应的灰度图像素分布点 (0.0 <= value <= 255.0).
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_f32(&self, ct: f32) -> Option<f32> {
        if !ct.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        let ub = self.upper_bound();
        if ct <= lb {
            Some(gray::BLACK as f32)
        } else if ct >= ub {
            Some(gray::WHITE as f32)
        } else {
            // 255, not 256.
            Some((ct - lb) / self.width() * gray::WHITE as f32)
        }
    }
}
