use crate::CbctVolume;

/// 单一类型伪影的检测器.
///
/// 综合伪影评分为 `sum(weight * score)`, 再截断到 `[0, 1]`. 越低越好.
pub trait ArtifactDetector: Send + Sync {
    /// 伪影类型名, 用于日志.
    fn name(&self) -> &'static str;

    /// 在综合评分中的权重.
    fn weight(&self) -> f64;

    /// 对 `volume` 的检测结果, 期望落在 `[0, 1]` 内.
    fn score(&self, volume: &CbctVolume) -> f64;
}

/// 尚未实现真实检测算法的伪影类型. 总是返回固定的占位分数.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaceholderArtifact {
    name: &'static str,
    weight: f64,
    score: f64,
}

impl PlaceholderArtifact {
    /// 条纹伪影. 权重 0.3, 占位分数 0.1.
    pub const fn streak() -> Self {
        Self {
            name: "streak",
            weight: 0.3,
            score: 0.1,
        }
    }

    /// 环状伪影. 权重 0.3, 占位分数 0.05.
    pub const fn ring() -> Self {
        Self {
            name: "ring",
            weight: 0.3,
            score: 0.05,
        }
    }

    /// 运动伪影. 权重 0.4, 占位分数 0.15.
    pub const fn motion() -> Self {
        Self {
            name: "motion",
            weight: 0.4,
            score: 0.15,
        }
    }
}

impl ArtifactDetector for PlaceholderArtifact {
    #[inline]
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn score(&self, _volume: &CbctVolume) -> f64 {
        self.score
    }
}

/// 默认的三类伪影检测器.
pub fn default_detectors() -> Vec<Box<dyn ArtifactDetector>> {
    vec![
        Box::new(PlaceholderArtifact::streak()),
        Box::new(PlaceholderArtifact::ring()),
        Box::new(PlaceholderArtifact::motion()),
    ]
}
