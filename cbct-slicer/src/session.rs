//! 重建会话. 持有一份体数据快照与围绕它的导航、质量评估状态, 取代全局变量.

use log::info;

use crate::quality::QualityMetrics;
use crate::{
    extract, to_display_image, CbctVolume, CrosshairNavigator, DisplayImage, ExportBundle,
    ExportFormat, Orientation, QualityReport, ReconParams, Slice, SliceIndices, VolumeError,
    VolumeResult,
};

/// 一次重建的会话.
#[derive(Debug)]
pub struct ReconSession {
    volume: CbctVolume,
    parameters: ReconParams,
    navigator: CrosshairNavigator,
    metrics: QualityMetrics,
}

impl ReconSession {
    /// 使用默认的 0.5 mm 间距和默认质量配置.
    pub fn new(volume: CbctVolume) -> Self {
        let parameters = ReconParams::new(volume.dimensions());
        Self::with_parts(volume, parameters, QualityMetrics::default())
    }

    /// 指定重建参数与质量评估器.
    ///
    /// `parameters.volume_size` 以体数据为准被覆盖.
    pub fn with_parts(
        volume: CbctVolume,
        parameters: ReconParams,
        metrics: QualityMetrics,
    ) -> Self {
        let parameters = ReconParams {
            volume_size: volume.dimensions(),
            ..parameters
        };
        info!(
            "session created: volume {}, spacing {:?} mm",
            parameters.volume_size, parameters.voxel_spacing_mm
        );
        Self {
            volume,
            parameters,
            navigator: CrosshairNavigator::new(),
            metrics,
        }
    }

    /// 体数据.
    #[inline]
    pub fn volume(&self) -> &CbctVolume {
        &self.volume
    }

    /// 重建参数.
    #[inline]
    pub fn parameters(&self) -> &ReconParams {
        &self.parameters
    }

    /// 导航器. 注册监听者、开关导航均通过它完成.
    #[inline]
    pub fn navigator(&self) -> &CrosshairNavigator {
        &self.navigator
    }

    /// 可变导航器.
    #[inline]
    pub fn navigator_mut(&mut self) -> &mut CrosshairNavigator {
        &mut self.navigator
    }

    /// 移动光标. 不做截断.
    #[inline]
    pub fn navigate(&mut self, x: f64, y: f64, z: f64) -> SliceIndices {
        self.navigator.update_position(x, y, z)
    }

    /// 提取 `orientation` 方向第 `index` 层切片.
    #[inline]
    pub fn slice(&self, orientation: Orientation, index: usize) -> VolumeResult<Slice> {
        extract(&self.volume, orientation, index)
    }

    /// 当前光标所在的切片. 光标在体外时返回 [`VolumeError::IndexOutOfRange`].
    pub fn current_slice(&self, orientation: Orientation) -> VolumeResult<Slice> {
        let index = self.navigator.indices().get(orientation);
        let out_of_range = || VolumeError::IndexOutOfRange {
            orientation,
            index,
            len: self.volume.len_along(orientation),
        };
        let index = usize::try_from(index).map_err(|_| out_of_range())?;
        self.slice(orientation, index)
    }

    /// 提取切片并转换为 RGBA 显示图像.
    pub fn display(&self, orientation: Orientation, index: usize) -> VolumeResult<DisplayImage> {
        to_display_image(&self.slice(orientation, index)?)
    }

    /// 质量报告.
    #[inline]
    pub fn quality_report(&self) -> VolumeResult<QualityReport> {
        self.metrics.compute(&self.volume)
    }

    /// 组装导出包.
    pub fn export(&self, format: ExportFormat) -> ExportBundle {
        ExportBundle::build(format, &self.volume, self.parameters, &self.metrics)
    }
}
