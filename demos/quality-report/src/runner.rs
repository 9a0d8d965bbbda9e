//! 程序运行函数.

use std::fs;

use cbct_slicer::prelude::*;
use log::{info, warn};
use utils::paths;

/// 运行结果.
pub struct Outcome {
    /// 体尺寸.
    pub dims: Dimensions,
    /// 光标经过的切片索引.
    pub visited: Vec<SliceIndices>,
    /// 每个方向当前切片的 (最小, 最大) HU.
    pub ranges: Vec<(Orientation, Option<(f32, f32)>)>,
    /// 默认布局下的质量报告.
    pub report: QualityReport,
    /// 旧版 256 行宽布局下的质量报告.
    pub legacy: QualityReport,
    /// 写出的文件个数.
    pub written: usize,
}

/// 实际运行.
pub fn run() -> Outcome {
    println!("Synthesizing phantom on {} cores...", utils::cpus());
    let volume = utils::demo_phantom(32, 20.0).build();
    let dims = volume.dimensions();

    let legacy = QualityMetrics::new(QualityConfig::legacy())
        .compute(&volume)
        .expect("Legacy quality regions do not fit the phantom");

    let mut session = ReconSession::new(volume);
    let visited = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&visited);
    session
        .navigator_mut()
        .subscribe(move |idx| sink.lock().unwrap().push(idx));

    // 沿对角线移动光标, 穿过骨性小球.
    for t in [0.1, 0.35, 0.6, 0.85] {
        let p = CrosshairPosition::new(
            dims.x as f64 * t,
            dims.y as f64 * (1.0 - t),
            dims.z as f64 * t,
        )
        .clamp_to(dims);
        session.navigate(p.x, p.y, p.z);
    }
    let ranges = Orientation::ALL
        .into_iter()
        .map(|o| (o, session.current_slice(o).ok().and_then(|s| s.min_max())))
        .collect();

    let report = session
        .quality_report()
        .expect("Default quality regions do not fit the phantom");

    let written = match paths::export_dir_from_env_or_home() {
        Some(dir) => export_into(&session, &dir).unwrap_or_else(|e| {
            warn!("export to {} failed: {e}", dir.display());
            0
        }),
        None => {
            warn!("no export directory available");
            0
        }
    };

    let visited = visited.lock().unwrap().clone();
    Outcome {
        dims,
        visited,
        ranges,
        report,
        legacy,
        written,
    }
}

/// 写出当前切片预览、raw `.npy` 与 nifti 风格的 bincode 包.
fn export_into(session: &ReconSession, dir: &std::path::Path) -> VolumeResult<usize> {
    fs::create_dir_all(dir)?;
    let mut written = 0;

    for o in Orientation::ALL {
        let slice = session.current_slice(o)?;
        slice.save(dir.join(format!("{o}_{:04}.png", slice.index())))?;
        session
            .display(o, slice.index())?
            .save(dir.join(format!("{o}_{:04}_rgba.png", slice.index())))?;
        written += 2;
    }

    session
        .export(ExportFormat::Raw)
        .save_npy(dir.join("volume.npy"))?;
    written += 1;

    let bundle = session.export(ExportFormat::Nifti);
    fs::write(dir.join("volume.nifti.bin"), bundle.to_bincode()?)?;
    written += 1;

    info!("{written} files written to {}", dir.display());
    Ok(written)
}
