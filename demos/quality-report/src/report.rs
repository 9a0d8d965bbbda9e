//! 结果展示.

use std::io::{self, Write};

use cbct_slicer::QualityReport;

use crate::runner::Outcome;

/// 将质量报告写进 `w` 中.
fn describe_report<W: Write>(name: &str, r: &QualityReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Quality `{name}`:")?;
    writeln!(w, "{S4}SNR: {:.6}", r.snr)?;
    writeln!(w, "{S4}CNR: {:.6}", r.cnr)?;
    writeln!(w, "{S4}Spatial resolution: {} mm", r.spatial_resolution_mm)?;
    writeln!(w, "{S4}Contrast resolution: {} HU", r.contrast_resolution_hu)?;
    writeln!(w, "{S4}Artifact score: {:.3}", r.artifact_score)?;
    Ok(())
}

/// 将全部结果写进 `w` 中.
pub fn describe<W: Write>(o: &Outcome, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    utils::sep_to(&mut *w)?;
    writeln!(w, "Volume: {}", o.dims)?;
    writeln!(w, "Crosshair path:")?;
    for idx in &o.visited {
        writeln!(
            w,
            "{S4}axial {}, coronal {}, sagittal {}",
            idx.axial, idx.coronal, idx.sagittal
        )?;
    }
    writeln!(w, "Current slices:")?;
    for (orientation, range) in &o.ranges {
        match range {
            Some((lo, hi)) => writeln!(w, "{S4}{orientation}: [{lo}, {hi}] HU")?,
            None => writeln!(w, "{S4}{orientation}: /")?,
        }
    }
    utils::sep_to(&mut *w)?;
    describe_report("axial #0", &o.report, w)?;
    describe_report("legacy 256", &o.legacy, w)?;
    utils::sep_to(&mut *w)?;
    writeln!(w, "Files written: {}", o.written)?;
    Ok(())
}
