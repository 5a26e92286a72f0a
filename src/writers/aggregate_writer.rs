use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::processors::{
    Breakpoint, HemisphericMean, SourceBreakpointStats, ZonalCurve, ZonalWeights,
};

/// Everything the `aggregate` command produces, serialised as one JSON
/// document.
#[derive(Debug, Serialize)]
pub struct AggregateReport<'a> {
    pub weights: &'a ZonalWeights,
    pub curves: &'a [ZonalCurve],
    pub hemispheres: &'a [HemisphericMean],
}

pub struct AggregateWriter;

impl AggregateWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_json(&self, report: &AggregateReport<'_>, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
        debug!("Wrote aggregate report to {}", path.display());
        Ok(())
    }

    /// Long-form curve table: `lower,upper,weight,year,value`.
    pub fn write_curves_csv<W: Write>(&self, curves: &[ZonalCurve], writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["lower", "upper", "weight", "year", "value"])?;

        for curve in curves {
            for (year, value) in &curve.series {
                csv_writer.write_record(&[
                    curve.bin.lower.to_string(),
                    curve.bin.upper.to_string(),
                    curve.weight.to_string(),
                    year.to_string(),
                    value.to_string(),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_breakpoints_csv<W: Write>(&self, breakpoints: &[Breakpoint], writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["stationcode", "year", "from", "to", "source_flag"])?;

        for bp in breakpoints {
            csv_writer.write_record(&[
                bp.station_code.clone(),
                bp.year.to_string(),
                bp.from.clone(),
                bp.to.clone(),
                bp.source_flag.as_u8().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn breakpoint_summary(&self, stats: &[SourceBreakpointStats]) -> String {
        let mut lines = vec!["Breakpoints by source flag:".to_string()];
        for s in stats {
            let median = s
                .median_year
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!(
                "  - flag {}: {} breakpoints, median year {}",
                s.source_flag.as_u8(),
                s.count,
                median
            ));
        }
        lines.join("\n")
    }
}

impl Default for AggregateWriter {
    fn default() -> Self {
        Self::new()
    }
}
