//! Tab-separated metrics tables.
use std::io::Write;

use depletr_core::models::DepletionMetrics;

use crate::error::Result;

pub const METRICS_HEADER: [&str; 14] = [
    "grna_name",
    "chromosome",
    "start",
    "end",
    "width",
    "mean_coverage_treated",
    "mean_coverage_control",
    "median_coverage",
    "depletion_efficiency",
    "depletion_tier",
    "coverage_uniformity",
    "zero_coverage_fraction",
    "coefficient_of_variation",
    "composite_score",
];

const MISSING: &str = "NA";

fn optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => MISSING.to_string(),
    }
}

/// Write a header line and one row per record, in the given order.
pub fn write_metrics_tsv<W: Write>(writer: &mut W, metrics: &[DepletionMetrics]) -> Result<()> {
    writeln!(writer, "{}", METRICS_HEADER.join("\t"))?;
    for m in metrics {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{:.6}\t{}\t{:.6}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{}",
            m.grna_name,
            m.chromosome,
            m.start,
            m.end,
            m.width(),
            m.mean_coverage_treated,
            optional(m.mean_coverage_control),
            m.median_coverage,
            m.depletion_efficiency,
            m.tier(),
            m.coverage_uniformity,
            m.zero_coverage_fraction,
            m.coefficient_of_variation,
            optional(m.composite_score),
        )?;
    }
    writer.flush()?;
    Ok(())
}
