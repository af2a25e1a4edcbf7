//! # Input utilities for depletr.
//!
//! Loaders for target and feature annotations (BED, GTF), the `noodles`-backed
//! [`AlignmentSource`](depletr_core::source::AlignmentSource) for indexed BAM files, and the
//! metrics table writer.
//!
pub mod bam;
pub mod bed;
pub mod error;
pub mod gtf;
pub mod tsv;

use std::path::Path;

use depletr_core::models::{IntervalStore, RawInterval, StoreBuild};
use depletr_core::utils::{FileType, get_file_info};

pub use bam::{BamAlignmentSource, BamRecordStream, BamSourceFactory};
pub use bed::read_bed;
pub use error::*;
pub use gtf::read_gtf;
pub use tsv::write_metrics_tsv;

/// Read annotation records, choosing the parser from the file extension.
///
/// `feature_type` only applies to GTF input and defaults to `exon`.
pub fn read_annotations<P: AsRef<Path>>(
    path: P,
    feature_type: Option<&str>,
) -> Result<Vec<RawInterval>> {
    let path = path.as_ref();
    match get_file_info(path).file_type {
        FileType::BED => read_bed(path),
        FileType::GTF => read_gtf(path, feature_type.unwrap_or(gtf::DEFAULT_FEATURE_TYPE)),
        _ => Err(DepletrIoError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Read an annotation file straight into an [`IntervalStore`].
///
/// Malformed records are logged and returned in [`StoreBuild::rejected`].
pub fn load_store<P: AsRef<Path>>(path: P, feature_type: Option<&str>) -> Result<StoreBuild> {
    let path = path.as_ref();
    let build = IntervalStore::build(read_annotations(path, feature_type)?);
    log::info!(
        "Loaded {} intervals on {} chromosomes from {} ({} rejected)",
        build.store.len(),
        build.store.chromosomes().count(),
        path.display(),
        build.rejected.len()
    );
    Ok(build)
}
