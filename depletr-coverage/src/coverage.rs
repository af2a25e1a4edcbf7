use depletr_core::errors::SourceError;
use depletr_core::filter::ReadFilter;
use depletr_core::models::{AlignmentRecord, GenomicInterval};
use depletr_core::source::AlignmentSource;

use crate::errors::CoverageError;

///
/// Per-base read depth over one target interval.
///
/// `depths[i]` is the depth at reference position `start + i`. The profile is never empty and is
/// not modified after construction.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageProfile {
    chr: String,
    start: u32,
    depths: Vec<u32>,
    reads: u64,
}

impl CoverageProfile {
    pub fn new(
        chr: &str,
        start: u32,
        depths: Vec<u32>,
        reads: u64,
    ) -> Result<Self, CoverageError> {
        if depths.is_empty() {
            return Err(CoverageError::EmptyInterval(format!("{}:{}", chr, start)));
        }
        Ok(CoverageProfile {
            chr: chr.to_string(),
            start,
            depths,
            reads,
        })
    }

    /// All-zero profile spanning `interval`.
    pub fn zeros(interval: &GenomicInterval) -> Self {
        CoverageProfile {
            chr: interval.chr().to_string(),
            start: interval.start(),
            depths: vec![0; interval.width() as usize],
            reads: 0,
        }
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.start + self.depths.len() as u32
    }

    pub fn depths(&self) -> &[u32] {
        &self.depths
    }

    /// Number of reads that added depth to the profile.
    pub fn read_count(&self) -> u64 {
        self.reads
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Sum of depths, i.e. the number of aligned bases inside the interval.
    pub fn total(&self) -> u64 {
        self.depths.iter().map(|&d| d as u64).sum()
    }
}

///
/// Build a profile for `interval` from a stream of records.
///
/// Each read passing `filter` that lies on the interval's chromosome adds one to every base where
/// its aligned span and the interval intersect. Accumulation goes through a difference array, so a
/// read costs O(1) and the profile is finished with a single prefix sum.
///
pub fn accumulate_coverage<I>(
    interval: &GenomicInterval,
    records: I,
    filter: &ReadFilter,
) -> Result<CoverageProfile, CoverageError>
where
    I: IntoIterator<Item = Result<AlignmentRecord, SourceError>>,
{
    let start = interval.start();
    let width = interval.width() as usize;
    let mut diff = vec![0i64; width + 1];
    let mut reads = 0u64;

    for record in records {
        let record = record?;
        if !filter.passes(&record) || record.chr.as_ref() != interval.chr() {
            continue;
        }
        let Some((lo, hi)) = interval.intersect(record.start, record.end) else {
            continue;
        };
        diff[(lo - start) as usize] += 1;
        diff[(hi - start) as usize] -= 1;
        reads += 1;
    }

    let mut depth = 0i64;
    let depths = diff[..width]
        .iter()
        .map(|d| {
            depth += d;
            depth as u32
        })
        .collect();

    CoverageProfile::new(interval.chr(), start, depths, reads)
}

///
/// Compute the coverage profile of `interval` from an indexed source.
///
/// A chromosome the source does not know about gives an all-zero profile and a warning.
///
pub fn compute_coverage<S: AlignmentSource + ?Sized>(
    source: &mut S,
    interval: &GenomicInterval,
    filter: &ReadFilter,
) -> Result<CoverageProfile, CoverageError> {
    if !source.contains_chromosome(interval.chr()) {
        log::warn!(
            "{} is not a reference sequence of {}; {} gets zero coverage",
            interval.chr(),
            source.label(),
            interval.name()
        );
        return Ok(CoverageProfile::zeros(interval));
    }

    let records = source.fetch(interval.chr(), interval.start(), interval.end())?;
    accumulate_coverage(interval, records, filter)
}
