use std::sync::Arc;

use fxhash::FxHashSet as HashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use depletr_core::errors::SourceError;
use depletr_core::filter::ReadFilter;
use depletr_core::models::{AlignmentRecord, IntervalStore};
use depletr_core::source::{AlignmentSession, AlignmentSource, AlignmentSourceFactory};

use crate::errors::OverlapError;
use crate::sweep::{SweepCursor, SweepIndex};
use crate::traits::ReadOverlapper;

/// Totals for one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapSummary {
    /// Reads that passed the filter.
    pub total_considered: u64,
    /// Considered reads that hit at least one feature.
    pub overlapping: u64,
    /// Reads removed by the filter. Only counts reads the run visited: see
    /// [`ClassificationMode::PerChromosome`].
    pub filtered: u64,
    /// `overlapping / total_considered * 100`, 0 when nothing was considered.
    pub percentage: f64,
}

impl OverlapSummary {
    fn with_percentage(mut self) -> Self {
        self.percentage = if self.total_considered == 0 {
            0.0
        } else {
            self.overlapping as f64 / self.total_considered as f64 * 100.0
        };
        self
    }

    fn merge(self, other: OverlapSummary) -> Self {
        OverlapSummary {
            total_considered: self.total_considered + other.total_considered,
            overlapping: self.overlapping + other.overlapping,
            filtered: self.filtered + other.filtered,
            percentage: 0.0,
        }
        .with_percentage()
    }
}

/// How the reads of a run were visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Every record in file order.
    #[default]
    Sequential,
    /// One reference sequence per worker. Reads the source does not return for any reference
    /// sequence (no placement, or unmapped where the source drops those) are never visited and
    /// so are missing from [`OverlapSummary::filtered`].
    PerChromosome,
}

/// Per-read outcome, only collected when detail is switched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOverlap {
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub overlaps: bool,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapReport {
    pub mode: ClassificationMode,
    pub summary: OverlapSummary,
    /// Chromosomes carrying considered reads but no feature intervals.
    pub unmatched_chromosomes: Vec<String>,
    pub details: Option<Vec<ReadOverlap>>,
}

impl OverlapReport {
    fn merge(mut self, other: OverlapReport) -> Self {
        self.summary = self.summary.merge(other.summary);
        for chr in other.unmatched_chromosomes {
            if !self.unmatched_chromosomes.contains(&chr) {
                self.unmatched_chromosomes.push(chr);
            }
        }
        self.details = match (self.details, other.details) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            (a, b) => a.or(b),
        };
        self
    }
}

///
/// Classifies aligned reads as overlapping or not overlapping a set of feature intervals.
///
/// Reads are filtered first. Unmapped, secondary and supplementary reads never count as
/// considered. The sweep is fastest on coordinate-sorted input, but unsorted streams give the
/// same answers.
///
pub struct OverlapClassifier<'a> {
    index: SweepIndex<'a>,
    filter: ReadFilter,
    detail: bool,
}

impl<'a> OverlapClassifier<'a> {
    pub fn new(features: &'a IntervalStore, filter: ReadFilter) -> Self {
        OverlapClassifier {
            index: SweepIndex::new(features),
            filter,
            detail: false,
        }
    }

    /// Also record a [`ReadOverlap`] for every considered read.
    pub fn with_detail(mut self, detail: bool) -> Self {
        self.detail = detail;
        self
    }

    pub fn cursor(&self) -> SweepCursor<'_> {
        SweepCursor::new(&self.index)
    }

    /// Classify a stream of records with a fresh sweep cursor.
    pub fn classify<I>(&self, reads: I) -> Result<OverlapReport, OverlapError>
    where
        I: IntoIterator<Item = Result<AlignmentRecord, SourceError>>,
    {
        let mut cursor = self.cursor();
        self.classify_with(&mut cursor, reads)
    }

    /// Classify a stream with any [`ReadOverlapper`].
    pub fn classify_with<'o, O, I>(
        &self,
        overlapper: &mut O,
        reads: I,
    ) -> Result<OverlapReport, OverlapError>
    where
        O: ReadOverlapper<'o>,
        I: IntoIterator<Item = Result<AlignmentRecord, SourceError>>,
    {
        let mut summary = OverlapSummary::default();
        let mut unmatched: Vec<String> = Vec::new();
        let mut seen_unmatched: HashSet<Arc<str>> = HashSet::default();
        let mut last_chr: Option<Arc<str>> = None;
        let mut details = self.detail.then(Vec::new);

        for record in reads {
            let record = record?;
            if !self.filter.passes(&record) {
                summary.filtered += 1;
                continue;
            }
            summary.total_considered += 1;

            if last_chr.as_deref() != Some(&*record.chr) {
                if !overlapper.knows_chromosome(&record.chr)
                    && seen_unmatched.insert(Arc::clone(&record.chr))
                {
                    log::warn!(
                        "Reads on {} have no feature intervals to overlap",
                        record.chr
                    );
                    unmatched.push(record.chr.to_string());
                }
                last_chr = Some(Arc::clone(&record.chr));
            }

            let hit = match details.as_mut() {
                Some(details) => {
                    let features =
                        overlapper.overlapping(&record.chr, record.start, record.end);
                    let hit = !features.is_empty();
                    details.push(ReadOverlap {
                        chr: record.chr.to_string(),
                        start: record.start,
                        end: record.end,
                        overlaps: hit,
                        features: features.iter().map(|iv| iv.name().to_string()).collect(),
                    });
                    hit
                }
                None => overlapper.overlaps(&record.chr, record.start, record.end),
            };
            if hit {
                summary.overlapping += 1;
            }
        }

        Ok(OverlapReport {
            mode: ClassificationMode::Sequential,
            summary: summary.with_percentage(),
            unmatched_chromosomes: unmatched,
            details,
        })
    }

    /// Classify every record of `source` in file order.
    pub fn classify_source<S: AlignmentSource>(
        &self,
        source: &mut S,
    ) -> Result<OverlapReport, OverlapError> {
        let records = source.records()?;
        self.classify(records)
    }

    ///
    /// Classify chromosome by chromosome in parallel, one source handle per worker.
    ///
    /// Only reads returned for a reference sequence are visited, so reads with no placement at
    /// all do not show up in the filtered count. The report says so through its
    /// [`ClassificationMode`]. Per-read details come out in reference order.
    ///
    pub fn classify_parallel<F>(&self, factory: &F) -> Result<OverlapReport, OverlapError>
    where
        F: AlignmentSourceFactory,
    {
        let chromosomes: Vec<Arc<str>> = AlignmentSession::open(factory)?.chromosomes().to_vec();

        let partials = chromosomes
            .par_iter()
            .map_init(
                || factory.open().map_err(|e| e.to_string()),
                |source, chr| -> Result<OverlapReport, OverlapError> {
                    let source = source
                        .as_mut()
                        .map_err(|e| OverlapError::Worker(e.clone()))?;
                    let records = source.fetch_chromosome(chr)?;
                    self.classify(records)
                },
            )
            .collect::<Result<Vec<_>, _>>()?;

        let report = partials
            .into_iter()
            .fold(OverlapReport::default(), |acc, part| acc.merge(part));
        Ok(OverlapReport {
            mode: ClassificationMode::PerChromosome,
            ..report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use depletr_core::models::{RawInterval, ReadFlags};
    use depletr_core::source::InMemoryAlignmentSource;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::brute_force::BruteForceOverlapper;

    #[fixture]
    fn features() -> IntervalStore {
        IntervalStore::build(vec![
            RawInterval::new("chr1", 150, 160, "f1"),
            RawInterval::new("chr1", 300, 400, "f2"),
            RawInterval::new("chr2", 1000, 2000, "f3"),
        ])
        .store
    }

    fn reads(spans: &[(&str, u32, u32)]) -> Vec<Result<AlignmentRecord, SourceError>> {
        spans
            .iter()
            .map(|(chr, s, e)| Ok(AlignmentRecord::mapped(&Arc::from(*chr), *s, *e)))
            .collect()
    }

    #[rstest]
    fn test_basic_classification(features: IntervalStore) {
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());
        let report = classifier
            .classify(reads(&[("chr1", 100, 200), ("chr1", 200, 300)]))
            .unwrap();

        assert_eq!(report.summary.total_considered, 2);
        assert_eq!(report.summary.overlapping, 1);
        assert_eq!(report.summary.percentage, 50.0);
        assert!(report.unmatched_chromosomes.is_empty());
        assert!(report.details.is_none());
    }

    #[rstest]
    fn test_filtered_reads_are_not_considered(features: IntervalStore) {
        let chr: Arc<str> = Arc::from("chr1");
        let stream = vec![
            Ok(AlignmentRecord::mapped(&chr, 100, 200)),
            Ok(AlignmentRecord::mapped(&chr, 150, 250).with_flags(ReadFlags::UNMAPPED)),
            Ok(AlignmentRecord::mapped(&chr, 150, 250).with_flags(ReadFlags::SECONDARY)),
            Ok(AlignmentRecord::mapped(&chr, 150, 250).with_flags(ReadFlags::SUPPLEMENTARY)),
            Ok(AlignmentRecord::mapped(&chr, 150, 250).with_mapq(2)),
        ];
        let classifier = OverlapClassifier::new(&features, ReadFilter::new(10, false));
        let report = classifier.classify(stream).unwrap();

        assert_eq!(report.summary.total_considered, 1);
        assert_eq!(report.summary.filtered, 4);
        assert_eq!(report.summary.overlapping, 1);
    }

    #[rstest]
    fn test_empty_stream(features: IntervalStore) {
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());
        let report = classifier.classify(Vec::new()).unwrap();
        assert_eq!(report.summary, OverlapSummary::default());
    }

    #[rstest]
    fn test_unmatched_chromosomes_reported_once(features: IntervalStore) {
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());
        let report = classifier
            .classify(reads(&[
                ("chrUn", 0, 10),
                ("chrUn", 20, 30),
                ("chr1", 155, 156),
                ("chrUn", 40, 50),
            ]))
            .unwrap();
        assert_eq!(report.unmatched_chromosomes, vec!["chrUn".to_string()]);
        assert_eq!(report.summary.total_considered, 4);
        assert_eq!(report.summary.overlapping, 1);
    }

    #[rstest]
    fn test_detail_mode(features: IntervalStore) {
        let classifier = OverlapClassifier::new(&features, ReadFilter::default()).with_detail(true);
        let report = classifier
            .classify(reads(&[("chr1", 100, 350), ("chr2", 0, 10)]))
            .unwrap();

        let details = report.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].features, vec!["f1".to_string(), "f2".to_string()]);
        assert!(!details[1].overlaps);
    }

    #[rstest]
    fn test_brute_force_agrees(features: IntervalStore) {
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());
        let spans = [
            ("chr2", 1500, 1600),
            ("chr1", 390, 420),
            ("chr1", 0, 150),
            ("chr1", 159, 160),
        ];
        let sweep = classifier.classify(reads(&spans)).unwrap();
        let mut bf = BruteForceOverlapper::new(&features);
        let brute = classifier.classify_with(&mut bf, reads(&spans)).unwrap();
        assert_eq!(sweep.summary, brute.summary);
        assert_eq!(sweep.summary.overlapping, 3);
    }

    #[rstest]
    fn test_parallel_matches_sequential(features: IntervalStore) {
        let chr1: Arc<str> = Arc::from("chr1");
        let chr2: Arc<str> = Arc::from("chr2");
        let source = InMemoryAlignmentSource::new(vec![
            AlignmentRecord::mapped(&chr1, 100, 200),
            AlignmentRecord::mapped(&chr1, 200, 300),
            AlignmentRecord::mapped(&chr1, 350, 360).with_flags(ReadFlags::SECONDARY),
            AlignmentRecord::mapped(&chr2, 1900, 2100),
            AlignmentRecord::mapped(&chr2, 5000, 5100),
        ]);
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());

        let sequential = classifier.classify_source(&mut source.clone()).unwrap();
        let parallel = classifier.classify_parallel(&source).unwrap();

        assert_eq!(sequential.summary, parallel.summary);
        assert_eq!(sequential.mode, ClassificationMode::Sequential);
        assert_eq!(parallel.mode, ClassificationMode::PerChromosome);
        assert_eq!(parallel.summary.total_considered, 4);
        assert_eq!(parallel.summary.overlapping, 2);
        assert_eq!(parallel.summary.filtered, 1);
    }

    #[rstest]
    fn test_per_chromosome_skips_unvisited_reads(features: IntervalStore) {
        let chr1: Arc<str> = Arc::from("chr1");
        let unplaced: Arc<str> = Arc::from("*");
        let source = InMemoryAlignmentSource::new(vec![
            AlignmentRecord::mapped(&chr1, 100, 200),
            AlignmentRecord::mapped(&chr1, 150, 250).with_flags(ReadFlags::SECONDARY),
            AlignmentRecord::mapped(&unplaced, 0, 0).with_flags(ReadFlags::UNMAPPED),
        ]);
        let classifier = OverlapClassifier::new(&features, ReadFilter::default());

        let sequential = classifier.classify_source(&mut source.clone()).unwrap();
        let parallel = classifier.classify_parallel(&source).unwrap();

        assert_eq!(sequential.summary.filtered, 2);
        assert_eq!(parallel.summary.filtered, 1);
        assert_eq!(
            (sequential.summary.total_considered, sequential.summary.overlapping),
            (parallel.summary.total_considered, parallel.summary.overlapping)
        );
        assert_eq!(parallel.mode, ClassificationMode::PerChromosome);
    }
}
