//! Per-chromosome, coordinate-sorted interval storage.
//!
//! The [`IntervalStore`] is built once from parsed annotation records and then only read. Both
//! the coverage engine (targets) and the overlap classifier (features) consume it.
//!
//! ```
//! use depletr_core::models::{IntervalStore, RawInterval};
//!
//! let build = IntervalStore::build(vec![
//!     RawInterval::new("chr2", 500, 600, "b"),
//!     RawInterval::new("chr1", 300, 400, "c"),
//!     RawInterval::new("chr1", 100, 200, "a"),
//!     RawInterval::new("chr1", 50, 50, "empty"),
//! ]);
//!
//! assert_eq!(build.rejected.len(), 1);
//! let store = build.store;
//! assert_eq!(store.chromosomes().collect::<Vec<_>>(), vec!["chr2", "chr1"]);
//! assert_eq!(store.intervals_for("chr1")[0].name(), "a");
//! assert!(store.intervals_for("chrX").is_empty());
//! ```
use fxhash::FxHashMap as HashMap;

use crate::errors::IntervalError;
use crate::models::{GenomicInterval, RawInterval};

/// A record that was dropped while building a store, with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedInterval {
    pub index: usize,
    pub error: IntervalError,
}

/// Result of [`IntervalStore::build`]: the store plus every record that failed validation.
#[derive(Debug, Clone)]
pub struct StoreBuild {
    pub store: IntervalStore,
    pub rejected: Vec<RejectedInterval>,
}

#[derive(Debug, Clone)]
struct ChromGroup {
    chr: String,
    intervals: Vec<GenomicInterval>,
}

///
/// Genomic intervals grouped by chromosome.
///
/// Within a chromosome, intervals are ordered by start, then end, then input order. Chromosome
/// groups keep the order in which each chromosome first appeared in the input.
///
#[derive(Debug, Clone, Default)]
pub struct IntervalStore {
    groups: Vec<ChromGroup>,
    index: HashMap<String, usize>,
    len: usize,
}

impl IntervalStore {
    /// Validate and store `records`. Malformed records are rejected one by one and reported in
    /// [`StoreBuild::rejected`]; they never abort the load.
    pub fn build<R>(records: R) -> StoreBuild
    where
        R: IntoIterator<Item = RawInterval>,
    {
        let mut valid = Vec::new();
        let mut rejected = Vec::new();

        for (index, raw) in records.into_iter().enumerate() {
            match GenomicInterval::try_from(raw) {
                Ok(iv) => valid.push(iv),
                Err(error) => {
                    log::warn!("Skipping annotation record #{}: {}", index + 1, error);
                    rejected.push(RejectedInterval { index, error });
                }
            }
        }

        StoreBuild {
            store: IntervalStore::from_intervals(valid),
            rejected,
        }
    }

    /// Like [`IntervalStore::build`], but the first malformed record fails the whole load.
    pub fn build_strict<R>(records: R) -> Result<IntervalStore, IntervalError>
    where
        R: IntoIterator<Item = RawInterval>,
    {
        let intervals = records
            .into_iter()
            .map(GenomicInterval::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IntervalStore::from_intervals(intervals))
    }

    /// Store already validated intervals.
    pub fn from_intervals<I>(intervals: I) -> IntervalStore
    where
        I: IntoIterator<Item = GenomicInterval>,
    {
        let mut groups: Vec<ChromGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::default();
        let mut len = 0;

        for iv in intervals {
            let slot = match index.get(iv.chr()) {
                Some(slot) => *slot,
                None => {
                    index.insert(iv.chr().to_string(), groups.len());
                    groups.push(ChromGroup {
                        chr: iv.chr().to_string(),
                        intervals: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[slot].intervals.push(iv);
            len += 1;
        }

        // stable: equal (start, end) keep their input order
        for group in groups.iter_mut() {
            group.intervals.sort_by_key(|iv| (iv.start(), iv.end()));
        }

        IntervalStore { groups, index, len }
    }

    /// Sorted intervals on `chr`. An unknown chromosome yields an empty slice.
    pub fn intervals_for(&self, chr: &str) -> &[GenomicInterval] {
        match self.index.get(chr) {
            Some(slot) => &self.groups[*slot].intervals,
            None => &[],
        }
    }

    /// Every stored interval, chromosome by chromosome in order of first appearance.
    pub fn all(&self) -> impl Iterator<Item = &GenomicInterval> {
        self.groups.iter().flat_map(|g| g.intervals.iter())
    }

    /// `(chromosome, sorted intervals)` pairs in order of first appearance.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[GenomicInterval])> {
        self.groups
            .iter()
            .map(|g| (g.chr.as_str(), g.intervals.as_slice()))
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.chr.as_str())
    }

    pub fn contains_chromosome(&self, chr: &str) -> bool {
        self.index.contains_key(chr)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<GenomicInterval> for IntervalStore {
    fn from_iter<T: IntoIterator<Item = GenomicInterval>>(iter: T) -> Self {
        IntervalStore::from_intervals(iter)
    }
}
