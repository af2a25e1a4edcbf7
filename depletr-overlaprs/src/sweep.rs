//! Sorted-interval sweep.
//!
//! [`SweepIndex`] is built once per feature store and shared read-only. Each stream of reads gets
//! its own [`SweepCursor`], which remembers where it is on the current chromosome so that a
//! coordinate-sorted stream is classified in a single forward pass.
//!
//! ```
//! use depletr_core::models::{IntervalStore, RawInterval};
//! use depletr_overlaprs::{ReadOverlapper, SweepCursor, SweepIndex};
//!
//! let store = IntervalStore::build(vec![
//!     RawInterval::new("chr1", 150, 160, "a"),
//!     RawInterval::new("chr1", 300, 400, "b"),
//! ])
//! .store;
//! let index = SweepIndex::new(&store);
//! let mut cursor = SweepCursor::new(&index);
//!
//! assert!(cursor.overlaps("chr1", 100, 200));
//! assert!(!cursor.overlaps("chr1", 200, 300));
//! assert!(cursor.overlaps("chr1", 350, 351));
//! ```
use fxhash::FxHashMap as HashMap;

use depletr_core::models::{GenomicInterval, IntervalStore};

use crate::traits::{OverlapWork, ReadOverlapper};

/// Sorted intervals of one chromosome plus the running maximum of their ends.
#[derive(Debug)]
pub struct ChromSweep<'a> {
    intervals: &'a [GenomicInterval],
    max_end: Vec<u32>,
}

impl<'a> ChromSweep<'a> {
    pub fn new(intervals: &'a [GenomicInterval]) -> Self {
        let mut running = 0u32;
        let max_end = intervals
            .iter()
            .map(|iv| {
                running = running.max(iv.end());
                running
            })
            .collect();
        ChromSweep { intervals, max_end }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// First index whose running max end lies past `start`. Everything before it ends at or
    /// before `start`.
    #[inline]
    fn lower_bound(&self, start: u32) -> usize {
        self.max_end.partition_point(|&m| m <= start)
    }
}

/// Per-chromosome sweep structures over an [`IntervalStore`].
#[derive(Debug)]
pub struct SweepIndex<'a> {
    chroms: HashMap<&'a str, ChromSweep<'a>>,
}

impl<'a> SweepIndex<'a> {
    pub fn new(store: &'a IntervalStore) -> Self {
        let chroms = store
            .groups()
            .map(|(chr, intervals)| (chr, ChromSweep::new(intervals)))
            .collect();
        SweepIndex { chroms }
    }

    pub fn chromosome(&self, chr: &str) -> Option<&ChromSweep<'a>> {
        self.chroms.get(chr)
    }

    pub fn contains_chromosome(&self, chr: &str) -> bool {
        self.chroms.contains_key(chr)
    }
}

///
/// Stateful cursor over a [`SweepIndex`].
///
/// Invariant: on the current chromosome, every interval before `pos` ends at or before the start
/// of the last read seen. Moving to a new chromosome, or to a read that starts before the previous
/// one, repositions by binary search. Otherwise the cursor only moves forward.
///
#[derive(Debug)]
pub struct SweepCursor<'a> {
    index: &'a SweepIndex<'a>,
    current_chr: Option<String>,
    chrom: Option<&'a ChromSweep<'a>>,
    pos: usize,
    last_start: u32,
    work: OverlapWork,
}

impl<'a> SweepCursor<'a> {
    pub fn new(index: &'a SweepIndex<'a>) -> Self {
        SweepCursor {
            index,
            current_chr: None,
            chrom: None,
            pos: 0,
            last_start: 0,
            work: OverlapWork::default(),
        }
    }

    /// Index of the cursor within the current chromosome.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn current_chromosome(&self) -> Option<&str> {
        self.current_chr.as_deref()
    }

    fn seek(&mut self, start: u32) {
        self.work.seeks += 1;
        self.pos = match self.chrom {
            Some(chrom) => {
                self.work.comparisons += (usize::BITS - chrom.len().leading_zeros()) as u64;
                chrom.lower_bound(start)
            }
            None => 0,
        };
    }

    /// Move the cursor for a read starting at `start` on `chr`.
    fn advance(&mut self, chr: &str, start: u32) {
        if self.current_chr.as_deref() != Some(chr) {
            self.current_chr = Some(chr.to_string());
            self.chrom = self.index.chromosome(chr);
            self.seek(start);
        } else if start < self.last_start {
            self.seek(start);
        } else if let Some(chrom) = self.chrom {
            while self.pos < chrom.len() && chrom.max_end[self.pos] <= start {
                self.pos += 1;
                self.work.steps += 1;
            }
        }
        self.last_start = start;
    }
}

impl<'a> ReadOverlapper<'a> for SweepCursor<'a> {
    fn overlaps(&mut self, chr: &str, start: u32, end: u32) -> bool {
        self.advance(chr, start);
        let Some(chrom) = self.chrom else {
            return false;
        };
        self.work.comparisons += 1;
        // intervals[pos] ends past `start`, and every later one starts at or after it
        self.pos < chrom.len() && chrom.intervals[self.pos].start() < end
    }

    fn overlapping(&mut self, chr: &str, start: u32, end: u32) -> Vec<&'a GenomicInterval> {
        self.advance(chr, start);
        let Some(chrom) = self.chrom else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for iv in chrom.intervals[self.pos..].iter() {
            self.work.comparisons += 1;
            if iv.start() >= end {
                break;
            }
            if iv.end() > start {
                hits.push(iv);
            }
        }
        hits
    }

    fn knows_chromosome(&self, chr: &str) -> bool {
        self.index.contains_chromosome(chr)
    }

    fn work(&self) -> OverlapWork {
        self.work
    }
}
