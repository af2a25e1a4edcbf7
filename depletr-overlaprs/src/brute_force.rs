use depletr_core::models::{GenomicInterval, IntervalStore};

use crate::traits::{OverlapWork, ReadOverlapper};

///
/// Reference overlapper that compares every read with every stored feature.
///
/// Quadratic on purpose: it has no state and no ordering assumptions, so it serves as ground
/// truth for [`SweepCursor`](crate::SweepCursor).
///
#[derive(Debug)]
pub struct BruteForceOverlapper<'a> {
    store: &'a IntervalStore,
    work: OverlapWork,
}

impl<'a> BruteForceOverlapper<'a> {
    pub fn new(store: &'a IntervalStore) -> Self {
        BruteForceOverlapper {
            store,
            work: OverlapWork::default(),
        }
    }
}

impl<'a> ReadOverlapper<'a> for BruteForceOverlapper<'a> {
    fn overlaps(&mut self, chr: &str, start: u32, end: u32) -> bool {
        let mut hit = false;
        for iv in self.store.all() {
            self.work.comparisons += 1;
            if iv.chr() == chr && iv.overlaps(start, end) {
                hit = true;
            }
        }
        hit
    }

    fn overlapping(&mut self, chr: &str, start: u32, end: u32) -> Vec<&'a GenomicInterval> {
        let store: &'a IntervalStore = self.store;
        let mut hits = Vec::new();
        for iv in store.all() {
            self.work.comparisons += 1;
            if iv.chr() == chr && iv.overlaps(start, end) {
                hits.push(iv);
            }
        }
        hits
    }

    fn knows_chromosome(&self, chr: &str) -> bool {
        self.store.contains_chromosome(chr)
    }

    fn work(&self) -> OverlapWork {
        self.work
    }
}
