use depletr_core::models::GenomicInterval;

/// Work counters kept by an overlapper, used to check how much effort a stream cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapWork {
    /// Interval coordinate comparisons made while answering queries.
    pub comparisons: u64,
    /// Forward cursor moves.
    pub steps: u64,
    /// Binary-search repositionings (chromosome switches and backwards moves).
    pub seeks: u64,
}

impl OverlapWork {
    pub fn total(&self) -> u64 {
        self.comparisons + self.steps
    }
}

///
/// Answers "does this read hit any feature?" for a stream of reads.
///
/// Implementations may keep state between calls (a sweep cursor does), so reads should be fed
/// in the order they come off the stream. Every implementation must give the same answers for
/// the same stream regardless of order.
///
pub trait ReadOverlapper<'a> {
    /// Half-open overlap of `[start, end)` on `chr` with at least one feature.
    fn overlaps(&mut self, chr: &str, start: u32, end: u32) -> bool;

    /// All features overlapping `[start, end)` on `chr`, in store order.
    fn overlapping(&mut self, chr: &str, start: u32, end: u32) -> Vec<&'a GenomicInterval>;

    /// Whether any feature sits on `chr` at all.
    fn knows_chromosome(&self, chr: &str) -> bool;

    fn work(&self) -> OverlapWork;
}
