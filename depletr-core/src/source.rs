//! Access to aligned reads.
//!
//! An [`AlignmentSource`] is a single cursor over one alignment file: region queries for the
//! coverage engine, whole-file iteration for the overlap classifier. A source is never shared
//! between threads. Parallel workers each open their own through an [`AlignmentSourceFactory`].
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use fxhash::FxHashSet as HashSet;

use crate::errors::SourceError;
use crate::models::AlignmentRecord;

/// Boxed stream of records handed out by a source.
pub type Records<'a> = Box<dyn Iterator<Item = Result<AlignmentRecord, SourceError>> + 'a>;

pub trait AlignmentSource {
    /// Reference sequence names known to the source, in header order.
    fn chromosomes(&self) -> &[Arc<str>];

    fn contains_chromosome(&self, chr: &str) -> bool {
        self.chromosomes().iter().any(|c| c.as_ref() == chr)
    }

    /// Records whose aligned span overlaps `[start, end)` on `chr`, in coordinate order.
    ///
    /// A chromosome the source does not know yields an empty stream.
    fn fetch(&mut self, chr: &str, start: u32, end: u32) -> Result<Records<'_>, SourceError>;

    /// Every record placed on `chr`.
    fn fetch_chromosome(&mut self, chr: &str) -> Result<Records<'_>, SourceError>;

    /// Every record in file order, including unmapped ones.
    fn records(&mut self) -> Result<Records<'_>, SourceError>;

    /// Human readable name, used in log messages.
    fn label(&self) -> String;
}

/// Opens independent handles on the same alignment data.
pub trait AlignmentSourceFactory: Send + Sync {
    type Source: AlignmentSource;

    fn open(&self) -> Result<Self::Source, SourceError>;
}

///
/// A source opened for the duration of one unit of work.
///
/// The handle is released when the session goes out of scope, on success and on error alike.
///
pub struct AlignmentSession<S: AlignmentSource> {
    source: S,
}

impl<S: AlignmentSource> AlignmentSession<S> {
    pub fn open<F>(factory: &F) -> Result<Self, SourceError>
    where
        F: AlignmentSourceFactory<Source = S>,
    {
        let source = factory.open()?;
        log::debug!("Opened alignment source {}", source.label());
        Ok(AlignmentSession { source })
    }

    /// Open a session, run `f` against it, and release it whatever `f` returns.
    pub fn scoped<F, T, E>(factory: &F, f: impl FnOnce(&mut S) -> Result<T, E>) -> Result<T, E>
    where
        F: AlignmentSourceFactory<Source = S>,
        E: From<SourceError>,
    {
        let mut session = AlignmentSession::open(factory)?;
        f(&mut session.source)
    }
}

impl<S: AlignmentSource> Deref for AlignmentSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.source
    }
}

impl<S: AlignmentSource> DerefMut for AlignmentSession<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: AlignmentSource> Drop for AlignmentSession<S> {
    fn drop(&mut self) {
        log::debug!("Released alignment source {}", self.source.label());
    }
}

///
/// Alignment records held in memory.
///
/// Records are kept in the order they were given, so [`AlignmentSource::records`] replays them
/// exactly (sorted or not). Region fetches return them ordered by start. Cloning is cheap and
/// the value is its own factory.
///
#[derive(Debug, Clone)]
pub struct InMemoryAlignmentSource {
    records: Arc<Vec<AlignmentRecord>>,
    chromosomes: Arc<Vec<Arc<str>>>,
}

impl InMemoryAlignmentSource {
    pub fn new(records: Vec<AlignmentRecord>) -> Self {
        let mut seen: HashSet<Arc<str>> = HashSet::default();
        let mut chromosomes = Vec::new();
        for rec in records.iter() {
            if seen.insert(Arc::clone(&rec.chr)) {
                chromosomes.push(Arc::clone(&rec.chr));
            }
        }
        InMemoryAlignmentSource {
            records: Arc::new(records),
            chromosomes: Arc::new(chromosomes),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn sorted_matching<P>(&self, keep: P) -> Records<'_>
    where
        P: Fn(&AlignmentRecord) -> bool,
    {
        let mut hits: Vec<AlignmentRecord> =
            self.records.iter().filter(|r| keep(*r)).cloned().collect();
        hits.sort_by_key(|r| (r.start, r.end));
        Box::new(hits.into_iter().map(Ok))
    }
}

impl AlignmentSource for InMemoryAlignmentSource {
    fn chromosomes(&self) -> &[Arc<str>] {
        &self.chromosomes
    }

    fn fetch(&mut self, chr: &str, start: u32, end: u32) -> Result<Records<'_>, SourceError> {
        Ok(self.sorted_matching(|r| {
            !r.flags.is_unmapped() && r.chr.as_ref() == chr && r.overlaps(start, end)
        }))
    }

    fn fetch_chromosome(&mut self, chr: &str) -> Result<Records<'_>, SourceError> {
        Ok(self.sorted_matching(|r| !r.flags.is_unmapped() && r.chr.as_ref() == chr))
    }

    fn records(&mut self) -> Result<Records<'_>, SourceError> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }

    fn label(&self) -> String {
        format!("<memory: {} records>", self.records.len())
    }
}

impl AlignmentSourceFactory for InMemoryAlignmentSource {
    type Source = InMemoryAlignmentSource;

    fn open(&self) -> Result<Self::Source, SourceError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::models::ReadFlags;

    #[fixture]
    fn source() -> InMemoryAlignmentSource {
        let chr1: Arc<str> = Arc::from("chr1");
        let chr2: Arc<str> = Arc::from("chr2");
        InMemoryAlignmentSource::new(vec![
            AlignmentRecord::mapped(&chr1, 500, 550),
            AlignmentRecord::mapped(&chr2, 10, 60),
            AlignmentRecord::mapped(&chr1, 100, 150),
            AlignmentRecord::mapped(&chr1, 120, 170).with_flags(ReadFlags::UNMAPPED),
        ])
    }

    #[rstest]
    fn test_fetch_sorted_and_overlapping(mut source: InMemoryAlignmentSource) {
        let starts: Vec<u32> = source
            .fetch("chr1", 0, 1000)
            .unwrap()
            .map(|r| r.unwrap().start)
            .collect();
        assert_eq!(starts, vec![100, 500]);

        assert_eq!(source.fetch("chr1", 150, 500).unwrap().count(), 0);
        assert_eq!(source.fetch("chrX", 0, 1000).unwrap().count(), 0);
    }

    #[rstest]
    fn test_records_replay_input_order(mut source: InMemoryAlignmentSource) {
        let starts: Vec<u32> = source.records().unwrap().map(|r| r.unwrap().start).collect();
        assert_eq!(starts, vec![500, 10, 100, 120]);
    }

    #[rstest]
    fn test_chromosomes(source: InMemoryAlignmentSource) {
        let names: Vec<&str> = source.chromosomes().iter().map(|c| c.as_ref()).collect();
        assert_eq!(names, vec!["chr1", "chr2"]);
        assert!(source.contains_chromosome("chr2"));
        assert!(!source.contains_chromosome("chrM"));
    }

    #[rstest]
    fn test_scoped_session(source: InMemoryAlignmentSource) {
        let n: Result<usize, SourceError> =
            AlignmentSession::scoped(&source, |s: &mut InMemoryAlignmentSource| {
                Ok(s.fetch_chromosome("chr1")?.count())
            });
        assert_eq!(n.unwrap(), 2);

        let failed: Result<usize, SourceError> =
            AlignmentSession::scoped(&source, |_: &mut InMemoryAlignmentSource| {
                Err(SourceError::Record("boom".to_string()))
            });
        assert!(failed.is_err());
    }
}
