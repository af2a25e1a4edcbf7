//! Read/feature overlap classification with a sorted-interval sweep.
//!
//! Features are grouped per chromosome and sorted once. A [`SweepCursor`] walks them alongside a
//! coordinate-sorted read stream, so the cost of classifying a stream is linear in reads plus
//! features (plus a binary search per chromosome switch) instead of reads times features.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use depletr_core::filter::ReadFilter;
//! use depletr_core::models::{AlignmentRecord, IntervalStore, RawInterval};
//! use depletr_overlaprs::OverlapClassifier;
//!
//! let features = IntervalStore::build(vec![
//!     RawInterval::new("chr1", 150, 160, "exon1"),
//!     RawInterval::new("chr1", 300, 400, "exon2"),
//! ])
//! .store;
//!
//! let chr: Arc<str> = Arc::from("chr1");
//! let reads = vec![
//!     Ok(AlignmentRecord::mapped(&chr, 100, 200)),
//!     Ok(AlignmentRecord::mapped(&chr, 200, 300)),
//! ];
//!
//! let classifier = OverlapClassifier::new(&features, ReadFilter::default());
//! let report = classifier.classify(reads).unwrap();
//! assert_eq!(report.summary.overlapping, 1);
//! assert_eq!(report.summary.percentage, 50.0);
//! ```
pub mod brute_force;
pub mod classifier;
pub mod errors;
pub mod sweep;
pub mod traits;

pub use brute_force::BruteForceOverlapper;
pub use classifier::{
    ClassificationMode, OverlapClassifier, OverlapReport, OverlapSummary, ReadOverlap,
};
pub use errors::OverlapError;
pub use sweep::{ChromSweep, SweepCursor, SweepIndex};
pub use traits::{OverlapWork, ReadOverlapper};
