//! Coverage and depletion metrics over target intervals.
//!
//! - [`coverage`]: per-base depth profile of one target from an alignment source
//! - [`metrics`]: mean/median coverage, cv, uniformity, zero fraction and depletion efficiency
//! - [`analyzer`]: runs both over every target of an [`IntervalStore`](depletr_core::models::IntervalStore)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use depletr_core::filter::ReadFilter;
//! use depletr_core::models::{AlignmentRecord, GenomicInterval};
//! use depletr_core::source::InMemoryAlignmentSource;
//! use depletr_coverage::{calculate_metrics, compute_coverage};
//!
//! let chr: Arc<str> = Arc::from("chr1");
//! let target = GenomicInterval::new("chr1", 100, 110, "sgA").unwrap();
//! let mut treated = InMemoryAlignmentSource::new(vec![AlignmentRecord::mapped(&chr, 95, 105)]);
//!
//! let profile = compute_coverage(&mut treated, &target, &ReadFilter::default()).unwrap();
//! assert_eq!(profile.depths(), &[1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
//!
//! let metrics = calculate_metrics(&target, &profile, None).unwrap();
//! assert_eq!(metrics.zero_coverage_fraction, 0.5);
//! ```
pub mod analyzer;
pub mod coverage;
pub mod errors;
pub mod metrics;

pub use analyzer::{AnalysisConfig, AnalysisOutput, AnalysisWarning, DepletionAnalyzer, Sample};
pub use coverage::{CoverageProfile, accumulate_coverage, compute_coverage};
pub use errors::CoverageError;
pub use metrics::{DepthStats, calculate_metrics};
