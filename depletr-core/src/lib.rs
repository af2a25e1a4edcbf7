//! Core models for depletr.
//!
//! This crate holds the types every other depletr crate speaks: validated genomic intervals and
//! the per-chromosome [`IntervalStore`](models::IntervalStore), aligned reads and the
//! [`ReadFilter`](filter::ReadFilter) that decides which of them count, the
//! [`AlignmentSource`](source::AlignmentSource) abstraction over alignment files, and the
//! [`DepletionMetrics`](models::DepletionMetrics) record produced per target.
//!
//! ```rust
//! use std::sync::Arc;
//! use depletr_core::filter::ReadFilter;
//! use depletr_core::models::{AlignmentRecord, ReadFlags};
//!
//! let chr: Arc<str> = Arc::from("chr1");
//! let filter = ReadFilter::new(10, false);
//!
//! assert!(filter.passes(&AlignmentRecord::mapped(&chr, 100, 150)));
//! assert!(!filter.passes(&AlignmentRecord::mapped(&chr, 100, 150).with_mapq(3)));
//! assert!(!filter.passes(&AlignmentRecord::mapped(&chr, 100, 150).with_flags(ReadFlags::SECONDARY)));
//! ```
pub mod errors;
pub mod filter;
pub mod models;
pub mod source;
pub mod utils;
