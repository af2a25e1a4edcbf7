//! # Statistics over depletion metrics
//!
//! Everything here works on a slice of [`DepletionMetrics`](depletr_core::models::DepletionMetrics)
//! produced by the coverage engine:
//!
//! - [`rank`] scores targets with a weighted composite and sorts them, best first.
//! - [`find_outliers`] flags targets whose score (or depletion) stands apart from the rest.
//! - [`compare_groups`] runs a two-sample t-test per metric between two sets of targets.
//! - [`correlation_matrix`] and [`summarize`] describe the metric distributions.
//! - [`recommend_all`] turns poor metrics into design advice.
//!
//! ```
//! use depletr_stats::{ComparisonConfig, OutlierRule, RankingWeights, find_outliers, rank};
//!
//! let ranked = rank(&[], &RankingWeights::default()).unwrap();
//! let outliers = find_outliers(&ranked, &OutlierRule::default()).unwrap();
//! assert!(outliers.is_empty());
//! assert_eq!(ComparisonConfig::default().alpha, 0.05);
//! ```
pub mod comparison;
pub mod correlation;
pub mod errors;
pub mod models;
pub mod outliers;
pub mod ranking;
pub mod recommendations;
pub mod summary;

#[cfg(test)]
mod testing;

pub use comparison::{
    ComparisonConfig, ComparisonResult, ComparisonStatus, GroupSummary, TestKind, compare_groups,
    compare_values,
};
pub use correlation::{CorrelationMatrix, correlation_matrix, pearson};
pub use errors::StatsError;
pub use models::MetricName;
pub use outliers::{OutlierBasis, OutlierRule, Outliers, find_outliers};
pub use ranking::{RankingWeights, composite_scores, rank, rank_scored};
pub use recommendations::{
    Category, DesignThresholds, Recommendation, Severity, recommend, recommend_all,
    severity_counts,
};
pub use summary::{SummaryStatistics, summarize};
