use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use depletr_core::models::{DepletionEfficiency, DepletionMetrics};

/// A named scalar column of [`DepletionMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    DepletionEfficiency,
    CoverageUniformity,
    ZeroCoverageFraction,
    CoefficientOfVariation,
    MeanCoverage,
    MedianCoverage,
}

impl MetricName {
    /// Metrics tested between two groups.
    pub const COMPARED: [MetricName; 4] = [
        MetricName::DepletionEfficiency,
        MetricName::CoverageUniformity,
        MetricName::ZeroCoverageFraction,
        MetricName::CoefficientOfVariation,
    ];

    /// Columns of the correlation matrix.
    pub const CORRELATED: [MetricName; 5] = [
        MetricName::DepletionEfficiency,
        MetricName::CoverageUniformity,
        MetricName::ZeroCoverageFraction,
        MetricName::CoefficientOfVariation,
        MetricName::MeanCoverage,
    ];

    pub const ALL: [MetricName; 6] = [
        MetricName::DepletionEfficiency,
        MetricName::CoverageUniformity,
        MetricName::ZeroCoverageFraction,
        MetricName::CoefficientOfVariation,
        MetricName::MeanCoverage,
        MetricName::MedianCoverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::DepletionEfficiency => "depletion_efficiency",
            MetricName::CoverageUniformity => "coverage_uniformity",
            MetricName::ZeroCoverageFraction => "zero_coverage_fraction",
            MetricName::CoefficientOfVariation => "coefficient_of_variation",
            MetricName::MeanCoverage => "mean_coverage",
            MetricName::MedianCoverage => "median_coverage",
        }
    }

    /// The metric's value for `m`. `None` only for a depletion efficiency that was not measured.
    pub fn value(&self, m: &DepletionMetrics) -> Option<f64> {
        match self {
            MetricName::DepletionEfficiency => m.depletion_efficiency.value(),
            MetricName::CoverageUniformity => Some(m.coverage_uniformity),
            MetricName::ZeroCoverageFraction => Some(m.zero_coverage_fraction),
            MetricName::CoefficientOfVariation => Some(m.coefficient_of_variation),
            MetricName::MeanCoverage => Some(m.mean_coverage_treated),
            MetricName::MedianCoverage => Some(m.median_coverage),
        }
    }

    ///
    /// Like [`MetricName::value`], but a missing depletion efficiency gets a stand-in: the
    /// zero-coverage fraction when no control sample exists, and 0 when the control has no
    /// coverage over the target.
    ///
    pub fn value_or_fallback(&self, m: &DepletionMetrics) -> f64 {
        match (self, &m.depletion_efficiency) {
            (MetricName::DepletionEfficiency, DepletionEfficiency::NoControl) => {
                m.zero_coverage_fraction
            }
            (MetricName::DepletionEfficiency, DepletionEfficiency::ControlUncovered) => 0.0,
            _ => self.value(m).unwrap_or(0.0),
        }
    }

    /// One value per record, with the depletion fallback applied.
    pub fn column(&self, metrics: &[DepletionMetrics]) -> Vec<f64> {
        metrics.iter().map(|m| self.value_or_fallback(m)).collect()
    }
}

impl Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric: {}", s))
    }
}
