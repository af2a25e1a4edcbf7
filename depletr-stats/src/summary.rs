use serde::{Deserialize, Serialize};

use depletr_core::models::DepletionMetrics;
use depletr_core::utils::{mean, median, percentile, population_std};

use crate::models::MetricName;

/// Distribution of one metric across targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub metric: MetricName,
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

impl SummaryStatistics {
    /// `None` for an empty slice.
    pub fn from_values(metric: MetricName, values: &[f64]) -> Option<Self> {
        Some(SummaryStatistics {
            metric,
            n: values.len(),
            mean: mean(values)?,
            median: median(values)?,
            std: population_std(values)?,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            q25: percentile(values, 0.25)?,
            q75: percentile(values, 0.75)?,
        })
    }
}

///
/// Summary statistics for every metric in [`MetricName::ALL`].
///
/// Only measured depletion efficiencies are summarized; the metric is left out entirely when no
/// target has one.
///
pub fn summarize(metrics: &[DepletionMetrics]) -> Vec<SummaryStatistics> {
    MetricName::ALL
        .iter()
        .filter_map(|metric| {
            let values: Vec<f64> = metrics.iter().filter_map(|m| metric.value(m)).collect();
            SummaryStatistics::from_values(*metric, &values)
        })
        .collect()
}
