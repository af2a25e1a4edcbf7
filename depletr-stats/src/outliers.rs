use serde::{Deserialize, Serialize};

use depletr_core::models::DepletionMetrics;
use depletr_core::utils::{mean, percentile, population_std};

use crate::errors::StatsError;
use crate::models::MetricName;

/// Below this many records no outliers are reported.
pub const MIN_RECORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum OutlierRule {
    ///
    /// Flag a record when its value lies more than `threshold` standard deviations from the mean
    /// of the *other* records. Leaving the record out keeps a single extreme value from inflating
    /// the spread it is measured against.
    ///
    ZScore { threshold: f64 },

    /// Flag values below the `low` or above the `high` quantile (both in `[0, 1]`).
    Percentile { low: f64, high: f64 },
}

impl Default for OutlierRule {
    fn default() -> Self {
        OutlierRule::ZScore { threshold: 2.0 }
    }
}

impl OutlierRule {
    pub fn validate(&self) -> Result<(), StatsError> {
        match *self {
            OutlierRule::ZScore { threshold } if !(threshold.is_finite() && threshold > 0.0) => {
                Err(StatsError::InvalidOutlierRule(format!(
                    "z-score threshold must be positive (got {})",
                    threshold
                )))
            }
            OutlierRule::Percentile { low, high }
                if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high =>
            {
                Err(StatsError::InvalidOutlierRule(format!(
                    "percentiles must satisfy 0 <= low < high <= 1 (got {}, {})",
                    low, high
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Which value the outlier test looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierBasis {
    CompositeScore,
    DepletionEfficiency,
}

/// gRNA names of outlying targets, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outliers {
    pub basis: OutlierBasis,
    pub high: Vec<String>,
    pub low: Vec<String>,
}

impl Outliers {
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }
}

///
/// Split targets into high and low outliers.
///
/// The composite score is tested when every record carries one (see [`crate::rank`]); otherwise
/// the depletion efficiency is, with the zero-coverage fraction standing in where it was not
/// measured.
///
pub fn find_outliers(
    metrics: &[DepletionMetrics],
    rule: &OutlierRule,
) -> Result<Outliers, StatsError> {
    rule.validate()?;

    let scores: Option<Vec<f64>> = metrics.iter().map(|m| m.composite_score).collect();
    let (basis, values) = match scores {
        Some(scores) if !scores.is_empty() => (OutlierBasis::CompositeScore, scores),
        _ => (
            OutlierBasis::DepletionEfficiency,
            MetricName::DepletionEfficiency.column(metrics),
        ),
    };

    let mut outliers = Outliers {
        basis,
        high: Vec::new(),
        low: Vec::new(),
    };
    if values.len() < MIN_RECORDS {
        log::debug!(
            "Skipping outlier detection for {} record(s), need at least {}",
            values.len(),
            MIN_RECORDS
        );
        return Ok(outliers);
    }

    let flags = match *rule {
        OutlierRule::ZScore { threshold } => leave_one_out_flags(&values, threshold),
        OutlierRule::Percentile { low, high } => percentile_flags(&values, low, high),
    };

    for (m, flag) in metrics.iter().zip(flags) {
        match flag {
            Some(Side::High) => outliers.high.push(m.grna_name.clone()),
            Some(Side::Low) => outliers.low.push(m.grna_name.clone()),
            None => {}
        }
    }
    Ok(outliers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    High,
    Low,
}

fn leave_one_out_flags(values: &[f64], threshold: f64) -> Vec<Option<Side>> {
    let mut rest = Vec::with_capacity(values.len() - 1);
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            rest.clear();
            rest.extend(
                values
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &x)| x),
            );
            let m = mean(&rest)?;
            let sd = population_std(&rest)?;

            // the others agree exactly: any departure from them is an outlier
            let z = if sd == 0.0 {
                if v == m {
                    0.0
                } else {
                    (v - m).signum() * f64::INFINITY
                }
            } else {
                (v - m) / sd
            };

            if z > threshold {
                Some(Side::High)
            } else if z < -threshold {
                Some(Side::Low)
            } else {
                None
            }
        })
        .collect()
}

fn percentile_flags(values: &[f64], low: f64, high: f64) -> Vec<Option<Side>> {
    let (Some(lo), Some(hi)) = (percentile(values, low), percentile(values, high)) else {
        return vec![None; values.len()];
    };
    values
        .iter()
        .map(|&v| {
            if v > hi {
                Some(Side::High)
            } else if v < lo {
                Some(Side::Low)
            } else {
                None
            }
        })
        .collect()
}
