use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use depletr_core::models::DepletionMetrics;

use crate::errors::StatsError;
use crate::models::MetricName;

///
/// Weights of the composite score. They must be non-negative and sum to 1.
///
/// The cv term rewards low variation, so it enters the score as `1 - normalized cv`.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub depletion: f64,
    pub uniformity: f64,
    pub zero_coverage: f64,
    pub cv: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        RankingWeights {
            depletion: 0.4,
            uniformity: 0.3,
            zero_coverage: 0.2,
            cv: 0.1,
        }
    }
}

impl RankingWeights {
    pub const TOLERANCE: f64 = 1e-6;

    pub fn new(
        depletion: f64,
        uniformity: f64,
        zero_coverage: f64,
        cv: f64,
    ) -> Result<Self, StatsError> {
        let weights = RankingWeights {
            depletion,
            uniformity,
            zero_coverage,
            cv,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.depletion + self.uniformity + self.zero_coverage + self.cv
    }

    pub fn validate(&self) -> Result<(), StatsError> {
        let named = [
            ("depletion", self.depletion),
            ("uniformity", self.uniformity),
            ("zero_coverage", self.zero_coverage),
            ("cv", self.cv),
        ];
        for (name, w) in named {
            if !w.is_finite() || w < 0.0 {
                return Err(StatsError::InvalidWeight(name));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > Self::TOLERANCE {
            return Err(StatsError::InvalidWeights(sum));
        }
        Ok(())
    }
}

/// Min-max normalize into `[0, 1]`. A constant column maps to all zeros.
pub(crate) fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if range.is_nan() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - lo) / range).collect()
}

///
/// Composite score of every record, in input order.
///
/// Each column is min-max normalized over the given records, so scores are only comparable within
/// one call. A missing depletion efficiency counts as the record's zero-coverage fraction.
///
pub fn composite_scores(
    metrics: &[DepletionMetrics],
    weights: &RankingWeights,
) -> Result<Vec<f64>, StatsError> {
    weights.validate()?;

    let depletion = min_max_normalize(&MetricName::DepletionEfficiency.column(metrics));
    let uniformity = min_max_normalize(&MetricName::CoverageUniformity.column(metrics));
    let zero = min_max_normalize(&MetricName::ZeroCoverageFraction.column(metrics));
    let cv = min_max_normalize(&MetricName::CoefficientOfVariation.column(metrics));

    Ok((0..metrics.len())
        .map(|i| {
            weights.depletion * depletion[i]
                + weights.uniformity * uniformity[i]
                + weights.zero_coverage * zero[i]
                + weights.cv * (1.0 - cv[i])
        })
        .collect())
}

///
/// Score and rank targets, best first.
///
/// Returns new records carrying their composite score; the input is left untouched. Ties are
/// broken by gRNA name.
///
/// # Examples
///
/// ```
/// use depletr_stats::{RankingWeights, rank};
///
/// let ranked = rank(&[], &RankingWeights::default()).unwrap();
/// assert!(ranked.is_empty());
///
/// let lopsided = RankingWeights { depletion: 0.9, ..RankingWeights::default() };
/// assert!(rank(&[], &lopsided).is_err());
/// ```
///
pub fn rank(
    metrics: &[DepletionMetrics],
    weights: &RankingWeights,
) -> Result<Vec<DepletionMetrics>, StatsError> {
    let scores = composite_scores(metrics, weights)?;
    let scored = metrics
        .iter()
        .zip(scores)
        .map(|(m, score)| m.with_composite_score(score))
        .collect();

    log::debug!("Ranked {} targets", metrics.len());
    Ok(rank_scored(scored))
}

/// Order records that already carry a composite score. Unscored records sort last.
pub fn rank_scored(mut metrics: Vec<DepletionMetrics>) -> Vec<DepletionMetrics> {
    metrics.sort_by(|a, b| by_score_desc(a, b).then_with(|| a.grna_name.cmp(&b.grna_name)));
    metrics
}

fn by_score_desc(a: &DepletionMetrics, b: &DepletionMetrics) -> Ordering {
    match (a.composite_score, b.composite_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
