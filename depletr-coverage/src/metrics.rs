use depletr_core::models::{DepletionEfficiency, DepletionMetrics, GenomicInterval};
use depletr_core::utils::{mean, median, population_std};

use crate::coverage::CoverageProfile;
use crate::errors::CoverageError;

/// Shape statistics of a single depth sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    /// `std / mean`, 0 when the mean is 0.
    pub cv: f64,
    /// `1 / (1 + cv)`
    pub uniformity: f64,
    pub zero_fraction: f64,
}

impl DepthStats {
    pub fn from_depths(depths: &[u32]) -> Option<Self> {
        let mean = mean(depths)?;
        let std = population_std(depths)?;
        let median = median(depths)?;
        let cv = if mean == 0.0 { 0.0 } else { std / mean };
        let zeros = depths.iter().filter(|&&d| d == 0).count();

        Some(DepthStats {
            mean,
            median,
            std,
            cv,
            uniformity: 1.0 / (1.0 + cv),
            zero_fraction: zeros as f64 / depths.len() as f64,
        })
    }
}

///
/// Derive [`DepletionMetrics`] for `target` from its treated profile and, optionally, a control
/// profile over the same interval.
///
/// Shape metrics (cv, uniformity, zero fraction, median) describe the treated sample.
///
pub fn calculate_metrics(
    target: &GenomicInterval,
    treated: &CoverageProfile,
    control: Option<&CoverageProfile>,
) -> Result<DepletionMetrics, CoverageError> {
    let stats = DepthStats::from_depths(treated.depths())
        .ok_or_else(|| CoverageError::EmptyInterval(target.name().to_string()))?;

    let control_mean = match control {
        Some(profile) => Some(
            mean(profile.depths())
                .ok_or_else(|| CoverageError::EmptyInterval(target.name().to_string()))?,
        ),
        None => None,
    };

    Ok(DepletionMetrics {
        grna_name: target.name().to_string(),
        chromosome: target.chr().to_string(),
        start: target.start(),
        end: target.end(),
        mean_coverage_treated: stats.mean,
        mean_coverage_control: control_mean,
        median_coverage: stats.median,
        depletion_efficiency: DepletionEfficiency::from_means(stats.mean, control_mean),
        coverage_uniformity: stats.uniformity,
        zero_coverage_fraction: stats.zero_fraction,
        coefficient_of_variation: stats.cv,
        composite_score: None,
    })
}
