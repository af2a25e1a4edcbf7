use depletr_core::models::{DepletionEfficiency, DepletionMetrics};

/// A target with the given shape metrics. `None` depletion means no control sample.
pub(crate) fn target(
    name: &str,
    depletion: Option<f64>,
    uniformity: f64,
    zero_fraction: f64,
    cv: f64,
) -> DepletionMetrics {
    DepletionMetrics {
        grna_name: name.to_string(),
        chromosome: "chr1".to_string(),
        start: 1000,
        end: 1500,
        mean_coverage_treated: 5.0,
        mean_coverage_control: depletion.map(|_| 10.0),
        median_coverage: 5.0,
        depletion_efficiency: match depletion {
            Some(e) => DepletionEfficiency::Measured(e),
            None => DepletionEfficiency::NoControl,
        },
        coverage_uniformity: uniformity,
        zero_coverage_fraction: zero_fraction,
        coefficient_of_variation: cv,
        composite_score: None,
    }
}
