use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use depletr_core::models::DepletionMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DepletionEfficiency,
    CoverageUniformity,
    CoverageVariation,
    CoverageCompleteness,
    EdgeEffects,
    Performance,
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::DepletionEfficiency => "Depletion Efficiency",
            Category::CoverageUniformity => "Coverage Uniformity",
            Category::CoverageVariation => "Coverage Variation",
            Category::CoverageCompleteness => "Coverage Completeness",
            Category::EdgeEffects => "Edge Effects",
            Category::Performance => "Performance",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub grna_name: String,
    pub severity: Severity,
    pub category: Category,
    pub issue: String,
    pub recommendation: String,
    /// 0 (nothing to do) to 5 (redesign).
    pub priority: u8,
}

/// Cut-offs used to judge a target's design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignThresholds {
    pub depletion_critical: f64,
    pub depletion_warning: f64,
    pub uniformity_critical: f64,
    pub uniformity_warning: f64,
    pub cv_warning: f64,
    pub cv_critical: f64,
    pub zero_coverage_low: f64,
    /// Depletion at or above this makes low zero coverage worth reporting.
    pub incomplete_min_depletion: f64,
    pub edge_cv: f64,
    pub edge_uniformity: f64,
    pub excellent_depletion: f64,
    pub excellent_uniformity: f64,
}

impl Default for DesignThresholds {
    fn default() -> Self {
        DesignThresholds {
            depletion_critical: 0.3,
            depletion_warning: 0.6,
            uniformity_critical: 0.3,
            uniformity_warning: 0.5,
            cv_warning: 1.0,
            cv_critical: 2.0,
            zero_coverage_low: 0.5,
            incomplete_min_depletion: 0.5,
            edge_cv: 0.8,
            edge_uniformity: 0.6,
            excellent_depletion: 0.8,
            excellent_uniformity: 0.7,
        }
    }
}

///
/// Design advice for a single target.
///
/// Checks that need a depletion efficiency are skipped when it was not measured.
///
pub fn recommend(m: &DepletionMetrics, t: &DesignThresholds) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let mut push = |severity, category, issue: String, recommendation: &str, priority| {
        out.push(Recommendation {
            grna_name: m.grna_name.clone(),
            severity,
            category,
            issue,
            recommendation: recommendation.to_string(),
            priority,
        })
    };

    let depletion = m.depletion_efficiency.value();
    let uniformity = m.coverage_uniformity;
    let cv = m.coefficient_of_variation;
    let zero = m.zero_coverage_fraction;

    if let Some(d) = depletion {
        if d < t.depletion_critical {
            push(
                Severity::Critical,
                Category::DepletionEfficiency,
                format!("Very low depletion efficiency ({:.3})", d),
                "Consider a complete redesign. Check that the gRNA sequence matches the reference \
                 genome, has no off-target binding, and that the target region is accessible",
                5,
            );
        } else if d < t.depletion_warning {
            push(
                Severity::Warning,
                Category::DepletionEfficiency,
                format!("Moderate depletion efficiency ({:.3})", d),
                "Consider an alternative target location, a higher gRNA concentration or a longer \
                 incubation",
                3,
            );
        }
    }

    if uniformity < t.uniformity_critical {
        push(
            Severity::Critical,
            Category::CoverageUniformity,
            format!("Very poor coverage uniformity ({:.3})", uniformity),
            "Uneven depletion points at secondary structure or repeats in the target region. \
             Consider several shorter gRNAs instead",
            4,
        );
    } else if uniformity < t.uniformity_warning {
        push(
            Severity::Warning,
            Category::CoverageUniformity,
            format!("Moderate coverage uniformity ({:.3})", uniformity),
            "Check GC content (40-60%), avoid strong hairpins and low complexity sequence",
            3,
        );
    }

    if cv > t.cv_critical {
        push(
            Severity::Critical,
            Category::CoverageVariation,
            format!("Very high coverage variation (CV={:.3})", cv),
            "Highly inconsistent depletion, possibly from amplification bias, secondary \
             structure or mapping artifacts. Consider redesigning the target region",
            4,
        );
    } else if cv > t.cv_warning {
        push(
            Severity::Warning,
            Category::CoverageVariation,
            format!("High coverage variation (CV={:.3})", cv),
            "Check for repetitive elements or increase sequencing depth",
            2,
        );
    }

    if zero < t.zero_coverage_low && depletion.is_some_and(|d| d >= t.incomplete_min_depletion) {
        push(
            Severity::Info,
            Category::CoverageCompleteness,
            format!(
                "Incomplete depletion (only {:.1}% bases with zero coverage)",
                zero * 100.0
            ),
            "Consider a longer reaction, more Cas9/gRNA, or overlapping gRNAs for this region",
            2,
        );
    }

    if cv > t.edge_cv && uniformity < t.edge_uniformity {
        push(
            Severity::Info,
            Category::EdgeEffects,
            "Possible edge effects in coverage".to_string(),
            "Extend the target region by 50-100bp on each side",
            2,
        );
    }

    if depletion.is_some_and(|d| d > t.excellent_depletion) && uniformity > t.excellent_uniformity
    {
        push(
            Severity::Info,
            Category::Performance,
            "Excellent performance".to_string(),
            "No changes needed",
            0,
        );
    }

    out
}

/// Advice for every target, highest priority first. Equal priorities keep target order.
pub fn recommend_all(metrics: &[DepletionMetrics], t: &DesignThresholds) -> Vec<Recommendation> {
    let mut all: Vec<Recommendation> = metrics.iter().flat_map(|m| recommend(m, t)).collect();
    all.sort_by(|a, b| b.priority.cmp(&a.priority));
    all
}

/// Number of recommendations at each severity, most severe first.
pub fn severity_counts(recommendations: &[Recommendation]) -> Vec<(Severity, usize)> {
    [Severity::Critical, Severity::Warning, Severity::Info]
        .into_iter()
        .map(|s| (s, recommendations.iter().filter(|r| r.severity == s).count()))
        .collect()
}
