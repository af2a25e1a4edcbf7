use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use depletr_core::models::DepletionMetrics;
use depletr_core::utils::{mean, sample_std};

use crate::errors::StatsError;
use crate::models::MetricName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Pooled-variance two-sample t-test.
    #[default]
    Student,
    /// Unequal-variance t-test with Welch-Satterthwaite degrees of freedom.
    Welch,
}

impl Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Student => write!(f, "student"),
            TestKind::Welch => write!(f, "welch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub alpha: f64,
    pub test: TestKind,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        ComparisonConfig {
            alpha: 0.05,
            test: TestKind::Student,
        }
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.alpha > 0.0 && self.alpha < 1.0 {
            Ok(())
        } else {
            Err(StatsError::InvalidAlpha(self.alpha))
        }
    }
}

/// Size, mean and sample standard deviation of one group's values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub n: usize,
    pub mean: f64,
    /// 0 below two values.
    pub std: f64,
}

impl GroupSummary {
    pub fn from_values(values: &[f64]) -> Self {
        GroupSummary {
            n: values.len(),
            mean: mean(values).unwrap_or(0.0),
            std: sample_std(values).unwrap_or(0.0),
        }
    }

    fn variance(&self) -> f64 {
        self.std * self.std
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Ok,
    /// A group had fewer than two values. Statistic, p-value and effect size are placeholders.
    InsufficientSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric: MetricName,
    pub group1: GroupSummary,
    pub group2: GroupSummary,
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    /// Cohen's d, `(mean1 - mean2) / pooled sd`.
    pub effect_size: f64,
    pub significant: bool,
    pub status: ComparisonStatus,
}

///
/// Compare two sets of targets metric by metric.
///
/// One result per metric in [`MetricName::COMPARED`], in that order. Where a target has no measured
/// depletion efficiency its zero-coverage fraction is used instead.
///
pub fn compare_groups(
    group1: &[DepletionMetrics],
    group2: &[DepletionMetrics],
    config: &ComparisonConfig,
) -> Result<Vec<ComparisonResult>, StatsError> {
    config.validate()?;
    log::info!(
        "Comparing groups of {} and {} targets ({} t-test, alpha {})",
        group1.len(),
        group2.len(),
        config.test,
        config.alpha
    );

    MetricName::COMPARED
        .iter()
        .map(|metric| {
            compare_values(
                *metric,
                &metric.column(group1),
                &metric.column(group2),
                config,
            )
        })
        .collect()
}

/// Two-sample t-test and effect size for one metric.
pub fn compare_values(
    metric: MetricName,
    values1: &[f64],
    values2: &[f64],
    config: &ComparisonConfig,
) -> Result<ComparisonResult, StatsError> {
    let g1 = GroupSummary::from_values(values1);
    let g2 = GroupSummary::from_values(values2);

    let mut result = ComparisonResult {
        metric,
        group1: g1,
        group2: g2,
        test: config.test,
        statistic: 0.0,
        p_value: 1.0,
        effect_size: 0.0,
        significant: false,
        status: ComparisonStatus::InsufficientSample,
    };
    if g1.n < 2 || g2.n < 2 {
        log::warn!(
            "Not enough values to compare {} (n = {} vs {})",
            metric,
            g1.n,
            g2.n
        );
        return Ok(result);
    }

    let (n1, n2) = (g1.n as f64, g2.n as f64);
    let pooled_var = ((n1 - 1.0) * g1.variance() + (n2 - 1.0) * g2.variance()) / (n1 + n2 - 2.0);
    let diff = g1.mean - g2.mean;

    let (se, df) = match config.test {
        TestKind::Student => ((pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0),
        TestKind::Welch => {
            let a = g1.variance() / n1;
            let b = g2.variance() / n2;
            let df = (a + b).powi(2) / (a * a / (n1 - 1.0) + b * b / (n2 - 1.0));
            ((a + b).sqrt(), df)
        }
    };

    let (statistic, p_value) = if se > 0.0 {
        let t = diff / se;
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| StatsError::Distribution(e.to_string()))?;
        (t, (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
    } else if diff == 0.0 {
        (0.0, 1.0)
    } else {
        // both groups constant but apart
        (diff.signum() * f64::INFINITY, 0.0)
    };

    let pooled_sd = pooled_var.sqrt();
    result.statistic = statistic;
    result.p_value = p_value;
    result.effect_size = if pooled_sd > 0.0 { diff / pooled_sd } else { 0.0 };
    result.significant = p_value < config.alpha;
    result.status = ComparisonStatus::Ok;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::testing::target;

    #[rstest]
    fn test_student_known_values() {
        // means 3 and 6, both sample variances 2.5, pooled se = 1
        let r = compare_values(
            MetricName::CoverageUniformity,
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[4.0, 5.0, 6.0, 7.0, 8.0],
            &ComparisonConfig::default(),
        )
        .unwrap();

        assert_eq!(r.status, ComparisonStatus::Ok);
        assert!((r.statistic - -3.0).abs() < 1e-12);
        // two-sided p for t = 3 on 8 degrees of freedom
        assert!((r.p_value - 0.01707).abs() < 1e-4);
        assert!(r.significant);
        assert!((r.effect_size - -3.0 / 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(r.group1.n, 5);
        assert!((r.group2.std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[rstest]
    fn test_welch_matches_student_for_equal_sizes_and_variances() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [4.0, 5.0, 6.0, 7.0, 8.0];
        let student = compare_values(MetricName::MeanCoverage, &a, &b, &ComparisonConfig::default())
            .unwrap();
        let welch = compare_values(
            MetricName::MeanCoverage,
            &a,
            &b,
            &ComparisonConfig {
                test: TestKind::Welch,
                ..ComparisonConfig::default()
            },
        )
        .unwrap();

        assert_eq!(welch.test, TestKind::Welch);
        assert!((student.statistic - welch.statistic).abs() < 1e-12);
        assert!((student.p_value - welch.p_value).abs() < 1e-9);
    }

    #[rstest]
    fn test_welch_unequal_variances() {
        let welch = compare_values(
            MetricName::MeanCoverage,
            &[10.0, 10.5, 9.5, 10.2],
            &[1.0, 30.0, 15.0, 2.0, 25.0, 8.0],
            &ComparisonConfig {
                test: TestKind::Welch,
                ..ComparisonConfig::default()
            },
        )
        .unwrap();
        assert!(welch.p_value > 0.05);
        assert!(!welch.significant);
    }

    #[rstest]
    #[case(&[0.5], &[0.1, 0.2, 0.3])]
    #[case(&[0.5, 0.6], &[])]
    fn test_insufficient_sample(#[case] a: &[f64], #[case] b: &[f64]) {
        let r = compare_values(
            MetricName::DepletionEfficiency,
            a,
            b,
            &ComparisonConfig::default(),
        )
        .unwrap();
        assert_eq!(r.status, ComparisonStatus::InsufficientSample);
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert_eq!(r.effect_size, 0.0);
        assert!(!r.significant);
        assert!(r.group1.mean.is_finite() && r.group2.mean.is_finite());
    }

    #[rstest]
    fn test_zero_variance() {
        let config = ComparisonConfig::default();
        let same = compare_values(MetricName::CoverageUniformity, &[1.0, 1.0], &[1.0, 1.0], &config)
            .unwrap();
        assert_eq!((same.p_value, same.significant), (1.0, false));
        assert_eq!(same.effect_size, 0.0);

        let apart = compare_values(MetricName::CoverageUniformity, &[2.0, 2.0], &[1.0, 1.0], &config)
            .unwrap();
        assert_eq!((apart.p_value, apart.significant), (0.0, true));
        assert_eq!(apart.effect_size, 0.0);
    }

    #[rstest]
    fn test_compare_groups_covers_each_metric() {
        let good = vec![
            target("sgA", Some(0.85), 0.8, 0.6, 0.3),
            target("sgB", Some(0.9), 0.75, 0.7, 0.35),
            target("sgC", Some(0.8), 0.85, 0.65, 0.25),
        ];
        let poor = vec![
            target("sgX", Some(0.2), 0.4, 0.1, 1.4),
            target("sgY", Some(0.3), 0.35, 0.05, 1.6),
            target("sgZ", Some(0.25), 0.45, 0.15, 1.2),
        ];
        let results = compare_groups(&good, &poor, &ComparisonConfig::default()).unwrap();

        let metrics: Vec<MetricName> = results.iter().map(|r| r.metric).collect();
        assert_eq!(metrics, MetricName::COMPARED.to_vec());
        assert!(results.iter().all(|r| r.significant));
        assert!(results[0].effect_size > 0.0);
        assert!(results[3].effect_size < 0.0);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    fn test_invalid_alpha(#[case] alpha: f64) {
        let config = ComparisonConfig {
            alpha,
            ..ComparisonConfig::default()
        };
        assert!(matches!(
            compare_groups(&[], &[], &config),
            Err(StatsError::InvalidAlpha(_))
        ));
    }
}
