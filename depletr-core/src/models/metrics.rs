use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing an efficiency against a tier boundary, so that values like
/// `1.0 - 2.0 / 10.0` land in the tier they are meant to.
const TIER_EPSILON: f64 = 1e-9;

///
/// Depletion efficiency of a target: `1 - mean(treated) / mean(control)`.
///
/// There is no clamping. A treated sample with more coverage than its control gives a negative
/// value. When the ratio is undefined the reason is kept instead of a NaN.
///
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", content = "value", rename_all = "snake_case"))]
pub enum DepletionEfficiency {
    Measured(f64),
    /// No control sample was supplied.
    NoControl,
    /// The control has zero mean coverage over the target.
    ControlUncovered,
}

impl DepletionEfficiency {
    pub fn from_means(treated: f64, control: Option<f64>) -> Self {
        match control {
            None => DepletionEfficiency::NoControl,
            Some(c) if c == 0.0 => DepletionEfficiency::ControlUncovered,
            Some(c) => DepletionEfficiency::Measured(1.0 - treated / c),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            DepletionEfficiency::Measured(v) => Some(*v),
            _ => None,
        }
    }

    pub fn tier(&self) -> DepletionTier {
        match self.value() {
            Some(v) => DepletionTier::from_efficiency(v),
            None => DepletionTier::Unavailable,
        }
    }
}

impl Display for DepletionEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepletionEfficiency::Measured(v) => write!(f, "{:.6}", v),
            DepletionEfficiency::NoControl => write!(f, "NA"),
            DepletionEfficiency::ControlUncovered => write!(f, "control_uncovered"),
        }
    }
}

/// Performance bucket for a measured depletion efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DepletionTier {
    Unavailable,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl DepletionTier {
    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency + TIER_EPSILON >= 0.8 {
            DepletionTier::Excellent
        } else if efficiency + TIER_EPSILON >= 0.6 {
            DepletionTier::Good
        } else if efficiency + TIER_EPSILON >= 0.3 {
            DepletionTier::Moderate
        } else {
            DepletionTier::Poor
        }
    }
}

impl Display for DepletionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DepletionTier::Unavailable => "unavailable",
            DepletionTier::Poor => "poor",
            DepletionTier::Moderate => "moderate",
            DepletionTier::Good => "good",
            DepletionTier::Excellent => "excellent",
        };
        write!(f, "{}", s)
    }
}

///
/// Scalar metrics for one target interval.
///
/// Values are produced once by the metrics calculator. Attaching a ranking score yields a new
/// record, see [`DepletionMetrics::with_composite_score`].
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepletionMetrics {
    pub grna_name: String,
    pub chromosome: String,
    pub start: u32,
    pub end: u32,
    pub mean_coverage_treated: f64,
    pub mean_coverage_control: Option<f64>,
    pub median_coverage: f64,
    pub depletion_efficiency: DepletionEfficiency,
    pub coverage_uniformity: f64,
    pub zero_coverage_fraction: f64,
    pub coefficient_of_variation: f64,
    pub composite_score: Option<f64>,
}

impl DepletionMetrics {
    pub fn with_composite_score(&self, score: f64) -> Self {
        DepletionMetrics {
            composite_score: Some(score),
            ..self.clone()
        }
    }

    pub fn tier(&self) -> DepletionTier {
        self.depletion_efficiency.tier()
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0.95, DepletionTier::Excellent)]
    #[case(1.0 - 2.0 / 10.0, DepletionTier::Excellent)]
    #[case(0.7, DepletionTier::Good)]
    #[case(0.6, DepletionTier::Good)]
    #[case(0.45, DepletionTier::Moderate)]
    #[case(0.1, DepletionTier::Poor)]
    #[case(-1.0, DepletionTier::Poor)]
    fn test_tiers(#[case] efficiency: f64, #[case] expected: DepletionTier) {
        assert_eq!(DepletionTier::from_efficiency(efficiency), expected);
    }

    #[rstest]
    fn test_efficiency_states() {
        assert_eq!(
            DepletionEfficiency::from_means(3.0, None),
            DepletionEfficiency::NoControl
        );
        assert_eq!(
            DepletionEfficiency::from_means(3.0, Some(0.0)),
            DepletionEfficiency::ControlUncovered
        );
        assert_eq!(
            DepletionEfficiency::from_means(10.0, Some(5.0)),
            DepletionEfficiency::Measured(-1.0)
        );
        assert_eq!(DepletionEfficiency::NoControl.tier(), DepletionTier::Unavailable);
    }
}
