use serde::{Deserialize, Serialize};

use depletr_core::models::DepletionMetrics;
use depletr_core::utils::mean;

use crate::models::MetricName;

/// Symmetric Pearson correlation matrix. `values[i][j]` pairs `metrics[i]` with `metrics[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<MetricName>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: MetricName, b: MetricName) -> Option<f64> {
        let i = self.metrics.iter().position(|&m| m == a)?;
        let j = self.metrics.iter().position(|&m| m == b)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation of two equally long columns. 0 when either has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (Some(mx), Some(my)) = (mean(x), mean(y)) else {
        return 0.0;
    };

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Correlations between the [`MetricName::CORRELATED`] columns.
pub fn correlation_matrix(metrics: &[DepletionMetrics]) -> CorrelationMatrix {
    let names = MetricName::CORRELATED.to_vec();
    let columns: Vec<Vec<f64>> = names.iter().map(|m| m.column(metrics)).collect();

    let values = (0..names.len())
        .map(|i| {
            (0..names.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        metrics: names,
        values,
    }
}
