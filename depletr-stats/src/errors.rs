use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("ranking weights must sum to 1.0 (got {0})")]
    InvalidWeights(f64),

    #[error("ranking weight `{0}` is negative or not finite")]
    InvalidWeight(&'static str),

    #[error("significance level must lie in (0, 1) (got {0})")]
    InvalidAlpha(f64),

    #[error("invalid outlier rule: {0}")]
    InvalidOutlierRule(String),

    #[error("failed to build t distribution: {0}")]
    Distribution(String),
}
