use thiserror::Error;

use depletr_core::errors::SourceError;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Coverage profile for {0} has no bases")]
    EmptyInterval(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Worker could not open its alignment source: {0}")]
    Worker(String),

    #[error("Could not build thread pool: {0}")]
    ThreadPool(String),
}
