use thiserror::Error;

use depletr_core::errors::SourceError;

#[derive(Error, Debug)]
pub enum OverlapError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Worker could not open its alignment source: {0}")]
    Worker(String),
}
