use thiserror::Error;

/// A single annotation record that cannot become a [`GenomicInterval`](crate::models::GenomicInterval).
///
/// These are record-scoped: the [`IntervalStore`](crate::models::IntervalStore) rejects the
/// offending record and keeps loading the rest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntervalError {
    #[error("Malformed interval {name} ({chr}:{start}-{end}): start must be smaller than end")]
    EmptyOrInverted {
        chr: String,
        start: i64,
        end: i64,
        name: String,
    },

    #[error("Malformed interval {name} ({chr}:{start}-{end}): coordinates must not be negative")]
    NegativeCoordinate {
        chr: String,
        start: i64,
        end: i64,
        name: String,
    },

    #[error("Malformed interval {name} ({chr}:{start}-{end}): coordinate exceeds u32 range")]
    CoordinateOverflow {
        chr: String,
        start: i64,
        end: i64,
        name: String,
    },

    #[error("Malformed interval: chromosome name is empty")]
    MissingChromosome,
}

/// Errors raised by an [`AlignmentSource`](crate::source::AlignmentSource).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Alignment file has no index (.bai/.csi) next to it: {0}")]
    MissingIndex(String),

    #[error("Can't open alignment file {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Error reading alignment record: {0}")]
    Record(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
