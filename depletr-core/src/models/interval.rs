use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::IntervalError;

/// Strand of an annotation record. BED files without a strand column default to `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    #[default]
    Plus,
    Minus,
    Unstranded,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unstranded,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unstranded => '.',
        }
    }
}

///
/// An annotation record as it comes out of a parser, before coordinate validation.
///
/// Coordinates are signed so that negative values in the text survive long enough to be
/// rejected with a proper [`IntervalError`].
///
#[derive(Debug, Clone, PartialEq)]
pub struct RawInterval {
    pub chr: String,
    pub start: i64,
    pub end: i64,
    pub name: String,
    pub strand: Strand,
    pub score: Option<f64>,
}

impl RawInterval {
    pub fn new(chr: &str, start: i64, end: i64, name: &str) -> Self {
        RawInterval {
            chr: chr.to_string(),
            start,
            end,
            name: name.to_string(),
            strand: Strand::default(),
            score: None,
        }
    }
}

///
/// Genomic interval, 0-based inclusive start and exclusive end.
///
/// Invariant: `start < end`. Values are only created through [`GenomicInterval::new`] or
/// `TryFrom<RawInterval>`, both of which enforce it.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GenomicInterval {
    chr: String,
    start: u32,
    end: u32,
    name: String,
    strand: Strand,
    score: Option<f64>,
}

impl GenomicInterval {
    pub fn new(chr: &str, start: u32, end: u32, name: &str) -> Result<Self, IntervalError> {
        Self::try_from(RawInterval::new(chr, start as i64, end as i64, name))
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.score = score;
        self
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Number of bases covered by the interval. Never zero.
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// Half-open overlap test against `[start, end)`.
    #[inline]
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && self.end > start
    }

    /// Intersection of this interval with `[start, end)`, if any.
    #[inline]
    pub fn intersect(&self, start: u32, end: u32) -> Option<(u32, u32)> {
        let lo = self.start.max(start);
        let hi = self.end.min(end);
        (lo < hi).then_some((lo, hi))
    }
}

impl TryFrom<RawInterval> for GenomicInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        if raw.chr.is_empty() {
            return Err(IntervalError::MissingChromosome);
        }
        if raw.start < 0 || raw.end < 0 {
            return Err(IntervalError::NegativeCoordinate {
                chr: raw.chr,
                start: raw.start,
                end: raw.end,
                name: raw.name,
            });
        }
        if raw.start >= raw.end {
            return Err(IntervalError::EmptyOrInverted {
                chr: raw.chr,
                start: raw.start,
                end: raw.end,
                name: raw.name,
            });
        }
        let (Ok(start), Ok(end)) = (u32::try_from(raw.start), u32::try_from(raw.end)) else {
            return Err(IntervalError::CoordinateOverflow {
                chr: raw.chr,
                start: raw.start,
                end: raw.end,
                name: raw.name,
            });
        };

        Ok(GenomicInterval {
            chr: raw.chr,
            start,
            end,
            name: raw.name,
            strand: raw.strand,
            score: raw.score,
        })
    }
}

impl Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{}-{})", self.name, self.chr, self.start, self.end)
    }
}
