use std::sync::Arc;

/// SAM flag word of an aligned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadFlags(u16);

impl ReadFlags {
    pub const PAIRED: u16 = 0x1;
    pub const PROPER_PAIR: u16 = 0x2;
    pub const UNMAPPED: u16 = 0x4;
    pub const MATE_UNMAPPED: u16 = 0x8;
    pub const REVERSE: u16 = 0x10;
    pub const FIRST_SEGMENT: u16 = 0x40;
    pub const SECONDARY: u16 = 0x100;
    pub const QC_FAIL: u16 = 0x200;
    pub const DUPLICATE: u16 = 0x400;
    pub const SUPPLEMENTARY: u16 = 0x800;

    pub fn new(bits: u16) -> Self {
        ReadFlags(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    #[inline]
    fn has(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    pub fn is_unmapped(&self) -> bool {
        self.has(Self::UNMAPPED)
    }

    pub fn is_secondary(&self) -> bool {
        self.has(Self::SECONDARY)
    }

    pub fn is_supplementary(&self) -> bool {
        self.has(Self::SUPPLEMENTARY)
    }

    pub fn is_proper_pair(&self) -> bool {
        self.has(Self::PROPER_PAIR)
    }

    pub fn is_paired(&self) -> bool {
        self.has(Self::PAIRED)
    }

    pub fn is_duplicate(&self) -> bool {
        self.has(Self::DUPLICATE)
    }

    pub fn is_reverse(&self) -> bool {
        self.has(Self::REVERSE)
    }

    pub fn is_first_segment(&self) -> bool {
        self.has(Self::FIRST_SEGMENT)
    }
}

/// Placement of the other segment of a paired read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MateInfo {
    pub chr: Arc<str>,
    pub start: u32,
}

///
/// One aligned read as seen by the core: where it sits on the reference, and the bits needed
/// to decide whether it should be counted.
///
/// `start`/`end` are the 0-based half-open reference span of the alignment. Chromosome names
/// are shared handles, so cloning a record never copies the name.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    pub chr: Arc<str>,
    pub start: u32,
    pub end: u32,
    pub mapq: u8,
    pub flags: ReadFlags,
    pub mate: Option<MateInfo>,
}

impl AlignmentRecord {
    /// A mapped, primary, unpaired read with MAPQ 60. Mostly useful for tests and in-memory sources.
    pub fn mapped(chr: &Arc<str>, start: u32, end: u32) -> Self {
        AlignmentRecord {
            chr: Arc::clone(chr),
            start,
            end,
            mapq: 60,
            flags: ReadFlags::default(),
            mate: None,
        }
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = ReadFlags::new(flags);
        self
    }

    pub fn with_mate(mut self, chr: &Arc<str>, start: u32) -> Self {
        self.mate = Some(MateInfo {
            chr: Arc::clone(chr),
            start,
        });
        self
    }

    /// Aligned span length on the reference.
    pub fn span(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && self.end > start
    }
}
