use crate::models::AlignmentRecord;

///
/// Decides which reads count towards coverage and overlap totals.
///
/// Unmapped, secondary and supplementary alignments are always excluded. The MAPQ floor and the
/// proper-pair requirement are configurable.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadFilter {
    pub min_mapq: u8,
    pub require_proper_pair: bool,
}

impl ReadFilter {
    pub fn new(min_mapq: u8, require_proper_pair: bool) -> Self {
        ReadFilter {
            min_mapq,
            require_proper_pair,
        }
    }

    #[inline]
    pub fn passes(&self, record: &AlignmentRecord) -> bool {
        let flags = record.flags;
        if flags.is_unmapped() || flags.is_secondary() || flags.is_supplementary() {
            return false;
        }
        if record.mapq < self.min_mapq {
            return false;
        }
        if self.require_proper_pair && !flags.is_proper_pair() {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use rstest::*;

    use crate::models::ReadFlags;

    #[fixture]
    fn chr() -> Arc<str> {
        Arc::from("chr1")
    }

    #[rstest]
    #[case(ReadFlags::UNMAPPED)]
    #[case(ReadFlags::SECONDARY)]
    #[case(ReadFlags::SUPPLEMENTARY)]
    fn test_always_excluded(chr: Arc<str>, #[case] flag: u16) {
        let rec = AlignmentRecord::mapped(&chr, 0, 10).with_flags(flag);
        assert!(!ReadFilter::default().passes(&rec));
    }

    #[rstest]
    fn test_mapq_floor(chr: Arc<str>) {
        let filter = ReadFilter::new(20, false);
        assert!(!filter.passes(&AlignmentRecord::mapped(&chr, 0, 10).with_mapq(19)));
        assert!(filter.passes(&AlignmentRecord::mapped(&chr, 0, 10).with_mapq(20)));
    }

    #[rstest]
    fn test_proper_pair(chr: Arc<str>) {
        let filter = ReadFilter::new(0, true);
        let single = AlignmentRecord::mapped(&chr, 0, 10);
        let paired = AlignmentRecord::mapped(&chr, 0, 10)
            .with_flags(ReadFlags::PAIRED | ReadFlags::PROPER_PAIR);
        assert!(!filter.passes(&single));
        assert!(filter.passes(&paired));
        assert!(ReadFilter::default().passes(&single));
    }

    #[rstest]
    fn test_duplicates_are_kept(chr: Arc<str>) {
        let rec = AlignmentRecord::mapped(&chr, 0, 10).with_flags(ReadFlags::DUPLICATE);
        assert!(ReadFilter::default().passes(&rec));
    }
}
