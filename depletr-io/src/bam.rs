//! Indexed BAM access backed by `noodles`.
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use noodles::bam;
use noodles::bgzf;
use noodles::core::{Position, Region};
use noodles::sam;
use noodles::sam::alignment::Record as SamRecord;

use depletr_core::errors::SourceError;
use depletr_core::models::{AlignmentRecord, MateInfo, ReadFlags};
use depletr_core::source::{AlignmentSource, AlignmentSourceFactory, Records};

/// Name used for reads without a reference sequence.
const UNPLACED: &str = "*";

/// Index files that `noodles` picks up next to `path`.
fn index_candidates(path: &Path) -> [PathBuf; 2] {
    let with_ext = |ext: &str| {
        let mut s: OsString = path.as_os_str().to_owned();
        s.push(ext);
        PathBuf::from(s)
    };
    [with_ext(".bai"), with_ext(".csi")]
}

pub fn has_index(path: &Path) -> bool {
    index_candidates(path).iter().any(|p| p.exists())
}

fn open_error(path: &Path, e: impl ToString) -> SourceError {
    SourceError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn reference_names(header: &sam::Header) -> Vec<Arc<str>> {
    header
        .reference_sequences()
        .keys()
        .map(|name| Arc::from(name.to_string()))
        .collect()
}

fn lookup(
    names: &[Arc<str>],
    id: Option<io::Result<usize>>,
) -> Result<Option<Arc<str>>, SourceError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let id = id?;
    match names.get(id) {
        Some(name) => Ok(Some(Arc::clone(name))),
        None => Err(SourceError::Record(format!(
            "reference id {} is not in the header",
            id
        ))),
    }
}

/// Convert a raw BAM record into the core representation.
fn convert(
    record: &bam::Record,
    names: &[Arc<str>],
    unplaced: &Arc<str>,
) -> Result<AlignmentRecord, SourceError> {
    let flags = ReadFlags::new(record.flags().bits());

    let chr = lookup(names, record.reference_sequence_id())?
        .unwrap_or_else(|| Arc::clone(unplaced));

    let start = match record.alignment_start() {
        Some(pos) => (pos?.get() - 1) as u32,
        None => 0,
    };
    let span = match record.alignment_span() {
        Some(span) => span? as u32,
        None => 0,
    };

    let mate = match (
        lookup(names, record.mate_reference_sequence_id())?,
        record.mate_alignment_start(),
    ) {
        (Some(chr), Some(pos)) => Some(MateInfo {
            chr,
            start: (pos?.get() - 1) as u32,
        }),
        _ => None,
    };

    // 255 (unavailable) is reported as None by noodles
    let mapq = record.mapping_quality().map(|q| q.get()).unwrap_or(255);

    Ok(AlignmentRecord {
        chr,
        start,
        end: start.saturating_add(span),
        mapq,
        flags,
        mate,
    })
}

///
/// One open handle on a coordinate-sorted, indexed BAM file.
///
/// Region queries go through the index. Whole-file iteration opens a separate sequential
/// reader so it is not affected by earlier queries. The handle is closed when the value drops.
///
pub struct BamAlignmentSource {
    path: PathBuf,
    reader: bam::io::IndexedReader<bgzf::Reader<File>>,
    header: sam::Header,
    chromosomes: Vec<Arc<str>>,
    unplaced: Arc<str>,
}

impl BamAlignmentSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(open_error(path, "no such file"));
        }
        if !has_index(path) {
            return Err(SourceError::MissingIndex(path.display().to_string()));
        }

        let mut reader = bam::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .map_err(|e| open_error(path, e))?;
        let header = reader.read_header().map_err(|e| open_error(path, e))?;
        let chromosomes = reference_names(&header);

        log::debug!(
            "Opened {} ({} reference sequences)",
            path.display(),
            chromosomes.len()
        );

        Ok(BamAlignmentSource {
            path: path.to_path_buf(),
            reader,
            header,
            chromosomes,
            unplaced: Arc::from(UNPLACED),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn query(&mut self, region: Region) -> Result<Records<'_>, SourceError> {
        let BamAlignmentSource {
            reader,
            header,
            chromosomes,
            unplaced,
            ..
        } = self;

        let query = reader.query(header, &region)?;
        let names: &[Arc<str>] = chromosomes;
        let unplaced: &Arc<str> = unplaced;
        Ok(Box::new(query.map(move |res| {
            let record = res?;
            convert(&record, names, unplaced)
        })))
    }
}

impl AlignmentSource for BamAlignmentSource {
    fn chromosomes(&self) -> &[Arc<str>] {
        &self.chromosomes
    }

    fn fetch(&mut self, chr: &str, start: u32, end: u32) -> Result<Records<'_>, SourceError> {
        if !self.contains_chromosome(chr) || start >= end {
            return Ok(Box::new(std::iter::empty()));
        }
        let (Some(lo), Some(hi)) = (
            Position::new(start as usize + 1),
            Position::new(end as usize),
        ) else {
            return Ok(Box::new(std::iter::empty()));
        };
        self.query(Region::new(chr, lo..=hi))
    }

    fn fetch_chromosome(&mut self, chr: &str) -> Result<Records<'_>, SourceError> {
        if !self.contains_chromosome(chr) {
            return Ok(Box::new(std::iter::empty()));
        }
        self.query(Region::new(chr, ..))
    }

    fn records(&mut self) -> Result<Records<'_>, SourceError> {
        let stream = BamRecordStream::open(&self.path, self.chromosomes.clone())?;
        Ok(Box::new(stream))
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for BamAlignmentSource {
    fn drop(&mut self) {
        log::debug!("Closing {}", self.path.display());
    }
}

/// Sequential pass over every record of a BAM file, in file order.
pub struct BamRecordStream {
    reader: bam::io::Reader<bgzf::Reader<File>>,
    record: bam::Record,
    chromosomes: Vec<Arc<str>>,
    unplaced: Arc<str>,
    done: bool,
}

impl BamRecordStream {
    /// Stream a BAM file from start to end. No index is needed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut reader = bam::io::reader::Builder::default().build_from_reader(file);
        let header = reader.read_header().map_err(|e| open_error(path, e))?;
        log::debug!("Streaming {}", path.display());

        Ok(BamRecordStream {
            reader,
            record: bam::Record::default(),
            chromosomes: reference_names(&header),
            unplaced: Arc::from(UNPLACED),
            done: false,
        })
    }

    fn open(path: &Path, chromosomes: Vec<Arc<str>>) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut reader = bam::io::reader::Builder::default().build_from_reader(file);
        reader.read_header().map_err(|e| open_error(path, e))?;

        Ok(BamRecordStream {
            reader,
            record: bam::Record::default(),
            chromosomes,
            unplaced: Arc::from(UNPLACED),
            done: false,
        })
    }
}

impl Iterator for BamRecordStream {
    type Item = Result<AlignmentRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.record) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(convert(&self.record, &self.chromosomes, &self.unplaced)),
            Err(e) => {
                self.done = true;
                Some(Err(SourceError::Io(e)))
            }
        }
    }
}

/// Opens a fresh [`BamAlignmentSource`] for every caller, e.g. one per rayon worker.
#[derive(Debug, Clone)]
pub struct BamSourceFactory {
    path: PathBuf,
}

impl BamSourceFactory {
    /// Check that the file and its index exist without keeping a handle open.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(open_error(path, "no such file"));
        }
        if !has_index(path) {
            return Err(SourceError::MissingIndex(path.display().to_string()));
        }
        Ok(BamSourceFactory {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlignmentSourceFactory for BamSourceFactory {
    type Source = BamAlignmentSource;

    fn open(&self) -> Result<Self::Source, SourceError> {
        BamAlignmentSource::open(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    use noodles::bam::bai;
    use noodles::sam::alignment::io::Write as _;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::{TempDir, tempdir};

    const SAM: &str = "\
@HD\tVN:1.6\tSO:coordinate
@SQ\tSN:chr1\tLN:10000
@SQ\tSN:chr2\tLN:5000
r1\t99\tchr1\t1001\t60\t50M\t=\t1101\t150\t*\t*
r2\t0\tchr1\t2001\t255\t10M5D10M\t*\t0\t0\t*\t*
r3\t256\tchr2\t1\t30\t20M\t*\t0\t0\t*\t*
r4\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*
";

    /// Coordinate-sorted BAM and its BAI written from [`SAM`].
    #[fixture]
    fn indexed_bam() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reads.bam");

        let mut reader = sam::io::Reader::new(SAM.as_bytes());
        let header = reader.read_header().unwrap();
        let mut writer = bam::io::Writer::new(File::create(&path).unwrap());
        writer.write_header(&header).unwrap();
        for record in reader.records() {
            writer
                .write_alignment_record(&header, &record.unwrap())
                .unwrap();
        }
        writer.try_finish().unwrap();

        let index = bam::fs::index(&path).unwrap();
        bai::fs::write(dir.path().join("reads.bam.bai"), &index).unwrap();
        (dir, path)
    }

    fn collect(records: Records<'_>) -> Vec<AlignmentRecord> {
        records.collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[rstest]
    fn test_records_are_half_open(indexed_bam: (TempDir, PathBuf)) {
        let (_dir, path) = indexed_bam;
        let mut source = BamAlignmentSource::open(&path).unwrap();
        assert_eq!(
            source.chromosomes().to_vec(),
            vec![Arc::<str>::from("chr1"), Arc::<str>::from("chr2")]
        );

        let records = collect(source.records().unwrap());
        assert_eq!(records.len(), 4);

        let r1 = &records[0];
        assert_eq!((&*r1.chr, r1.start, r1.end, r1.mapq), ("chr1", 1000, 1050, 60));
        assert!(r1.flags.is_paired() && r1.flags.is_proper_pair());
        assert_eq!(
            r1.mate,
            Some(MateInfo {
                chr: Arc::from("chr1"),
                start: 1100
            })
        );

        // deletions count towards the reference span
        let r2 = &records[1];
        assert_eq!((r2.start, r2.end), (2000, 2025));
        assert_eq!(r2.mapq, 255);
        assert!(r2.mate.is_none());

        assert!(records[2].flags.is_secondary());
        assert_eq!(&*records[3].chr, UNPLACED);
        assert!(records[3].flags.is_unmapped());
    }

    #[rstest]
    #[case(1049, 1100, true)]
    #[case(1050, 1100, false)]
    #[case(900, 1001, true)]
    #[case(900, 1000, false)]
    fn test_fetch_bounds(
        indexed_bam: (TempDir, PathBuf),
        #[case] start: u32,
        #[case] end: u32,
        #[case] expected: bool,
    ) {
        let (_dir, path) = indexed_bam;
        let mut source = BamAlignmentSource::open(&path).unwrap();
        let hits = collect(source.fetch("chr1", start, end).unwrap());
        assert_eq!(hits.iter().any(|r| r.start == 1000), expected);
    }

    #[rstest]
    fn test_fetch_unknown_or_empty_region(indexed_bam: (TempDir, PathBuf)) {
        let (_dir, path) = indexed_bam;
        let mut source = BamAlignmentSource::open(&path).unwrap();
        assert!(collect(source.fetch("chrX", 0, 100).unwrap()).is_empty());
        assert!(collect(source.fetch("chr1", 1020, 1020).unwrap()).is_empty());

        let chr2 = collect(source.fetch_chromosome("chr2").unwrap());
        assert_eq!(chr2.len(), 1);
        assert_eq!((chr2[0].start, chr2[0].end), (0, 20));
    }

    #[rstest]
    fn test_stream_matches_records(indexed_bam: (TempDir, PathBuf)) {
        let (_dir, path) = indexed_bam;
        let mut source = BamAlignmentSource::open(&path).unwrap();
        let from_source = collect(source.records().unwrap());
        let streamed = BamRecordStream::from_path(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(streamed, from_source);
    }

    #[rstest]
    fn test_missing_index_is_reported() {
        let dir = tempdir().unwrap();
        let bam = dir.path().join("reads.bam");
        File::create(&bam).unwrap();

        let err = BamSourceFactory::new(&bam).unwrap_err();
        assert!(matches!(err, SourceError::MissingIndex(_)));

        let err = BamAlignmentSource::open(&bam).err().unwrap();
        assert!(matches!(err, SourceError::MissingIndex(_)));
    }

    #[rstest]
    fn test_missing_file() {
        let err = BamSourceFactory::new("/definitely/not/here.bam").unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[rstest]
    fn test_stream_needs_readable_header() {
        let dir = tempdir().unwrap();
        let bam = dir.path().join("empty.bam");
        File::create(&bam).unwrap();

        assert!(matches!(
            BamRecordStream::from_path(&bam).err().unwrap(),
            SourceError::Open { .. }
        ));
        assert!(matches!(
            BamRecordStream::from_path(dir.path().join("gone.bam")).err().unwrap(),
            SourceError::Open { .. }
        ));
    }

    #[rstest]
    #[case(".bai")]
    #[case(".csi")]
    fn test_index_detection(#[case] ext: &str) {
        let dir = tempdir().unwrap();
        let bam = dir.path().join("reads.bam");
        File::create(&bam).unwrap();
        assert!(!has_index(&bam));

        File::create(dir.path().join(format!("reads.bam{}", ext))).unwrap();
        assert!(has_index(&bam));
        assert!(BamSourceFactory::new(&bam).is_ok());
    }
}
