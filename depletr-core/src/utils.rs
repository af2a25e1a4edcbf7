use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use num_traits::ToPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    BED,
    GTF,
    BAM,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(FileType::BED),
            "gtf" | "gff" | "gff3" => Ok(FileType::GTF),
            "bam" => Ok(FileType::BAM),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

/// Work out the file type from the extension, looking through a trailing `.gz`.
pub fn get_file_info(path: &Path) -> FileInfo {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let base = if is_gzipped {
        PathBuf::from(path.file_stem().unwrap_or_default())
    } else {
        path.to_path_buf()
    };

    let file_type = base
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| FileType::from_str(e).ok())
        .unwrap_or(FileType::UNKNOWN);

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean<T: ToPrimitive + Copy>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().filter_map(|v| v.to_f64()).sum();
    Some(sum / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std<T: ToPrimitive + Copy>(values: &[T]) -> Option<f64> {
    let m = mean(values)?;
    let var = values
        .iter()
        .filter_map(|v| v.to_f64())
        .map(|v| (v - m).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    Some(var.sqrt())
}

/// Sample standard deviation (divides by `n - 1`). `None` below two values.
pub fn sample_std<T: ToPrimitive + Copy>(values: &[T]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values
        .iter()
        .filter_map(|v| v.to_f64())
        .map(|v| (v - m).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Percentile `q` in `[0, 1]` with linear interpolation between closest ranks.
pub fn percentile<T: ToPrimitive + Copy>(values: &[T], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().filter_map(|v| v.to_f64()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q = q.clamp(0.0, 1.0);
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median<T: ToPrimitive + Copy>(values: &[T]) -> Option<f64> {
    percentile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    #[case("targets.bed", FileType::BED, false)]
    #[case("targets.bed.gz", FileType::BED, true)]
    #[case("genes.gtf.gz", FileType::GTF, true)]
    #[case("reads.bam", FileType::BAM, false)]
    #[case("notes.txt", FileType::UNKNOWN, false)]
    fn test_file_info(#[case] name: &str, #[case] file_type: FileType, #[case] gz: bool) {
        let info = get_file_info(Path::new(name));
        assert_eq!(info.file_type, file_type);
        assert_eq!(info.is_gzipped, gz);
    }

    #[rstest]
    fn test_dynamic_reader_gz() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bed.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"chr1\t1\t2\n").unwrap();
        enc.finish().unwrap();

        let lines: Vec<String> = get_dynamic_reader(&path)
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["chr1\t1\t2".to_string()]);
    }

    #[rstest]
    fn test_numeric_helpers() {
        let depths: [u32; 4] = [0, 2, 4, 6];
        assert_eq!(mean(&depths), Some(3.0));
        assert!((population_std(&depths).unwrap() - 5.0f64.sqrt()).abs() < 1e-12);
        assert!((sample_std(&depths).unwrap() - (20.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(median(&depths), Some(3.0));
        assert_eq!(percentile(&depths, 0.25), Some(1.5));
        assert_eq!(mean::<u32>(&[]), None);
        assert_eq!(sample_std(&[1.0f64]), None);
    }
}
