use std::io::{self, BufRead};
use std::path::Path;

use depletr_core::models::{RawInterval, Strand};
use depletr_core::utils::get_dynamic_reader;

use crate::error::{DepletrIoError, Result};

/// Header-ish lines that carry no interval.
fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

///
/// Parse a single BED line.
///
/// Columns after the third are optional: name (defaults to `chr:start-end`), score (`.` means
/// no score) and strand (defaults to `+`). Returns `Ok(None)` for comment, `track` and `browser`
/// lines.
///
/// Coordinates are parsed as signed integers. Negative or inverted intervals are returned as-is
/// so that the interval store can reject them record by record.
///
pub fn parse_bed_line(line: &str) -> std::result::Result<Option<RawInterval>, String> {
    if is_skippable(line) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 columns, found {}", fields.len()));
    }

    let chr = fields[0].trim();
    let start = fields[1]
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid start '{}': {}", fields[1], e))?;
    let end = fields[2]
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid end '{}': {}", fields[2], e))?;

    let name = match fields.get(3).map(|s| s.trim()) {
        Some(n) if !n.is_empty() && n != "." => n.to_string(),
        _ => format!("{}:{}-{}", chr, start, end),
    };

    let score = match fields.get(4).map(|s| s.trim()) {
        None | Some(".") | Some("") => None,
        Some(s) => Some(
            s.parse::<f64>()
                .map_err(|e| format!("invalid score '{}': {}", s, e))?,
        ),
    };

    let strand = match fields.get(5).and_then(|s| s.trim().chars().next()) {
        Some(c) => Strand::from_char(c),
        None => Strand::Plus,
    };

    Ok(Some(RawInterval {
        chr: chr.to_string(),
        start,
        end,
        name,
        strand,
        score,
    }))
}

/// Read every record of a BED (or BED.gz) file.
pub fn read_bed<P: AsRef<Path>>(path: P) -> Result<Vec<RawInterval>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path).map_err(io::Error::other)?;

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_bed_line(&line) {
            Ok(Some(rec)) => records.push(rec),
            Ok(None) => continue,
            Err(reason) => {
                return Err(DepletrIoError::Parse {
                    path: path.display().to_string(),
                    line: idx + 1,
                    reason,
                });
            }
        }
    }

    log::debug!("Read {} BED records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_full_line() {
        let rec = parse_bed_line("chr1\t1000\t1500\tsgA\t7.5\t-").unwrap().unwrap();
        assert_eq!(rec.chr, "chr1");
        assert_eq!((rec.start, rec.end), (1000, 1500));
        assert_eq!(rec.name, "sgA");
        assert_eq!(rec.score, Some(7.5));
        assert_eq!(rec.strand, Strand::Minus);
    }

    #[rstest]
    fn test_defaults() {
        let rec = parse_bed_line("chr2\t10\t20").unwrap().unwrap();
        assert_eq!(rec.name, "chr2:10-20");
        assert_eq!(rec.score, None);
        assert_eq!(rec.strand, Strand::Plus);

        let rec = parse_bed_line("chr2\t10\t20\tx\t.").unwrap().unwrap();
        assert_eq!(rec.score, None);
        assert_eq!(rec.strand, Strand::Plus);
    }

    #[rstest]
    #[case("# a comment")]
    #[case("track name=targets")]
    #[case("browser position chr1:1-100")]
    #[case("")]
    fn test_skipped_lines(#[case] line: &str) {
        assert_eq!(parse_bed_line(line).unwrap(), None);
    }

    #[rstest]
    fn test_negative_coordinates_survive_parsing() {
        let rec = parse_bed_line("chr1\t-5\t10\tneg").unwrap().unwrap();
        assert_eq!(rec.start, -5);
    }

    #[rstest]
    #[case("chr1\t100")]
    #[case("chr1\tabc\t200")]
    fn test_unparseable(#[case] line: &str) {
        assert!(parse_bed_line(line).is_err());
    }

    #[rstest]
    fn test_read_bed_reports_line_number() {
        let mut file = NamedTempFile::with_suffix(".bed").unwrap();
        writeln!(file, "track name=x").unwrap();
        writeln!(file, "chr1\t1\t10\ta").unwrap();
        writeln!(file, "chr1\toops\t10\tb").unwrap();

        let err = read_bed(file.path()).unwrap_err();
        assert!(matches!(err, DepletrIoError::Parse { line: 3, .. }));
    }

    #[rstest]
    fn test_read_bed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.bed");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "#chrom\tstart\tend").unwrap();
        writeln!(file, "chr1\t1000\t1500\tsgA").unwrap();
        writeln!(file, "chr1\t2000\t2500\tsgB\t0\t+").unwrap();

        let recs = read_bed(&path).unwrap();
        assert_eq!(
            recs.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["sgA", "sgB"]
        );
    }
}
