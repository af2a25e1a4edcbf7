use std::io::{self, BufRead};
use std::path::Path;

use depletr_core::models::{RawInterval, Strand};
use depletr_core::utils::get_dynamic_reader;

use crate::error::{DepletrIoError, Result};

pub const DEFAULT_FEATURE_TYPE: &str = "exon";

/// Extract the value of `key` from a GTF attributes string (column 9).
///
/// Looks for the pattern `key "VALUE"` and returns VALUE.
pub fn extract_gtf_attribute(attrs: &str, key: &str) -> Option<String> {
    attrs.split(';').find_map(|field| {
        let field = field.trim();
        let rest = field.strip_prefix(key)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let value = rest.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

///
/// Parse one GTF line, keeping it only if its feature column equals `feature_type`.
///
/// GTF is 1-based inclusive and the result is 0-based half-open: start drops by one, end stays.
/// The record name is `gene_name`, falling back to `gene_id`, then `transcript_id`.
///
pub fn parse_gtf_line(
    line: &str,
    feature_type: &str,
) -> std::result::Result<Option<RawInterval>, String> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 9 {
        return Err(format!("expected 9 columns, found {}", fields.len()));
    }
    if fields[2] != feature_type {
        return Ok(None);
    }

    let start = fields[3]
        .parse::<i64>()
        .map_err(|e| format!("Parsing GTF start: {}", e))?
        - 1;
    let end = fields[4]
        .parse::<i64>()
        .map_err(|e| format!("Parsing GTF end: {}", e))?;

    let score = match fields[5] {
        "." => None,
        s => s.parse::<f64>().ok(),
    };
    let strand = Strand::from_char(fields[6].chars().next().unwrap_or('.'));

    let attrs = fields[8];
    let name = extract_gtf_attribute(attrs, "gene_name")
        .or_else(|| extract_gtf_attribute(attrs, "gene_id"))
        .or_else(|| extract_gtf_attribute(attrs, "transcript_id"))
        .unwrap_or_else(|| format!("{}:{}-{}", fields[0], start, end));

    Ok(Some(RawInterval {
        chr: fields[0].to_string(),
        start,
        end,
        name,
        strand,
        score,
    }))
}

/// Read the records of one feature type from a GTF (or GTF.gz) file.
pub fn read_gtf<P: AsRef<Path>>(path: P, feature_type: &str) -> Result<Vec<RawInterval>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path).map_err(io::Error::other)?;

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_gtf_line(&line, feature_type) {
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

    log::debug!(
        "Read {} '{}' records from {}",
        records.len(),
        feature_type,
        path.display()
    );
    Ok(records)
}
