//! Skip-row and dialect detection for delimiter-separated text.
//!
//! `detect` is total: any byte sequence, including empty or binary input,
//! yields a complete [`Detection`]. Failures at any stage fall through to the
//! next tier and ultimately to the hard defaults.

use std::io::{self, Read};

use crate::source::ImportSource;

use super::dialect::sniff_dialect;

/// Lines sampled from the head of the source, independent of file size.
pub const SCAN_WINDOW_LINES: usize = 51;
/// Bytes sampled for dialect sniffing after skipping leading rows.
pub const SNIFF_WINDOW_BYTES: usize = 64 * 1024;

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_QUOTE: u8 = b'"';

/// Lowercased substrings that mark a field as header-like.
const HEADER_KEYWORDS: [&str; 14] = [
    "id", "name", "date", "time", "user", "text", "count", "number", "type", "value", "key",
    "code", "label", "total",
];

/// Prefixes of prose or URLs; fields starting with these are not header-like.
const SENTENCE_PREFIXES: [&str; 6] = ["http", "www", "from ", "if you", "the ", "this "];

/// Inferred structure of a delimited text source. Always valid; `degraded`
/// is set when sniffing fell back to the hard defaults and the caller may
/// want to let the user correct it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Detection {
    pub skip_rows: usize,
    pub delimiter: u8,
    pub quote: u8,
    pub degraded: bool,
}

impl Detection {
    #[must_use]
    pub const fn fallback() -> Self {
        Self { skip_rows: 0, delimiter: DEFAULT_DELIMITER, quote: DEFAULT_QUOTE, degraded: true }
    }
}

/// Infer skip-row count and dialect for `source`. Never fails: I/O or decode
/// problems degrade to a sniff of the raw sample, then to the hard defaults.
#[must_use]
pub fn detect(source: &ImportSource) -> Detection {
    match try_detect(source) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("structure detection failed for {}: {e}", source.display());
            match source.read_prefix(SNIFF_WINDOW_BYTES) {
                Ok(raw) => match sniff_dialect(&String::from_utf8_lossy(&raw)) {
                    Some((delimiter, quote)) => {
                        Detection { skip_rows: 0, delimiter, quote, degraded: true }
                    }
                    None => Detection::fallback(),
                },
                Err(_) => Detection::fallback(),
            }
        }
    }
}

fn try_detect(source: &ImportSource) -> io::Result<Detection> {
    let (lines, scanned) = scan_window(source)?;
    let mut skip_rows = 0;
    if lines.len() >= 2 {
        let records: Vec<(usize, Vec<String>)> =
            lines.iter().map(|(idx, line)| (*idx, parse_line(line))).collect();
        skip_rows = records
            .iter()
            .find(|(_, fields)| looks_like_header(fields))
            .map(|(idx, _)| *idx)
            .or_else(|| modal_field_count_row(&records))
            .unwrap_or(0);
        // Never point past the sampled window.
        if skip_rows >= scanned {
            skip_rows = 0;
        }
    }
    let sample = sample_after_skip(source, skip_rows)?;
    let sniffed = sniff_dialect(&sample);
    let (delimiter, quote) = sniffed.unwrap_or((DEFAULT_DELIMITER, DEFAULT_QUOTE));
    Ok(Detection { skip_rows, delimiter, quote, degraded: sniffed.is_none() })
}

/// Read up to [`SCAN_WINDOW_LINES`] lines, decoding lossily. Returns the
/// non-empty trimmed lines with their original indices, plus the raw line
/// count actually scanned (empty lines do not shift indices).
fn scan_window(source: &ImportSource) -> io::Result<(Vec<(usize, String)>, usize)> {
    let mut reader = source.open()?;
    let mut raw = Vec::new();
    let mut lines = Vec::new();
    let mut scanned = 0;
    while scanned < SCAN_WINDOW_LINES {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&raw);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push((scanned, trimmed.to_string()));
        }
        scanned += 1;
    }
    Ok((lines, scanned))
}

/// Parse one line as a single comma-delimited record. A line the parser
/// rejects degrades to a one-field record instead of aborting the scan.
fn parse_line(line: &str) -> Vec<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match rdr.records().next() {
        Some(Ok(rec)) => rec.iter().map(ToString::to_string).collect(),
        _ => vec![line.to_string()],
    }
}

fn looks_like_header(fields: &[String]) -> bool {
    if fields.len() < 2 {
        return false;
    }
    let non_empty: Vec<String> = fields
        .iter()
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    // Mostly-empty rows are preamble or stray-delimiter footers.
    if non_empty.len() * 2 < fields.len() {
        return false;
    }
    let mut score = 0;
    for field in &non_empty {
        if HEADER_KEYWORDS.iter().any(|k| field.contains(k)) {
            score += 1;
        }
        if (3..=30).contains(&field.chars().count())
            && !SENTENCE_PREFIXES.iter().any(|p| field.starts_with(p))
        {
            score += 1;
        }
    }
    score * 2 >= non_empty.len()
}

/// Fallback when no record looks like a header: the first record whose field
/// count equals the most frequent field count. Ties resolve to the count seen
/// earliest, keeping the result deterministic.
fn modal_field_count_row(records: &[(usize, Vec<String>)]) -> Option<usize> {
    let mut freq: Vec<(usize, usize)> = Vec::new();
    for (_, fields) in records {
        match freq.iter_mut().find(|(count, _)| *count == fields.len()) {
            Some((_, n)) => *n += 1,
            None => freq.push((fields.len(), 1)),
        }
    }
    let mut modal: Option<usize> = None;
    let mut modal_n = 0;
    for &(count, n) in &freq {
        if n > modal_n {
            modal = Some(count);
            modal_n = n;
        }
    }
    let modal = modal?;
    records.iter().find(|(_, fields)| fields.len() == modal).map(|(idx, _)| *idx)
}

/// Skip `skip_rows` lines, then read up to [`SNIFF_WINDOW_BYTES`] as the
/// dialect sniffing sample.
fn sample_after_skip(source: &ImportSource, skip_rows: usize) -> io::Result<String> {
    let mut reader = source.open()?;
    let mut raw = Vec::new();
    for _ in 0..skip_rows {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
    }
    let mut buf = Vec::with_capacity(8 * 1024);
    reader.take(SNIFF_WINDOW_BYTES as u64).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_bytes(data: &[u8]) -> Detection {
        detect(&ImportSource::from_bytes(data.to_vec()))
    }

    #[test]
    fn clean_header_detects_zero_skip() {
        let d = detect_bytes(b"id,name,tweet_text,created_at\n1,alice,hello,2023-01-01\n");
        assert_eq!(d.skip_rows, 0);
        assert_eq!(d.delimiter, b',');
        assert_eq!(d.quote, b'"');
        assert!(!d.degraded);
    }

    #[test]
    fn preamble_lines_are_skipped() {
        let data = b"Export produced by the archive tool\nPlease see the notes below\nid,name,tweet_text,created_at\n1,alice,hello,2023-01-01\n2,bob,hi,2023-01-02\n";
        let d = detect_bytes(data);
        assert_eq!(d.skip_rows, 2);
        assert_eq!(d.delimiter, b',');
    }

    #[test]
    fn empty_preamble_lines_do_not_shift_indices() {
        let data = b"notes ahead\n\n\nid,name,date\n1,a,2020-01-01\n";
        let d = detect_bytes(data);
        assert_eq!(d.skip_rows, 3);
    }

    #[test]
    fn alternate_delimiter_is_sniffed() {
        let d = detect_bytes(b"id;name;date\n1;a;2020-01-01\n");
        assert_eq!(d.delimiter, b';');
        assert_eq!(d.skip_rows, 0);
    }

    #[test]
    fn tab_delimiter_is_sniffed() {
        let d = detect_bytes(b"id\tname\tdate\n1\ta\t2020-01-01\n");
        assert_eq!(d.delimiter, b'\t');
    }

    #[test]
    fn single_line_input_defaults_skip_to_zero() {
        let d = detect_bytes(b"id,name,date\n");
        assert_eq!(d.skip_rows, 0);
        assert_eq!(d.delimiter, b',');
    }

    #[test]
    fn empty_input_falls_back_to_defaults() {
        let d = detect_bytes(b"");
        assert_eq!(d.skip_rows, 0);
        assert_eq!(d.delimiter, DEFAULT_DELIMITER);
        assert_eq!(d.quote, DEFAULT_QUOTE);
        assert!(d.degraded);
    }

    #[test]
    fn binary_input_is_total() {
        let data: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        let d = detect_bytes(&data);
        assert!(d.skip_rows < SCAN_WINDOW_LINES);
    }

    #[test]
    fn non_delimited_prose_degrades() {
        let d = detect_bytes(b"just some words\nmore words here\n");
        assert_eq!(d.delimiter, DEFAULT_DELIMITER);
        assert!(d.degraded);
    }

    #[test]
    fn frequency_fallback_picks_modal_field_count() {
        // No record passes the header predicate: every field is either prose
        // or too short. The two-field shape is the most frequent.
        let data = b"x\ny,z\nw,v\nu,t\n";
        let d = detect_bytes(data);
        assert_eq!(d.skip_rows, 1);
    }

    #[test]
    fn header_at_last_window_line_is_found() {
        // Header on the final line of the scan window (index 50 of 51).
        let mut data = String::new();
        for i in 0..SCAN_WINDOW_LINES - 1 {
            data.push_str(&format!("note {i}\n"));
        }
        data.push_str("id,name,date\n");
        let d = detect_bytes(data.as_bytes());
        assert_eq!(d.skip_rows, SCAN_WINDOW_LINES - 1);
    }

    #[test]
    fn header_beyond_window_is_not_chased() {
        // Header past the scan window cannot be seen; the fallback keeps
        // skip_rows inside the sampled range.
        let mut data = String::new();
        for i in 0..SCAN_WINDOW_LINES + 10 {
            data.push_str(&format!("note {i}\n"));
        }
        data.push_str("id,name,date\n1,a,2020-01-01\n");
        let d = detect_bytes(data.as_bytes());
        assert_eq!(d.skip_rows, 0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let d = detect(&ImportSource::from_path("/nonexistent/definitely/not/here.csv"));
        assert_eq!(d, Detection::fallback());
    }

    #[test]
    fn detection_is_deterministic() {
        let data = b"notes\nid,name\n1,2\n";
        assert_eq!(detect_bytes(data), detect_bytes(data));
    }
}
