//! CSV sessions: detector-seeded configuration over a delimited text source.

use std::io::{BufRead, Write};

use crate::convert::{ColumnarSink, ConvertReport};
use crate::detect;
use crate::errors::ImportError;
use crate::source::ImportSource;

use super::options::CsvConfig;
use super::preview::PreviewTable;

#[derive(Debug, Clone)]
pub struct CsvSession {
    source: ImportSource,
    config: CsvConfig,
    degraded: bool,
}

impl CsvSession {
    /// Build a session by running structure detection over the source.
    /// `has_header` defaults to true; detection never verifies it.
    #[must_use]
    pub fn new(source: ImportSource) -> Self {
        let detection = detect::detect(&source);
        if detection.degraded {
            log::warn!("csv: detection degraded to defaults for {}", source.display());
        } else {
            log::info!(
                "csv: detected skip_rows={} delimiter={:?} for {}",
                detection.skip_rows,
                detection.delimiter as char,
                source.display()
            );
        }
        Self { source, config: CsvConfig::from(detection), degraded: detection.degraded }
    }

    /// Rebuild with an edited configuration; the source is shared, the
    /// existing session is untouched.
    #[must_use]
    pub fn with_config(&self, config: CsvConfig) -> Self {
        Self { source: self.source.clone(), config, degraded: false }
    }

    #[must_use]
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// True when detection fell back to the hard defaults; callers may want
    /// to prompt the user to correct the configuration.
    #[must_use]
    pub fn detection_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub fn source(&self) -> &ImportSource {
        &self.source
    }

    pub fn preview(&self, n: usize) -> Result<PreviewTable, ImportError> {
        let columns = self.columns()?;
        let mut rows = Vec::new();
        let skipped = self.for_each_row(n, &mut |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok(PreviewTable { columns, rows, skipped })
    }

    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("format".into(), "CSV".into()),
            ("source".into(), self.source.display()),
            ("skip rows".into(), self.config.skip_rows.to_string()),
            ("delimiter".into(), printable(self.config.delimiter)),
            ("quote".into(), printable(self.config.quote)),
            (
                "header row".into(),
                (if self.config.has_header { "yes" } else { "no" }).into(),
            ),
        ]
    }

    pub(crate) fn write_into<W: Write + Send>(
        &self,
        writer: W,
    ) -> Result<ConvertReport, ImportError> {
        let columns = self.columns()?;
        if columns.is_empty() {
            return Err(ImportError::ConversionFailed("source has no columns".into()));
        }
        let mut sink = ColumnarSink::new(writer, &columns)?;
        let skipped = self.for_each_row(usize::MAX, &mut |row| sink.push_row(row))?;
        let written = sink.finish()?;
        Ok(ConvertReport { written, skipped })
    }

    /// Reader positioned after the configured skip rows, with the configured
    /// dialect. Headers are consumed manually so row shaping stays uniform.
    fn reader(&self) -> Result<::csv::Reader<Box<dyn BufRead + Send>>, ImportError> {
        let mut inner = self.source.open()?;
        skip_lines(&mut inner, self.config.skip_rows)?;
        Ok(::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .from_reader(inner))
    }

    /// Column names from the first readable record: its trimmed fields when
    /// `has_header`, synthesized `field_{i}` names otherwise.
    fn columns(&self) -> Result<Vec<String>, ImportError> {
        let mut rdr = self.reader()?;
        for rec in rdr.byte_records() {
            let Ok(rec) = rec else { continue };
            let cols = if self.config.has_header {
                rec.iter()
                    .enumerate()
                    .map(|(i, f)| {
                        let name = String::from_utf8_lossy(f).trim().to_string();
                        if name.is_empty() { format!("field_{i}") } else { name }
                    })
                    .collect()
            } else {
                (0..rec.len()).map(|i| format!("field_{i}")).collect()
            };
            return Ok(cols);
        }
        Ok(Vec::new())
    }

    /// Feed up to `limit` data rows to `f`, padded/truncated to the width of
    /// the first readable record. Unreadable records are counted, not fatal.
    fn for_each_row(
        &self,
        limit: usize,
        f: &mut dyn FnMut(Vec<String>) -> Result<(), ImportError>,
    ) -> Result<u64, ImportError> {
        let mut rdr = self.reader()?;
        let mut skipped = 0u64;
        let mut width: Option<usize> = None;
        let mut emitted = 0usize;
        let mut first = true;
        for rec in rdr.byte_records() {
            if emitted >= limit {
                break;
            }
            match rec {
                Ok(rec) => {
                    let w = *width.get_or_insert(rec.len());
                    if first {
                        first = false;
                        if self.config.has_header {
                            continue;
                        }
                    }
                    f(shape_record(&rec, w))?;
                    emitted += 1;
                }
                Err(e) => {
                    log::debug!("csv: skipping unreadable record: {e}");
                    skipped += 1;
                }
            }
        }
        Ok(skipped)
    }
}

fn skip_lines<R: BufRead + ?Sized>(reader: &mut R, n: usize) -> std::io::Result<()> {
    let mut buf = Vec::new();
    for _ in 0..n {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
    }
    Ok(())
}

/// Decode fields lossily and pad/truncate to `width`.
fn shape_record(rec: &::csv::ByteRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> =
        rec.iter().take(width).map(|f| String::from_utf8_lossy(f).into_owned()).collect();
    row.resize(width, String::new());
    row
}

fn printable(b: u8) -> String {
    match b {
        b'\t' => "\\t".into(),
        other => (other as char).to_string(),
    }
}
