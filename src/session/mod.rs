mod csv;
mod excel;
mod json;
mod options;
mod preview;

pub use csv::CsvSession;
pub use excel::ExcelSession;
pub use json::JsonSession;
pub use options::{CsvConfig, ExcelConfig, JsonConfig};
pub use preview::PreviewTable;

use std::io::Write;
use std::path::Path;

use crate::convert::{ConvertReport, convert_file};
use crate::errors::ImportError;
use crate::source::ImportSource;

/// One import in progress: a source plus a complete, possibly user-edited
/// configuration. Closed over the supported formats; callers use the shared
/// capability set and never branch on the concrete variant.
///
/// Sessions are immutable. Editing options goes through the per-format
/// `with_config` constructors, which build a new session over the same
/// source, so earlier previews stay reproducible.
#[derive(Debug, Clone)]
pub enum ImportSession {
    Csv(CsvSession),
    Excel(ExcelSession),
    Json(JsonSession),
}

impl ImportSession {
    /// Read at most `n` rows honoring the current configuration. Malformed
    /// rows are padded, truncated, or counted as skipped; they never abort
    /// the preview.
    ///
    /// # Errors
    /// Returns an error only when the source itself cannot be read.
    pub fn preview(&self, n: usize) -> Result<PreviewTable, ImportError> {
        match self {
            ImportSession::Csv(s) => s.preview(n),
            ImportSession::Excel(s) => s.preview(n),
            ImportSession::Json(s) => s.preview(n),
        }
    }

    /// Full conversion to a columnar artifact at `dest`. Writes to a temp
    /// file and atomically persists; a failed conversion leaves nothing at
    /// `dest`.
    ///
    /// # Errors
    /// Returns `ConversionFailed` or the underlying I/O/encoding error.
    pub fn convert(&self, dest: &Path) -> Result<ConvertReport, ImportError> {
        convert_file(self, dest)
    }

    /// Human-readable summary of the active configuration, for display and
    /// logging.
    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        match self {
            ImportSession::Csv(s) => s.describe(),
            ImportSession::Excel(s) => s.describe(),
            ImportSession::Json(s) => s.describe(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &ImportSource {
        match self {
            ImportSession::Csv(s) => s.source(),
            ImportSession::Excel(s) => s.source(),
            ImportSession::Json(s) => s.source(),
        }
    }

    #[must_use]
    pub fn format_name(&self) -> &'static str {
        match self {
            ImportSession::Csv(_) => "csv",
            ImportSession::Excel(_) => "excel",
            ImportSession::Json(_) => "json",
        }
    }

    /// Stream every row into `writer` as the columnar artifact.
    pub(crate) fn write_into<W: Write + Send>(
        &self,
        writer: W,
    ) -> Result<ConvertReport, ImportError> {
        match self {
            ImportSession::Csv(s) => s.write_into(writer),
            ImportSession::Excel(s) => s.write_into(writer),
            ImportSession::Json(s) => s.write_into(writer),
        }
    }
}
