//! Format routing: an ordered list of handlers, first match wins.

use crate::errors::ImportError;
use crate::session::{CsvSession, ExcelSession, ImportSession, JsonSession};
use crate::source::{ImportSource, SourceDescriptor};

/// The plugin contract every format implements. `suggest` routes on the
/// descriptor alone (extension and/or declared content type) so selection
/// never reads file contents.
pub trait FormatHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn suggest(&self, descriptor: &SourceDescriptor) -> bool;

    /// # Errors
    /// Returns an error when the source cannot be opened for this format.
    fn init_session(&self, source: ImportSource) -> Result<ImportSession, ImportError>;
}

pub struct CsvHandler;

impl FormatHandler for CsvHandler {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn suggest(&self, d: &SourceDescriptor) -> bool {
        matches!(d.extension().as_deref(), Some("csv" | "tsv" | "txt"))
            || matches!(
                d.media_type().as_deref(),
                Some("text/csv" | "text/tab-separated-values" | "text/plain")
            )
    }

    fn init_session(&self, source: ImportSource) -> Result<ImportSession, ImportError> {
        Ok(ImportSession::Csv(CsvSession::new(source)))
    }
}

pub struct ExcelHandler;

impl FormatHandler for ExcelHandler {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn suggest(&self, d: &SourceDescriptor) -> bool {
        matches!(d.extension().as_deref(), Some("xlsx" | "xls" | "xlsm" | "xlsb" | "ods"))
            || matches!(
                d.media_type().as_deref(),
                Some(
                    "application/vnd.ms-excel"
                        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                        | "application/vnd.oasis.opendocument.spreadsheet"
                )
            )
    }

    fn init_session(&self, source: ImportSource) -> Result<ImportSession, ImportError> {
        Ok(ImportSession::Excel(ExcelSession::new(source)?))
    }
}

pub struct JsonHandler;

impl FormatHandler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn suggest(&self, d: &SourceDescriptor) -> bool {
        matches!(d.extension().as_deref(), Some("json" | "jsonl" | "ndjson"))
            || matches!(
                d.media_type().as_deref(),
                Some("application/json" | "application/x-ndjson")
            )
    }

    fn init_session(&self, source: ImportSource) -> Result<ImportSession, ImportError> {
        Ok(ImportSession::Json(JsonSession::new(source)))
    }
}

/// An explicitly constructed registry value; handler order is fixed at
/// construction and consulted first-to-last. Read-only after construction,
/// so concurrent `select` calls need no synchronization.
pub struct ImporterRegistry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl ImporterRegistry {
    #[must_use]
    pub fn new(handlers: Vec<Box<dyn FormatHandler>>) -> Self {
        Self { handlers }
    }

    /// The stock registry: CSV, then Excel, then JSON.
    #[must_use]
    pub fn with_default_handlers() -> Self {
        Self::new(vec![Box::new(CsvHandler), Box::new(ExcelHandler), Box::new(JsonHandler)])
    }

    /// First handler whose `suggest` predicate matches; no handler is
    /// consulted after a match.
    ///
    /// # Errors
    /// Returns `UnsupportedFormat` when nothing matched; callers surface
    /// this to the user, it is never retried.
    pub fn select(&self, descriptor: &SourceDescriptor) -> Result<&dyn FormatHandler, ImportError> {
        self.handlers
            .iter()
            .map(|h| &**h)
            .find(|h| h.suggest(descriptor))
            .ok_or_else(|| ImportError::UnsupportedFormat(describe(descriptor)))
    }

    /// Route and build a session in one step.
    ///
    /// # Errors
    /// Returns `UnsupportedFormat` or the handler's session error.
    pub fn open(
        &self,
        source: ImportSource,
        descriptor: &SourceDescriptor,
    ) -> Result<ImportSession, ImportError> {
        self.select(descriptor)?.init_session(source)
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

fn describe(d: &SourceDescriptor) -> String {
    match (&d.file_name, &d.content_type) {
        (Some(n), Some(ct)) => format!("{n} ({ct})"),
        (Some(n), None) => n.clone(),
        (None, Some(ct)) => ct.clone(),
        (None, None) => "unknown source".into(),
    }
}
