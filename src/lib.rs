//! Tabular-dataset import: format routing, heuristic structure detection for
//! delimited text, bounded previews, and streaming conversion to a columnar
//! Parquet artifact.
//!
//! The flow is: an [`ImporterRegistry`] picks a handler for a source
//! descriptor, the handler builds an [`ImportSession`] (running the
//! structure detector for CSV), the caller previews a bounded row sample,
//! optionally rebuilds the session with edited options, and finally commits
//! with [`ImportSession::convert`].

pub mod convert;
pub mod detect;
pub mod errors;
pub mod logger;
pub mod registry;
pub mod session;
pub mod source;

pub use convert::{ConvertReport, convert_file};
pub use detect::{Detection, detect};
pub use errors::ImportError;
pub use registry::{CsvHandler, ExcelHandler, FormatHandler, ImporterRegistry, JsonHandler};
pub use session::{
    CsvConfig, CsvSession, ExcelConfig, ExcelSession, ImportSession, JsonConfig, JsonSession,
    PreviewTable,
};
pub use source::{ImportSource, SourceDescriptor};

/// Initializes the logging system.
///
/// Call once at startup; see [`logger`] for programmatic configuration.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
