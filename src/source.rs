//! Input sources and the descriptor used for format routing.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where import bytes come from: a file on disk or an in-memory buffer.
///
/// Cloning is cheap; rebuilt sessions share the same source.
#[derive(Debug, Clone)]
pub enum ImportSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

impl ImportSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImportSource::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ImportSource::Memory(Arc::from(bytes.into()))
    }

    /// Open a fresh buffered reader over the source.
    ///
    /// # Errors
    /// Returns an error if a path-backed source cannot be opened.
    pub fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        match self {
            ImportSource::Path(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
            ImportSource::Memory(b) => Ok(Box::new(Cursor::new(b.clone()))),
        }
    }

    /// Read at most `max` bytes from the start of the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be opened or read.
    pub fn read_prefix(&self, max: usize) -> io::Result<Vec<u8>> {
        let reader = self.open()?;
        let mut buf = Vec::with_capacity(max.min(64 * 1024));
        reader.take(max as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn display(&self) -> String {
        match self {
            ImportSource::Path(p) => p.display().to_string(),
            ImportSource::Memory(b) => format!("<memory: {} bytes>", b.len()),
        }
    }
}

/// Routing input for the registry: file name and/or declared content type.
/// Enough to pick a handler without reading file contents.
#[derive(Debug, Clone, Default)]
pub struct SourceDescriptor {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl SourceDescriptor {
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let file_name =
            path.as_ref().file_name().and_then(|s| s.to_str()).map(ToString::to_string);
        Self { file_name, content_type: None }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        Some(ext.to_lowercase())
    }

    /// Lowercased content type with any parameters stripped.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        let ct = self.content_type.as_deref()?;
        let base = ct.split(';').next().unwrap_or(ct).trim();
        Some(base.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_extension_is_lowercased() {
        let d = SourceDescriptor::for_path("/tmp/Data.CSV");
        assert_eq!(d.extension().as_deref(), Some("csv"));
    }

    #[test]
    fn descriptor_media_type_strips_parameters() {
        let d = SourceDescriptor::default().with_content_type("text/CSV; charset=utf-8");
        assert_eq!(d.media_type().as_deref(), Some("text/csv"));
    }

    #[test]
    fn memory_source_prefix_is_bounded() {
        let src = ImportSource::from_bytes(vec![b'x'; 1000]);
        assert_eq!(src.read_prefix(10).unwrap().len(), 10);
    }
}
