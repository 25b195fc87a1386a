//! Excel sessions. No detection logic; the only tunable is the sheet.

use std::io::{Cursor, Write};

use calamine::{Data, DataType, Range, Reader};

use crate::convert::{ColumnarSink, ConvertReport};
use crate::errors::ImportError;
use crate::source::ImportSource;

use super::options::ExcelConfig;
use super::preview::PreviewTable;

#[derive(Debug, Clone)]
pub struct ExcelSession {
    source: ImportSource,
    config: ExcelConfig,
}

impl ExcelSession {
    /// Build a session over the workbook's first sheet.
    ///
    /// # Errors
    /// Returns `Excel` when the workbook cannot be opened or has no sheets.
    pub fn new(source: ImportSource) -> Result<Self, ImportError> {
        let names = sheet_names(&source)?;
        let sheet_name = names
            .into_iter()
            .next()
            .ok_or_else(|| ImportError::Excel("workbook has no worksheets".into()))?;
        log::info!("excel: opened {} on sheet {sheet_name:?}", source.display());
        Ok(Self { source, config: ExcelConfig { sheet_name } })
    }

    /// Rebuild with an edited configuration over the same source.
    #[must_use]
    pub fn with_config(&self, config: ExcelConfig) -> Self {
        Self { source: self.source.clone(), config }
    }

    #[must_use]
    pub fn config(&self) -> &ExcelConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &ImportSource {
        &self.source
    }

    /// All sheet names in the workbook, for configuration UIs.
    pub fn sheet_names(&self) -> Result<Vec<String>, ImportError> {
        sheet_names(&self.source)
    }

    pub fn preview(&self, n: usize) -> Result<PreviewTable, ImportError> {
        let range = self.sheet_range()?;
        let mut rows_iter = range.rows();
        let Some(header) = rows_iter.next() else {
            return Ok(PreviewTable::default());
        };
        let columns = header_names(header);
        let width = columns.len();
        let rows = rows_iter.take(n).map(|r| shape_row(r, width)).collect();
        Ok(PreviewTable { columns, rows, skipped: 0 })
    }

    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        vec![
            ("format".into(), "Excel".into()),
            ("source".into(), self.source.display()),
            ("sheet".into(), self.config.sheet_name.clone()),
        ]
    }

    pub(crate) fn write_into<W: Write + Send>(
        &self,
        writer: W,
    ) -> Result<ConvertReport, ImportError> {
        let range = self.sheet_range()?;
        let mut rows_iter = range.rows();
        let Some(header) = rows_iter.next() else {
            return Err(ImportError::ConversionFailed("sheet is empty".into()));
        };
        let columns = header_names(header);
        if columns.is_empty() {
            return Err(ImportError::ConversionFailed("sheet has no columns".into()));
        }
        let width = columns.len();
        let mut sink = ColumnarSink::new(writer, &columns)?;
        for row in rows_iter {
            sink.push_row(shape_row(row, width))?;
        }
        let written = sink.finish()?;
        Ok(ConvertReport { written, skipped: 0 })
    }

    fn sheet_range(&self) -> Result<Range<Data>, ImportError> {
        let name = self.config.sheet_name.as_str();
        match &self.source {
            ImportSource::Path(p) => {
                let mut wb = calamine::open_workbook_auto(p)?;
                Ok(wb.worksheet_range(name)?)
            }
            ImportSource::Memory(b) => {
                let mut wb = calamine::open_workbook_auto_from_rs(Cursor::new(b.clone()))?;
                Ok(wb.worksheet_range(name)?)
            }
        }
    }
}

fn sheet_names(source: &ImportSource) -> Result<Vec<String>, ImportError> {
    match source {
        ImportSource::Path(p) => {
            let wb = calamine::open_workbook_auto(p)?;
            Ok(wb.sheet_names().to_vec())
        }
        ImportSource::Memory(b) => {
            let wb = calamine::open_workbook_auto_from_rs(Cursor::new(b.clone()))?;
            Ok(wb.sheet_names().to_vec())
        }
    }
}

fn header_names(row: &[Data]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, c)| {
            let name = cell_to_string(c);
            if name.trim().is_empty() { format!("field_{i}") } else { name.trim().to_string() }
        })
        .collect()
}

fn shape_row(row: &[Data], width: usize) -> Vec<String> {
    let mut out: Vec<String> = row.iter().take(width).map(cell_to_string).collect();
    out.resize(width, String::new());
    out
}

fn cell_to_string(cell: &Data) -> String {
    if cell.is_empty() {
        return String::new();
    }
    cell.as_string().unwrap_or_else(|| cell.to_string())
}
