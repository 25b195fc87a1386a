//! Columnar sink: batched Parquet writing over an all-Utf8 schema.
//!
//! Column typing is out of scope for the import subsystem, so every column is
//! a nullable Utf8 field and rows are written as they arrive, one record
//! batch at a time.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::errors::ImportError;

/// Rows buffered per record batch; bounds peak memory independent of file size.
pub const BATCH_ROWS: usize = 8192;

pub struct ColumnarSink<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: SchemaRef,
    pending: Vec<Vec<String>>,
    written: u64,
}

impl<W: Write + Send> ColumnarSink<W> {
    /// # Errors
    /// Returns a Parquet error if the writer cannot be created.
    pub fn new(writer: W, columns: &[String]) -> Result<Self, ImportError> {
        let fields: Vec<Field> =
            columns.iter().map(|c| Field::new(c.as_str(), DataType::Utf8, true)).collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let props = WriterProperties::builder().build();
        let writer = ArrowWriter::try_new(writer, schema.clone(), Some(props))?;
        Ok(Self { writer, schema, pending: Vec::with_capacity(BATCH_ROWS), written: 0 })
    }

    /// Buffer one row, flushing a batch when full. `row` must already be
    /// shaped to the column count.
    ///
    /// # Errors
    /// Returns an Arrow/Parquet error if a batch write fails.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), ImportError> {
        debug_assert_eq!(row.len(), self.schema.fields().len());
        self.pending.push(row);
        if self.pending.len() >= BATCH_ROWS {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Flush the remainder and close the file. Returns total rows written.
    ///
    /// # Errors
    /// Returns an Arrow/Parquet error if the final write or close fails.
    pub fn finish(mut self) -> Result<u64, ImportError> {
        self.flush_batch()?;
        self.writer.close()?;
        Ok(self.written)
    }

    fn flush_batch(&mut self) -> Result<(), ImportError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let ncols = self.schema.fields().len();
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(ncols);
        for col in 0..ncols {
            let values: Vec<&str> = self.pending.iter().map(|row| row[col].as_str()).collect();
            arrays.push(Arc::new(StringArray::from(values)) as ArrayRef);
        }
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.writer.write(&batch)?;
        self.written += self.pending.len() as u64;
        self.pending.clear();
        Ok(())
    }
}
