//! JSON sessions: NDJSON line streams or a single array of objects.

use std::io::{BufRead, Write};

use serde_json::{Map, Value};

use crate::convert::{ColumnarSink, ConvertReport};
use crate::errors::ImportError;
use crate::source::ImportSource;

use super::options::JsonConfig;
use super::preview::PreviewTable;

#[derive(Debug, Clone)]
pub struct JsonSession {
    source: ImportSource,
    config: JsonConfig,
}

impl JsonSession {
    #[must_use]
    pub fn new(source: ImportSource) -> Self {
        Self { source, config: JsonConfig::default() }
    }

    #[must_use]
    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    #[must_use]
    pub fn source(&self) -> &ImportSource {
        &self.source
    }

    pub fn preview(&self, n: usize) -> Result<PreviewTable, ImportError> {
        let mut columns: Vec<String> = Vec::new();
        let mut objects: Vec<Map<String, Value>> = Vec::new();
        let skipped = self.for_each_object(n, &mut |obj| {
            merge_columns(&mut columns, &obj);
            objects.push(obj);
            Ok(())
        })?;
        let rows = objects.iter().map(|obj| project(obj, &columns)).collect();
        Ok(PreviewTable { columns, rows, skipped })
    }

    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        vec![("format".into(), "JSON".into()), ("source".into(), self.source.display())]
    }

    pub(crate) fn write_into<W: Write + Send>(
        &self,
        writer: W,
    ) -> Result<ConvertReport, ImportError> {
        // First pass discovers the column set, second pass streams the rows;
        // NDJSON never holds more than one record in memory.
        let mut columns: Vec<String> = Vec::new();
        self.for_each_object(usize::MAX, &mut |obj| {
            merge_columns(&mut columns, &obj);
            Ok(())
        })?;
        if columns.is_empty() {
            return Err(ImportError::ConversionFailed("no records with fields found".into()));
        }
        let mut sink = ColumnarSink::new(writer, &columns)?;
        let skipped = self.for_each_object(usize::MAX, &mut |obj| {
            sink.push_row(project(&obj, &columns))
        })?;
        let written = sink.finish()?;
        Ok(ConvertReport { written, skipped })
    }

    /// Feed up to `limit` top-level objects to `f`. Unparseable lines and
    /// non-object records are counted as skipped.
    fn for_each_object(
        &self,
        limit: usize,
        f: &mut dyn FnMut(Map<String, Value>) -> Result<(), ImportError>,
    ) -> Result<u64, ImportError> {
        let mut skipped = 0u64;
        if self.array_mode()? {
            // Whole-document parse; array inputs are one JSON value by
            // definition so there is no line-level recovery to do.
            let value: Value = serde_json::from_reader(self.source.open()?)?;
            let Value::Array(items) = value else {
                return Err(ImportError::ConversionFailed("expected a JSON array".into()));
            };
            let mut emitted = 0usize;
            for item in items {
                if emitted >= limit {
                    break;
                }
                match item {
                    Value::Object(obj) => {
                        f(obj)?;
                        emitted += 1;
                    }
                    _ => skipped += 1,
                }
            }
            return Ok(skipped);
        }
        let mut reader = self.source.open()?;
        let mut buf = Vec::with_capacity(8 * 1024);
        let mut emitted = 0usize;
        loop {
            if emitted >= limit {
                break;
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(obj)) => {
                    f(obj)?;
                    emitted += 1;
                }
                Ok(_) | Err(_) => skipped += 1,
            }
        }
        Ok(skipped)
    }

    /// A leading `[` selects array-of-objects mode; anything else is NDJSON.
    fn array_mode(&self) -> Result<bool, ImportError> {
        let head = self.source.read_prefix(1024)?;
        let text = String::from_utf8_lossy(&head);
        Ok(text.trim_start().starts_with('['))
    }
}

/// Column union in first-seen key order.
fn merge_columns(columns: &mut Vec<String>, obj: &Map<String, Value>) {
    for key in obj.keys() {
        if !columns.iter().any(|c| c == key) {
            columns.push(key.clone());
        }
    }
}

fn project(obj: &Map<String, Value>, columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| obj.get(c).map(value_to_string).unwrap_or_default()).collect()
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
