use crate::detect::{DEFAULT_DELIMITER, DEFAULT_QUOTE, Detection};

/// CSV import configuration. Always complete and directly usable; values are
/// either the hard defaults, a detection result, or a user edit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CsvConfig {
    pub skip_rows: usize,
    pub delimiter: u8,
    pub quote: u8,
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { skip_rows: 0, delimiter: DEFAULT_DELIMITER, quote: DEFAULT_QUOTE, has_header: true }
    }
}

impl From<Detection> for CsvConfig {
    /// Seed a configuration from a detection result. `has_header` is not
    /// detected; it is assumed true whenever a plausible header exists.
    fn from(d: Detection) -> Self {
        Self { skip_rows: d.skip_rows, delimiter: d.delimiter, quote: d.quote, has_header: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExcelConfig {
    pub sheet_name: String,
}

/// JSON has no tunables; the type exists so every format carries a complete
/// configuration value.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JsonConfig {}
