/// A bounded row sample for display. Never persisted.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PreviewTable {
    /// Column names, in source order.
    pub columns: Vec<String>,
    /// Up to the requested number of rows, each padded or truncated to the
    /// column count.
    pub rows: Vec<Vec<String>>,
    /// Rows dropped because they could not be read; reported, not fatal.
    pub skipped: u64,
}

impl PreviewTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
