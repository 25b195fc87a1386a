mod dialect;
mod structure;

pub use dialect::{DELIMITER_CANDIDATES, QUOTE_CANDIDATES, sniff_dialect};
pub use structure::{
    DEFAULT_DELIMITER, DEFAULT_QUOTE, Detection, SCAN_WINDOW_LINES, SNIFF_WINDOW_BYTES, detect,
};
