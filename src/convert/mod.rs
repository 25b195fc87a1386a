mod pipeline;
mod sink;

pub use pipeline::{ConvertReport, convert_file};
pub use sink::{BATCH_ROWS, ColumnarSink};
