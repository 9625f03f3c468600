// Core primitives for record parsing

pub mod buffer;
pub mod field;
pub mod scanner;

pub use buffer::ByteBuffer;
pub use field::RecordBuf;
pub use scanner::{Scan, ScanState, Scanner};
