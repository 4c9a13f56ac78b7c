//! Sheet cleanup rules

pub mod dates;
pub mod transform;

pub use dates::DateParser;
pub use transform::{classify, SheetReport, SheetTransformer};
