//! sheetpolish - tidy up spreadsheet workbooks
//!
//! Reads a workbook, cleans every sheet and writes `processed_<name>` next
//! to it.
//!
//! # Rules
//!
//! - Two-column sheets are key-value listings: headers become `Field` and
//!   `Value`, rows blank in both columns are dropped
//! - Other sheets drop blank rows, then blank columns, convert text columns
//!   that hold only dates to `YYYY-MM-DD`, and round numbers to 2 places
//! - Columns are sized to fit their widest value
//!
//! # Example
//!
//! ```no_run
//! use sheetpolish::cli::process;
//! use std::path::Path;
//!
//! let report = process(Path::new("report.xlsx"))?;
//! println!("Saved: {}", report.output.display());
//! for sheet in &report.sheets {
//!     println!("{}: {} rows", sheet.name, sheet.rows_out);
//! }
//! # Ok::<(), sheetpolish::error::PolishError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PolishError, PolishResult};
pub use types::{CellValue, Column, ColumnType, Sheet, Table, TableKind, Workbook};
