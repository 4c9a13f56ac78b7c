//! Excel import/export module
//!
//! - Import: workbook file (.xlsx, .xls, .xlsb, .ods) → tables
//! - Export: tables → .xlsx with sized columns

mod exporter;
mod importer;

pub use exporter::{column_letter, column_width, ExcelExporter, WIDTH_PADDING};
pub use importer::ExcelImporter;
