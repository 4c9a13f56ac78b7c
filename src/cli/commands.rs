use crate::core::{SheetReport, SheetTransformer};
use crate::error::{PolishError, PolishResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::types::Workbook;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix added to the input file name to form the output file name
pub const OUTPUT_PREFIX: &str = "processed_";

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub output: PathBuf,
    pub sheets: Vec<SheetReport>,
}

/// Sibling path of the input with `processed_` in front of the file name
pub fn output_path_for(input: &Path) -> PolishResult<PathBuf> {
    let file_name = input
        .file_name()
        .ok_or_else(|| PolishError::InvalidPath(format!("{} has no file name", input.display())))?;

    let mut name = std::ffi::OsString::from(OUTPUT_PREFIX);
    name.push(file_name);
    Ok(input.with_file_name(name))
}

/// Execute the process command: load, transform every sheet, write the copy
pub fn process(input: &Path) -> PolishResult<ProcessReport> {
    let output = output_path_for(input)?;
    info!(input = %input.display(), output = %output.display(), "processing workbook");

    let source = ExcelImporter::new(input).import()?;
    debug!(sheets = ?source.sheet_names(), "loaded workbook");

    let transformer = SheetTransformer::new()?;
    let mut transformed = Workbook::new();
    let mut reports = Vec::with_capacity(source.sheets.len());
    for sheet in source.sheets {
        let (sheet, report) = transformer.transform(sheet)?;
        info!(
            sheet = %report.name,
            kind = %report.kind,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            columns_in = report.columns_in,
            columns_out = report.columns_out,
            date_columns = ?report.date_columns,
            rounded_columns = ?report.rounded_columns,
            "transformed sheet"
        );
        transformed.add_sheet(sheet);
        reports.push(report);
    }

    ExcelExporter::new(transformed).export(&output)?;
    info!(sheets = reports.len(), "processing complete");

    Ok(ProcessReport {
        output,
        sheets: reports,
    })
}
