//! Excel exporter implementation

use crate::error::PolishResult;
use crate::types::{is_midnight, CellValue, Column, ColumnType, Sheet, TableKind, Workbook};
use rust_xlsxwriter::{Format, FormatBorder, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;
use tracing::{debug, trace};

/// Extra characters added to the widest value of a column
pub const WIDTH_PADDING: usize = 2;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DECIMAL_FORMAT: &str = "0.00";

/// Writes transformed sheets to a new .xlsx file
pub struct ExcelExporter {
    workbook: Workbook,
    header_format: Format,
    date_format: Format,
    datetime_format: Format,
    decimal_format: Format,
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new(workbook: Workbook) -> Self {
        Self {
            workbook,
            header_format: Format::new().set_bold().set_border_bottom(FormatBorder::Thin),
            date_format: Format::new().set_num_format(DATE_FORMAT),
            datetime_format: Format::new().set_num_format(DATETIME_FORMAT),
            decimal_format: Format::new().set_num_format(DECIMAL_FORMAT),
        }
    }

    /// Export every sheet, in order, and save once at the end.
    ///
    /// Nothing touches the disk unless every sheet was written.
    pub fn export(&self, output_path: &Path) -> PolishResult<()> {
        let mut xlsx = XlsxWorkbook::new();

        for sheet in &self.workbook.sheets {
            self.export_sheet(&mut xlsx, sheet)?;
        }

        xlsx.save(output_path)?;
        debug!(path = %output_path.display(), "saved workbook");
        Ok(())
    }

    /// Export a single sheet: header row, data rows, column widths
    fn export_sheet(&self, xlsx: &mut XlsxWorkbook, sheet: &Sheet) -> PolishResult<()> {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        let table = &sheet.table;
        if table.column_count() > 0 {
            worksheet.set_freeze_panes(1, 0)?;
        }

        for (col_idx, column) in table.columns.iter().enumerate() {
            let col = col_idx as u16;
            let two_decimals = uses_two_decimals(sheet.kind, column);

            worksheet.write_string_with_format(0, col, &column.name, &self.header_format)?;

            for (row_idx, cell) in column.cells.iter().enumerate() {
                let row = row_idx as u32 + 1;
                self.write_cell(worksheet, row, col, cell, two_decimals)?;
            }

            let width = column_width(column, two_decimals);
            trace!(
                sheet = %sheet.name,
                column = %column_letter(col_idx),
                width,
                "sized column"
            );
            worksheet.set_column_width(col, width as f64)?;
        }

        Ok(())
    }

    /// Write a single cell value based on its type
    fn write_cell(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &CellValue,
        two_decimals: bool,
    ) -> PolishResult<()> {
        match cell {
            CellValue::Empty => {}
            CellValue::Text(value) => {
                worksheet.write_string(row, col, value)?;
            }
            CellValue::Int(value) => {
                worksheet.write_number(row, col, *value as f64)?;
            }
            CellValue::Float(value) if two_decimals => {
                worksheet.write_number_with_format(row, col, *value, &self.decimal_format)?;
            }
            CellValue::Float(value) => {
                worksheet.write_number(row, col, *value)?;
            }
            CellValue::Bool(value) => {
                worksheet.write_boolean(row, col, *value)?;
            }
            CellValue::DateTime(value) => {
                let format = if is_midnight(value) {
                    &self.date_format
                } else {
                    &self.datetime_format
                };
                worksheet.write_datetime_with_format(row, col, value, format)?;
            }
        }
        Ok(())
    }
}

/// Rounded float columns of regular tables are shown with two decimals
fn uses_two_decimals(kind: Option<TableKind>, column: &Column) -> bool {
    kind == Some(TableKind::Regular) && column.kind == ColumnType::Float
}

/// Display width of a column: longest of header and shown values, plus padding
pub fn column_width(column: &Column, two_decimals: bool) -> usize {
    let longest_value = column
        .cells
        .iter()
        .map(|cell| match cell {
            CellValue::Float(f) if two_decimals => format!("{:.2}", f).chars().count(),
            other => other.display_text().chars().count(),
        })
        .max()
        .unwrap_or(0);

    column.name.chars().count().max(longest_value) + WIDTH_PADDING
}

/// Convert column index to Excel column letter (0→A, 1→B, 25→Z, 26→AA, etc.)
pub fn column_letter(index: usize) -> String {
    let mut result = String::new();
    let mut num = index;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}
