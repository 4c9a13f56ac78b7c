//! Excel importer implementation - workbook file → in-memory tables

use crate::error::PolishResult;
use crate::types::{format_datetime, CellValue, Column, Sheet, Table, Workbook};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Reads every sheet of a workbook (xlsx, xlsm, xlsb, xls, ods)
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load all sheets, in file order
    pub fn import(&self) -> PolishResult<Workbook> {
        let mut source = open_workbook_auto(&self.path)?;
        let sheet_names = source.sheet_names().to_vec();
        debug!(path = %self.path.display(), sheets = sheet_names.len(), "opened workbook");

        let mut workbook = Workbook::new();
        for sheet_name in sheet_names {
            let range = source.worksheet_range(&sheet_name)?;
            let table = Self::read_table(&range);
            debug!(
                sheet = %sheet_name,
                rows = table.row_count(),
                columns = table.column_count(),
                "read sheet"
            );
            workbook.add_sheet(Sheet::new(sheet_name, table));
        }

        Ok(workbook)
    }

    /// Build a table from a cell range.
    ///
    /// The grid is anchored at A1 and its first row is the header.
    pub fn read_table(range: &Range<Data>) -> Table {
        let (height, width) = match range.end() {
            Some((row, col)) if !range.is_empty() => (row as usize + 1, col as usize + 1),
            _ => return Table::new(),
        };

        let cell_at = |row: usize, col: usize| range.get_value((row as u32, col as u32));

        let headers: Vec<Option<String>> = (0..width)
            .map(|col| cell_at(0, col).and_then(Self::header_text))
            .collect();
        let names = Self::unique_headers(headers);

        let mut table = Table::new();
        for (col, name) in names.into_iter().enumerate() {
            let cells = (1..height)
                .map(|row| cell_at(row, col).map_or(CellValue::Empty, Self::convert_cell))
                .collect();
            let column = Column::new(name, cells);
            trace!(column = %column.name, kind = column.kind.type_name(), "inferred column type");
            table.add_column(column);
        }
        table
    }

    /// Convert a calamine cell to a tagged value
    pub fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => {
                if dt.is_duration() {
                    CellValue::Float(dt.as_f64())
                } else {
                    dt.as_datetime()
                        .map_or(CellValue::Float(dt.as_f64()), CellValue::DateTime)
                }
            }
            Data::DateTimeIso(s) => {
                parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::DateTime)
            }
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }

    /// Header text for a cell; None for a missing header
    fn header_text(cell: &Data) -> Option<String> {
        match Self::convert_cell(cell) {
            CellValue::Empty => None,
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                Some(format!("{}", f as i64))
            }
            CellValue::DateTime(dt) => Some(format_datetime(&dt)),
            other => Some(other.display_text()),
        }
    }

    /// Name missing headers `Unnamed: <index>` and suffix duplicates with `.1`, `.2`, …
    fn unique_headers(headers: Vec<Option<String>>) -> Vec<String> {
        let mut seen = HashSet::new();
        headers
            .into_iter()
            .enumerate()
            .map(|(idx, header)| {
                let base = header.unwrap_or_else(|| format!("Unnamed: {}", idx));
                let mut name = base.clone();
                let mut counter = 1;
                while !seen.insert(name.clone()) {
                    name = format!("{}.{}", base, counter);
                    counter += 1;
                }
                name
            })
            .collect()
    }
}

/// Parse the ISO 8601 text calamine yields for ods date cells
fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
