//! Sheet classification and cleanup
//!
//! Two-column sheets are field/value listings and only get their headers
//! normalized and blank rows removed. Every other sheet is a regular table:
//! blank rows and columns go first, then text columns that are entirely dates
//! become `YYYY-MM-DD`, then numeric columns are rounded.

use crate::core::dates::{format_iso_date, DateParser};
use crate::error::{PolishError, PolishResult};
use crate::types::{CellValue, Column, ColumnType, Sheet, Table, TableKind};
use tracing::{debug, trace};

/// Column count that marks a key-value sheet
pub const KEY_VALUE_COLUMNS: usize = 2;

/// Header names given to key-value sheets
pub const FIELD_HEADER: &str = "Field";
pub const VALUE_HEADER: &str = "Value";

/// Decimal places kept in numeric columns of regular tables
pub const ROUND_DECIMALS: i32 = 2;

/// What happened to one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetReport {
    pub name: String,
    pub kind: TableKind,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_in: usize,
    pub columns_out: usize,
    /// Text columns rewritten as YYYY-MM-DD
    pub date_columns: Vec<String>,
    /// Numeric columns rounded to ROUND_DECIMALS places
    pub rounded_columns: Vec<String>,
}

/// Decide how a table is treated
pub fn classify(table: &Table) -> TableKind {
    if table.column_count() == KEY_VALUE_COLUMNS {
        TableKind::KeyValue
    } else {
        TableKind::Regular
    }
}

/// Round to ROUND_DECIMALS places, ties to even on the scaled value.
///
/// Values too large to scale carry no fractional digits and pass through.
pub fn round_value(value: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DECIMALS);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}

/// Applies the cleanup rules to sheets
pub struct SheetTransformer {
    dates: DateParser,
}

impl SheetTransformer {
    pub fn new() -> PolishResult<Self> {
        Ok(Self {
            dates: DateParser::new()?,
        })
    }

    /// Classify and transform one sheet
    pub fn transform(&self, sheet: Sheet) -> PolishResult<(Sheet, SheetReport)> {
        sheet.table.validate_lengths().map_err(|e| {
            PolishError::Transform(format!("Sheet '{}': {}", sheet.name, e))
        })?;

        let kind = classify(&sheet.table);
        let mut report = SheetReport {
            name: sheet.name.clone(),
            kind,
            rows_in: sheet.table.row_count(),
            rows_out: 0,
            columns_in: sheet.table.column_count(),
            columns_out: 0,
            date_columns: Vec::new(),
            rounded_columns: Vec::new(),
        };

        debug!(
            sheet = %sheet.name,
            %kind,
            rows = report.rows_in,
            columns = report.columns_in,
            "classified sheet"
        );

        let table = match kind {
            TableKind::KeyValue => self.transform_key_value(sheet.table),
            TableKind::Regular => self.transform_regular(sheet.table, &mut report),
        };

        report.rows_out = table.row_count();
        report.columns_out = table.column_count();

        let transformed = Sheet {
            name: sheet.name,
            table,
            kind: Some(kind),
        };
        Ok((transformed, report))
    }

    /// Rename headers to Field/Value and drop rows blank in both columns
    fn transform_key_value(&self, table: Table) -> Table {
        let keep = non_blank_rows(&table);
        let columns = table
            .columns
            .into_iter()
            .zip([FIELD_HEADER, VALUE_HEADER])
            .map(|(column, header)| {
                Column::new(header, retain_rows(column.cells, &keep))
            })
            .collect();
        Table::with_columns(columns)
    }

    fn transform_regular(&self, table: Table, report: &mut SheetReport) -> Table {
        // Rows first, then columns
        let keep = non_blank_rows(&table);
        let mut columns: Vec<Column> = table
            .columns
            .into_iter()
            .map(|column| Column {
                cells: retain_rows(column.cells, &keep),
                ..column
            })
            .filter(|column| {
                let blank = column.is_blank();
                if blank {
                    trace!(column = %column.name, "dropping blank column");
                }
                !blank
            })
            .collect();

        for column in &mut columns {
            match column.kind {
                ColumnType::Text => {
                    if self.convert_dates(column) {
                        report.date_columns.push(column.name.clone());
                    }
                }
                kind if kind.is_numeric() => {
                    round_column(column);
                    report.rounded_columns.push(column.name.clone());
                }
                _ => {}
            }
        }

        Table::with_columns(columns)
    }

    /// Rewrite a text column as ISO dates if every value is a date.
    ///
    /// Returns false, leaving the column untouched, when any value fails.
    fn convert_dates(&self, column: &mut Column) -> bool {
        let mut parsed = Vec::with_capacity(column.cells.len());
        for cell in &column.cells {
            if cell.is_empty() {
                parsed.push(None);
                continue;
            }
            match self.dates.cell_date(cell) {
                Some(date) => parsed.push(Some(date)),
                None => {
                    trace!(column = %column.name, value = %cell, "not a date column");
                    return false;
                }
            }
        }

        column.cells = parsed
            .into_iter()
            .map(|date| match date {
                Some(date) => CellValue::Text(format_iso_date(date)),
                None => CellValue::Empty,
            })
            .collect();
        column.kind = ColumnType::Date;
        debug!(column = %column.name, "converted column to dates");
        true
    }
}

fn round_column(column: &mut Column) {
    for cell in &mut column.cells {
        if let CellValue::Float(value) = cell {
            *value = round_value(*value);
        }
    }
}

/// Mask of rows holding at least one value
fn non_blank_rows(table: &Table) -> Vec<bool> {
    (0..table.row_count())
        .map(|row| {
            table
                .columns
                .iter()
                .any(|column| column.cells.get(row).is_some_and(|c| !c.is_empty()))
        })
        .collect()
}

fn retain_rows(cells: Vec<CellValue>, keep: &[bool]) -> Vec<CellValue> {
    cells
        .into_iter()
        .zip(keep)
        .filter_map(|(cell, &keep)| keep.then_some(cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn transformer() -> SheetTransformer {
        SheetTransformer::new().unwrap()
    }

    #[test]
    fn test_classify() {
        let two = Table::with_columns(vec![Column::new("a", vec![]), Column::new("b", vec![])]);
        assert_eq!(classify(&two), TableKind::KeyValue);

        let three = Table::with_columns(vec![
            Column::new("a", vec![]),
            Column::new("b", vec![]),
            Column::new("c", vec![]),
        ]);
        assert_eq!(classify(&three), TableKind::Regular);
        assert_eq!(classify(&Table::new()), TableKind::Regular);
    }

    #[test]
    fn test_round_value() {
        assert_eq!(round_value(19.999), 20.0);
        assert_eq!(round_value(1.234), 1.23);
        assert_eq!(round_value(-1.236), -1.24);
        assert_eq!(round_value(5.0), 5.0);
        assert!(round_value(f64::NAN).is_nan());
        assert_eq!(round_value(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_round_value_ties_to_even() {
        assert_eq!(round_value(0.125), 0.12);
        assert_eq!(round_value(-0.125), -0.12);
        assert_eq!(round_value(0.375), 0.38);
        assert_eq!(round_value(2.5), 2.5);
    }

    #[test]
    fn test_round_value_huge_values_pass_through() {
        assert_eq!(round_value(1e308), 1e308);
        assert_eq!(round_value(-1.5e307), -1.5e307);
        assert_eq!(round_value(f64::MAX), f64::MAX);
    }

    #[test]
    fn test_key_value_sheet() {
        let sheet = Sheet::new(
            "Info",
            Table::with_columns(vec![
                Column::new("Name", vec![text("Alice"), CellValue::Empty, text("Bob")]),
                Column::new("Age", vec![CellValue::Int(30), CellValue::Empty, CellValue::Empty]),
            ]),
        );

        let (out, report) = transformer().transform(sheet).unwrap();

        assert_eq!(out.kind, Some(TableKind::KeyValue));
        assert_eq!(out.table.column_names(), vec!["Field", "Value"]);
        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.table.columns[0].cells, vec![text("Alice"), text("Bob")]);
        assert_eq!(
            out.table.columns[1].cells,
            vec![CellValue::Int(30), CellValue::Empty]
        );
        assert_eq!(report.rows_in, 3);
        assert_eq!(report.rows_out, 2);
        assert!(report.date_columns.is_empty());
    }

    #[test]
    fn test_key_value_leaves_values_alone() {
        let sheet = Sheet::new(
            "KV",
            Table::with_columns(vec![
                Column::new("k", vec![text("when"), text("amount")]),
                Column::new("v", vec![text("2024-3-7"), CellValue::Float(19.999)]),
            ]),
        );

        let (out, _) = transformer().transform(sheet).unwrap();

        assert_eq!(
            out.table.columns[1].cells,
            vec![text("2024-3-7"), CellValue::Float(19.999)]
        );
    }

    #[test]
    fn test_regular_sheet_scenario() {
        let sheet = Sheet::new(
            "Data",
            Table::with_columns(vec![
                Column::new("ID", vec![CellValue::Int(1)]),
                Column::new("Amount", vec![CellValue::Float(19.999)]),
                Column::new("Date", vec![text("2024-3-7")]),
            ]),
        );

        let (out, report) = transformer().transform(sheet).unwrap();

        assert_eq!(out.kind, Some(TableKind::Regular));
        assert_eq!(out.table.row(0), vec![
            &CellValue::Int(1),
            &CellValue::Float(20.0),
            &text("2024-03-07"),
        ]);
        assert_eq!(out.table.columns[2].kind, ColumnType::Date);
        assert_eq!(report.date_columns, vec!["Date".to_string()]);
        assert_eq!(report.rounded_columns, vec!["ID".to_string(), "Amount".to_string()]);
    }

    #[test]
    fn test_regular_drops_blank_rows_then_columns() {
        let sheet = Sheet::new(
            "Data",
            Table::with_columns(vec![
                Column::new("a", vec![text("x"), CellValue::Empty, text("y")]),
                Column::new("blank", vec![CellValue::Empty, CellValue::Empty, CellValue::Empty]),
                Column::new("c", vec![CellValue::Int(1), CellValue::Empty, CellValue::Empty]),
            ]),
        );

        let (out, report) = transformer().transform(sheet).unwrap();

        assert_eq!(out.table.column_names(), vec!["a", "c"]);
        assert_eq!(out.table.columns[0].cells, vec![text("x"), text("y")]);
        assert_eq!(out.table.columns[1].cells, vec![CellValue::Int(1), CellValue::Empty]);
        assert_eq!(report.columns_in, 3);
        assert_eq!(report.columns_out, 2);
        assert_eq!(report.rows_out, 2);
    }

    #[test]
    fn test_partial_dates_leave_column_unchanged() {
        let before = vec![text("2024-3-7"), text("not a date"), CellValue::Empty];
        let sheet = Sheet::new(
            "Data",
            Table::with_columns(vec![
                Column::new("when", before.clone()),
                Column::new("n", vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)]),
                Column::new("m", vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)]),
            ]),
        );

        let (out, report) = transformer().transform(sheet).unwrap();

        assert_eq!(out.table.columns[0].cells, before);
        assert_eq!(out.table.columns[0].kind, ColumnType::Text);
        assert!(report.date_columns.is_empty());
    }

    #[test]
    fn test_date_column_keeps_missing_values() {
        let dt = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let sheet = Sheet::new(
            "Data",
            Table::with_columns(vec![
                Column::new(
                    "when",
                    vec![text("March 7, 2024"), CellValue::Empty, CellValue::DateTime(dt)],
                ),
                Column::new("x", vec![text("a"), text("b"), text("c")]),
                Column::new("y", vec![text("a"), text("b"), text("c")]),
            ]),
        );

        let (out, _) = transformer().transform(sheet).unwrap();

        assert_eq!(
            out.table.columns[0].cells,
            vec![text("2024-03-07"), CellValue::Empty, text("2023-12-31")]
        );
    }

    #[test]
    fn test_numeric_text_is_not_dates() {
        let sheet = Sheet::new(
            "Data",
            Table::with_columns(vec![Column::new(
                "code",
                vec![text("1001"), text("1002")],
            )]),
        );

        let (out, report) = transformer().transform(sheet).unwrap();

        assert_eq!(out.table.columns[0].cells, vec![text("1001"), text("1002")]);
        assert!(report.date_columns.is_empty());
    }

    #[test]
    fn test_header_only_sheet_loses_columns() {
        let sheet = Sheet::new(
            "Empty",
            Table::with_columns(vec![
                Column::new("a", vec![]),
                Column::new("b", vec![]),
                Column::new("c", vec![]),
            ]),
        );

        let (out, _) = transformer().transform(sheet).unwrap();

        assert_eq!(out.table.column_count(), 0);
    }

    #[test]
    fn test_empty_sheet() {
        let (out, report) = transformer()
            .transform(Sheet::new("Nothing", Table::new()))
            .unwrap();
        assert_eq!(out.name, "Nothing");
        assert_eq!(report.kind, TableKind::Regular);
        assert_eq!(out.table.column_count(), 0);
    }

    #[test]
    fn test_ragged_table_is_an_error() {
        let sheet = Sheet::new(
            "Bad",
            Table::with_columns(vec![
                Column::new("a", vec![CellValue::Int(1), CellValue::Int(2)]),
                Column::new("b", vec![CellValue::Int(1)]),
                Column::new("c", vec![CellValue::Int(1)]),
            ]),
        );

        let err = transformer().transform(sheet).unwrap_err();
        assert!(err.to_string().contains("Sheet 'Bad'"));
    }
}
