use chrono::{NaiveDateTime, Timelike};
use std::fmt;

//==============================================================================
// Cell Values
//==============================================================================

/// A single cell, tagged with the type it was read as
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing value (blank cell or empty string)
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Native spreadsheet date/time
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Check if the cell holds no value
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell (Int and Float only)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text as it appears in the output sheet, used for column sizing
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::DateTime(dt) => format_datetime(dt),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Format a date/time the way the exporter renders it
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if is_midnight(dt) {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// True when a date/time carries no time of day
pub fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}

//==============================================================================
// Columns and Tables
//==============================================================================

/// Nominal column type, assigned once from the column's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// No non-missing cell
    Empty,
    /// Every value numeric and integral
    Integer,
    /// Every value numeric
    Float,
    /// Every value boolean
    Boolean,
    /// Every value a date (native, or text converted to YYYY-MM-DD)
    Date,
    /// Anything else, including mixed content
    Text,
}

impl ColumnType {
    /// Infer the column type from its cells.
    ///
    /// Priority: Empty, Integer, Float, Boolean, Date, Text.
    pub fn infer(cells: &[CellValue]) -> Self {
        let mut values = cells.iter().filter(|c| !c.is_empty()).peekable();
        if values.peek().is_none() {
            return ColumnType::Empty;
        }

        let values: Vec<&CellValue> = values.collect();
        if values.iter().all(|c| match c {
            CellValue::Int(_) => true,
            CellValue::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        }) {
            return ColumnType::Integer;
        }
        if values.iter().all(|c| c.as_f64().is_some()) {
            return ColumnType::Float;
        }
        if values.iter().all(|c| matches!(c, CellValue::Bool(_))) {
            return ColumnType::Boolean;
        }
        if values.iter().all(|c| matches!(c, CellValue::DateTime(_))) {
            return ColumnType::Date;
        }
        ColumnType::Text
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Empty => "Empty",
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
            ColumnType::Text => "Text",
        }
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub cells: Vec<CellValue>,
}

impl Column {
    /// Create a column, inferring its type from the cells
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let kind = ColumnType::infer(&cells);
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when no cell holds a value (vacuously true for zero rows)
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// Rectangular table: ordered columns of equal length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cells of one row, in column order
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().filter_map(|c| c.cells.get(index)).collect()
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for column in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    column.name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }
}

//==============================================================================
// Sheets and Workbooks
//==============================================================================

/// How a sheet's table is interpreted during transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Exactly two columns, read as field/value pairs
    KeyValue,
    /// Any other column count
    Regular,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::KeyValue => f.write_str("key-value"),
            TableKind::Regular => f.write_str("regular"),
        }
    }
}

/// A named sheet holding one table
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
    /// Set once the sheet has been transformed
    pub kind: Option<TableKind>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table,
            kind: None,
        }
    }
}

/// Ordered sequence of sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_infer_empty() {
        assert_eq!(ColumnType::infer(&[]), ColumnType::Empty);
        assert_eq!(
            ColumnType::infer(&[CellValue::Empty, CellValue::Empty]),
            ColumnType::Empty
        );
    }

    #[test]
    fn test_infer_integer_accepts_integral_floats() {
        let cells = vec![CellValue::Int(1), CellValue::Float(30.0), CellValue::Empty];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Integer);
    }

    #[test]
    fn test_infer_float() {
        let cells = vec![CellValue::Int(1), CellValue::Float(19.999)];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Float);
    }

    #[test]
    fn test_infer_boolean_and_date() {
        assert_eq!(
            ColumnType::infer(&[CellValue::Bool(true), CellValue::Empty]),
            ColumnType::Boolean
        );
        assert_eq!(
            ColumnType::infer(&[CellValue::DateTime(date(2024, 3, 7))]),
            ColumnType::Date
        );
    }

    #[test]
    fn test_infer_mixed_is_text() {
        let cells = vec![CellValue::Int(1), CellValue::Text("a".to_string())];
        assert_eq!(ColumnType::infer(&cells), ColumnType::Text);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Empty.display_text(), "");
        assert_eq!(CellValue::Int(30).display_text(), "30");
        assert_eq!(CellValue::Float(19.5).display_text(), "19.5");
        assert_eq!(CellValue::Bool(false).display_text(), "FALSE");
        assert_eq!(
            CellValue::DateTime(date(2024, 3, 7)).display_text(),
            "2024-03-07"
        );
        let with_time = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(with_time).display_text(),
            "2024-03-07 09:30:00"
        );
    }

    #[test]
    fn test_table_row_count_and_validation() {
        let mut table = Table::new();
        assert_eq!(table.row_count(), 0);
        table.add_column(Column::new("a", vec![CellValue::Int(1), CellValue::Int(2)]));
        table.add_column(Column::new("b", vec![CellValue::Int(1)]));
        assert_eq!(table.row_count(), 2);
        assert!(table.validate_lengths().is_err());
    }

    #[test]
    fn test_column_is_blank() {
        assert!(Column::new("a", vec![]).is_blank());
        assert!(Column::new("a", vec![CellValue::Empty]).is_blank());
        assert!(!Column::new("a", vec![CellValue::Text(" ".to_string())]).is_blank());
    }
}
