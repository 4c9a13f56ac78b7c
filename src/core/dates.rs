//! Date recognition for text columns
//!
//! Accepts the common ways people type dates into a spreadsheet: ISO, US and
//! European numeric forms, month names, RFC 3339/2822 timestamps and compact
//! `YYYYMMDD`. Anything else is "not a date" and yields `None`.

use crate::error::{PolishError, PolishResult};
use crate::types::CellValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Output format for converted date columns
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts, tried before plain dates so trailing times are consumed
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Plain date layouts; month-first wins over day-first when both fit
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%d-%b-%y",
    "%Y-%b-%d",
    "%b-%d-%Y",
];

/// Years outside this range are treated as misreads
const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

/// Recognizes dates in free-form cell text
pub struct DateParser {
    ordinal: Regex,
    weekday: Regex,
    spaces: Regex,
}

impl DateParser {
    pub fn new() -> PolishResult<Self> {
        let ordinal = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b")
            .map_err(|e| PolishError::Transform(format!("Regex error: {}", e)))?;
        let weekday = Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+")
            .map_err(|e| PolishError::Transform(format!("Regex error: {}", e)))?;
        let spaces = Regex::new(r"\s+")
            .map_err(|e| PolishError::Transform(format!("Regex error: {}", e)))?;

        Ok(Self {
            ordinal,
            weekday,
            spaces,
        })
    }

    /// Parse a cell as a calendar date.
    ///
    /// Native date cells are dates, text is parsed, every other cell type is not a date.
    pub fn cell_date(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(text) => self.parse(text),
            _ => None,
        }
    }

    /// Parse free-form text as a calendar date
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        // Bare digits are IDs and amounts far more often than dates
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return parse_compact(trimmed);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return plausible(dt.date_naive());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
            return plausible(dt.date_naive());
        }

        let normalized = self.normalize(trimmed);

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                if let Some(d) = plausible(dt.date()) {
                    return Some(d);
                }
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(&normalized, fmt) {
                if let Some(d) = plausible(d) {
                    return Some(d);
                }
            }
        }
        None
    }

    /// Strip ordinal suffixes and leading weekdays, collapse whitespace
    fn normalize(&self, text: &str) -> String {
        let without_weekday = self.weekday.replace(text, "");
        let without_ordinals = self.ordinal.replace_all(&without_weekday, "$1");
        self.spaces
            .replace_all(&without_ordinals, " ")
            .trim()
            .to_string()
    }
}

/// Format a date as YYYY-MM-DD
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parse an 8-digit YYYYMMDD string
fn parse_compact(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 {
        return None;
    }
    let year = digits[0..4].parse::<i32>().ok()?;
    let month = digits[4..6].parse::<u32>().ok()?;
    let day = digits[6..8].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(plausible)
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}
