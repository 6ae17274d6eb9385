//! Spreadsheet cell → typed value
//!
//! Spreadsheet cells carry a native type and, for numbers, a number-format
//! code. The format code decides whether a number is shown as currency, a
//! date, a time, or a plain integer/decimal.

use crate::core::datum::{Datum, DatumType, Number};
use crate::core::formatter;
use crate::core::texmap::{apply_text_map, map_text};
use crate::settings::Settings;
use chrono::{NaiveDate, NaiveDateTime};

/// Largest integer TeX can hold in a count register.
pub const TEX_MAX_INT: i64 = 2_147_483_647;

/// A cell as read from a workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    /// Number or formula result, with the cell's number-format code
    Numeric { value: f64, format: Option<String> },
    Text(String),
    Boolean(bool),
    Blank,
    /// Error value such as `#DIV/0!`
    Error(String),
}

impl SheetCell {
    pub fn number(value: f64) -> Self {
        SheetCell::Numeric {
            value,
            format: None,
        }
    }

    pub fn formatted(value: f64, format: impl Into<String>) -> Self {
        SheetCell::Numeric {
            value,
            format: Some(format.into()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        SheetCell::Text(text.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SheetCell::Blank => true,
            SheetCell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text used when the cell is a column header.
    pub fn header_text(&self) -> Option<String> {
        match self {
            SheetCell::Blank => None,
            SheetCell::Text(s) if s.is_empty() => None,
            SheetCell::Text(s) | SheetCell::Error(s) => Some(s.clone()),
            SheetCell::Numeric { value, .. } => Some(Number::Real(*value).plain()),
            SheetCell::Boolean(b) => Some(boolean_text(*b).to_string()),
        }
    }
}

fn boolean_text(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// What a number-format code says about the value it formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatKind {
    Currency(String),
    DateTime,
    Date,
    Time,
    General,
}

/// Classify a number-format code.
///
/// Currency is either a bare symbol (`$ € £ ¥`) outside quoted literals or a
/// bracket token `[$<symbol>-<lcid>]`; locale-only tokens such as `[$-409]`
/// are not currency. Dates have a `yy` token, times an `h` token.
pub fn classify_format(code: &str) -> FormatKind {
    let scan = scan_format(code);

    if let Some(symbol) = scan.currency {
        return FormatKind::Currency(symbol);
    }

    let lower = scan.tokens.to_ascii_lowercase();
    let has_year = lower.contains("yy");
    let has_hour = lower.contains('h');
    match (has_year, has_hour) {
        (true, true) => FormatKind::DateTime,
        (true, false) => FormatKind::Date,
        (false, true) => FormatKind::Time,
        (false, false) => FormatKind::General,
    }
}

struct FormatScan {
    /// Format characters outside quotes, escapes and non-elapsed brackets
    tokens: String,
    currency: Option<String>,
}

fn scan_format(code: &str) -> FormatScan {
    let mut tokens = String::new();
    let mut currency = None;
    let mut chars = code.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut content = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    content.push(c);
                }
                if let Some(symbol) = bracket_currency(&content) {
                    currency.get_or_insert(symbol);
                } else if is_elapsed_token(&content) {
                    tokens.push_str(&content);
                }
            }
            '$' | '€' | '£' | '¥' => {
                currency.get_or_insert_with(|| ch.to_string());
            }
            _ => tokens.push(ch),
        }
    }

    FormatScan { tokens, currency }
}

/// `$€-407` → `€`; `$-409` (locale only) → none.
fn bracket_currency(content: &str) -> Option<String> {
    let after = content.trim().strip_prefix('$')?;
    let symbol = match after.rsplit_once('-') {
        Some((symbol, _lcid)) => symbol,
        None => after,
    };
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_string())
    }
}

/// Elapsed-time tokens such as `[h]`, `[mm]`, `[ss]`.
fn is_elapsed_token(content: &str) -> bool {
    !content.is_empty()
        && content
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'h' | 'm' | 's'))
}

/// Convert a 1900-system serial number to a calendar date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

/// Extract the typed value of one spreadsheet cell.
pub fn extract_cell_value(cell: &SheetCell, settings: &Settings) -> Datum {
    match cell {
        SheetCell::Numeric { value, format } => extract_numeric(*value, format.as_deref(), settings),
        SheetCell::Text(text) if text.is_empty() => Datum::missing(settings.import_empty_to_null),
        SheetCell::Text(text) => Datum::string(map_text(text, settings)),
        SheetCell::Boolean(b) => Datum::integer(boolean_text(*b), i64::from(*b)),
        SheetCell::Blank => Datum::missing(settings.import_empty_to_null),
        SheetCell::Error(code) => Datum::string(map_text(code, settings)),
    }
}

fn extract_numeric(value: f64, format: Option<&str>, settings: &Settings) -> Datum {
    let kind = format.map(classify_format).unwrap_or(FormatKind::General);

    match kind {
        FormatKind::Currency(symbol) if settings.maps_text() => formatter::format(
            DatumType::Currency,
            Some(&apply_text_map(&symbol, settings)),
            Some(Number::Real(value)),
            None,
            settings,
        ),
        // symbol kept exactly as the number format writes it
        FormatKind::Currency(symbol) => {
            let number = Number::Real(value);
            let text = settings
                .number_locale()
                .format_currency(&number, Some(&symbol));
            Datum::currency(text, symbol, number)
        }
        FormatKind::DateTime => calendar_string(value, &settings.datetime_format, settings),
        FormatKind::Date => calendar_string(value, &settings.date_format, settings),
        FormatKind::Time => calendar_string(value, &settings.time_format, settings),
        FormatKind::General => plain_number(value, settings),
    }
}

fn calendar_string(serial: f64, pattern: &str, settings: &Settings) -> Datum {
    match excel_serial_to_datetime(serial) {
        Some(datetime) => Datum::string(datetime.format(pattern).to_string()),
        None => plain_number(serial, settings),
    }
}

fn plain_number(value: f64, settings: &Settings) -> Datum {
    if value.fract() == 0.0 && value.abs() <= TEX_MAX_INT as f64 {
        formatter::format(
            DatumType::Integer,
            None,
            Some(Number::Integer(value as i64)),
            None,
            settings,
        )
    } else {
        formatter::format(DatumType::Decimal, None, Some(Number::Real(value)), None, settings)
    }
}
