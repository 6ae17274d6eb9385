//! Typed cell values
//!
//! A [`Datum`] pairs the display text written to the LaTeX database with the
//! semantic type inferred (or assigned) for it, plus the numeric, currency and
//! temporal payloads that type requires.

use crate::core::julian::Julian;
use crate::core::{classifier, formatter};
use crate::settings::Settings;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// Display text marking a logically absent value.
pub const NULL_VALUE: &str = "\\@dtlnovalue";

/// Semantic type of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumType {
    /// Null marker
    Unknown,
    String,
    Integer,
    Decimal,
    Currency,
    Date,
    Time,
    DateTime,
}

impl DatumType {
    /// Integer, decimal or currency.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DatumType::Integer | DatumType::Decimal | DatumType::Currency
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, DatumType::Date | DatumType::Time | DatumType::DateTime)
    }

    pub fn name(self) -> &'static str {
        match self {
            DatumType::Unknown => "unknown",
            DatumType::String => "string",
            DatumType::Integer => "integer",
            DatumType::Decimal => "decimal",
            DatumType::Currency => "currency",
            DatumType::Date => "date",
            DatumType::Time => "time",
            DatumType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for DatumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric payload of a datum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    /// Exact decimal, as parsed from text
    Decimal(Decimal),
    /// Double, as read from a spreadsheet cell
    Real(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            Number::Real(r) => *r,
        }
    }

    /// Integer part, truncated toward zero.
    pub fn as_i64(&self) -> i64 {
        match self {
            Number::Integer(i) => *i,
            Number::Decimal(d) => d.trunc().to_i64().unwrap_or(0),
            Number::Real(r) => r.trunc() as i64,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Number::Integer(i) => match i.checked_neg() {
                Some(n) => Number::Integer(n),
                None => Number::Real(-(i as f64)),
            },
            Number::Decimal(d) => Number::Decimal(-d),
            Number::Real(r) => Number::Real(-r),
        }
    }

    /// Compare magnitudes, exactly when both sides allow it.
    pub fn compare(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a.cmp(b),
            (Number::Decimal(a), Number::Decimal(b)) => a.cmp(b),
            (Number::Integer(a), Number::Decimal(b)) => Decimal::from(*a).cmp(b),
            (Number::Decimal(a), Number::Integer(b)) => a.cmp(&Decimal::from(*b)),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }

    /// Plain rendering without grouping: `-1234.5`.
    pub fn plain(&self) -> String {
        match self {
            Number::Integer(i) => i.to_string(),
            Number::Decimal(d) => d.normalize().to_string(),
            Number::Real(r) => r.to_string(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain())
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    datum_type: DatumType,
    text: String,
    number: Option<Number>,
    currency_symbol: Option<String>,
    temporal: Option<Julian>,
}

impl Default for Datum {
    fn default() -> Self {
        Self::null()
    }
}

impl Datum {
    /// The null value.
    pub fn null() -> Self {
        Self {
            datum_type: DatumType::Unknown,
            text: NULL_VALUE.to_string(),
            number: None,
            currency_symbol: None,
            temporal: None,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self {
            datum_type: DatumType::String,
            text: text.into(),
            number: None,
            currency_symbol: None,
            temporal: None,
        }
    }

    /// Empty string value (not null).
    pub fn empty() -> Self {
        Self::string(String::new())
    }

    /// Null or empty string, as an import's "empty to null" policy dictates.
    pub fn missing(empty_to_null: bool) -> Self {
        if empty_to_null {
            Self::null()
        } else {
            Self::empty()
        }
    }

    pub fn integer(text: impl Into<String>, value: i64) -> Self {
        Self {
            datum_type: DatumType::Integer,
            text: text.into(),
            number: Some(Number::Integer(value)),
            currency_symbol: None,
            temporal: None,
        }
    }

    pub fn decimal(text: impl Into<String>, value: Number) -> Self {
        Self {
            datum_type: DatumType::Decimal,
            text: text.into(),
            number: Some(value),
            currency_symbol: None,
            temporal: None,
        }
    }

    /// A plain number: integer payloads become INTEGER, anything else DECIMAL.
    pub fn numeric(text: impl Into<String>, value: Number) -> Self {
        match value {
            Number::Integer(i) => Self::integer(text, i),
            other => Self::decimal(text, other),
        }
    }

    pub fn currency(text: impl Into<String>, symbol: impl Into<String>, value: Number) -> Self {
        Self {
            datum_type: DatumType::Currency,
            text: text.into(),
            number: Some(value),
            currency_symbol: Some(symbol.into()),
            temporal: None,
        }
    }

    /// A date, time or date-time; the numeric value is derived from `julian`.
    pub fn temporal(datum_type: DatumType, text: impl Into<String>, julian: Julian) -> Self {
        debug_assert!(datum_type.is_temporal());
        Self {
            datum_type,
            text: text.into(),
            number: Some(julian.number_for(datum_type)),
            currency_symbol: None,
            temporal: Some(julian),
        }
    }

    pub fn datum_type(&self) -> DatumType {
        self.datum_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn number(&self) -> Option<Number> {
        self.number
    }

    pub fn currency_symbol(&self) -> Option<&str> {
        self.currency_symbol.as_deref()
    }

    pub fn temporal_value(&self) -> Option<&Julian> {
        self.temporal.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.text == NULL_VALUE
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_number(&mut self, number: Number) {
        self.number = Some(number);
    }

    pub fn set_currency_symbol(&mut self, symbol: impl Into<String>) {
        self.currency_symbol = Some(symbol.into());
    }

    pub fn set_temporal_value(&mut self, julian: Julian) {
        self.temporal = Some(julian);
    }

    /// Re-render this value as `new_type`.
    ///
    /// Values with no numeric or temporal payload are reclassified from their
    /// text first; text that cannot be read as a number stays as it is.
    pub fn reformat(&mut self, new_type: DatumType, settings: &Settings) {
        match new_type {
            DatumType::Unknown => *self = Self::null(),
            DatumType::String => {
                self.datum_type = DatumType::String;
                self.number = None;
                self.currency_symbol = None;
                self.temporal = None;
            }
            _ if self.is_null() => {}
            _ => {
                let source = if self.number.is_some() || self.temporal.is_some() {
                    self.clone()
                } else {
                    classifier::classify(&self.text, settings)
                };
                if source.number.is_none() && source.temporal.is_none() {
                    return;
                }
                *self = formatter::format(
                    new_type,
                    source.currency_symbol.as_deref(),
                    source.number,
                    source.temporal,
                    settings,
                );
            }
        }
    }

    /// Ordering used when sorting a column.
    pub fn compare(&self, other: &Datum, nulls_first: bool) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => {
                return if nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                return if nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => {}
        }

        if let (Some(a), Some(b)) = (&self.temporal, &other.temporal) {
            return a.timestamp().total_cmp(&b.timestamp());
        }

        if self.datum_type.is_numeric() && other.datum_type.is_numeric() {
            if let (Some(a), Some(b)) = (&self.number, &other.number) {
                let ord = a.compare(b);
                if ord == Ordering::Equal
                    && self.datum_type == DatumType::Currency
                    && other.datum_type == DatumType::Currency
                {
                    return self.currency_symbol.cmp(&other.currency_symbol);
                }
                return ord;
            }
        }

        collate(&self.text, &other.text)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Case-insensitive primary ordering with a case-sensitive tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}
