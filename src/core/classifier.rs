//! Raw text → typed value
//!
//! Rules are tried in a fixed order and the first one that matches decides
//! the type: scientific notation, temporal literal, locale currency, then a
//! currency-symbol-prefixed or plain locale number. Anything else is a string.

use crate::core::datum::{Datum, Number, NULL_VALUE};
use crate::core::julian::Julian;
use crate::core::locale::split_sign;
use crate::core::texmap::strip_empty_comment;
use crate::settings::Settings;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

fn scientific_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)[eE][+-]?\d+$").ok())
        .as_ref()
}

/// Classify `raw` into the most specific type it can be read as.
pub fn classify(raw: &str, settings: &Settings) -> Datum {
    let text = strip_empty_comment(raw);

    if text.is_empty() {
        return Datum::empty();
    }

    if text == NULL_VALUE {
        return Datum::null();
    }

    if let Some(number) = parse_scientific(text) {
        return Datum::decimal(text, number);
    }

    if let Some(julian) = parse_temporal(text, settings) {
        return Datum::temporal(julian.datum_type(), text, julian);
    }

    let locale = settings.number_locale();
    if let Some(number) = locale.parse_currency(text) {
        return Datum::currency(text, latex_symbol(locale.currency_symbol), number);
    }

    parse_prefixed_number(text, settings).unwrap_or_else(|| Datum::string(text))
}

/// Exact decimal for scientific notation, or a double when the value is
/// outside the exact decimal range.
pub fn parse_scientific(text: &str) -> Option<Number> {
    if !scientific_pattern()?.is_match(text) {
        return None;
    }
    let (negative, unsigned) = split_sign(text);
    // `1.e5`: the mantissa may end in a bare decimal point
    let mantissa_end = unsigned.find(['e', 'E']).unwrap_or(unsigned.len());
    let unsigned = match unsigned[..mantissa_end].strip_suffix('.') {
        Some(mantissa) => format!("{}{}", mantissa, &unsigned[mantissa_end..]),
        None => unsigned.to_string(),
    };
    match Decimal::from_scientific(&unsigned) {
        Ok(d) => Some(Number::Decimal(if negative { -d } else { d })),
        Err(_) => text.parse::<f64>().ok().map(Number::Real),
    }
}

/// ISO 8601 literals first, then the configured patterns.
pub fn parse_temporal(text: &str, settings: &Settings) -> Option<Julian> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(Julian::from_datetime_with_offset(datetime));
    }

    let datetime_formats = ISO_DATETIME_FORMATS
        .iter()
        .copied()
        .chain(std::iter::once(settings.datetime_format.as_str()));
    for pattern in datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(Julian::from_datetime(datetime));
        }
    }

    for pattern in [ISO_DATE_FORMAT, settings.date_format.as_str()] {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return Some(Julian::from_date(date));
        }
    }

    let time_formats = ISO_TIME_FORMATS
        .iter()
        .copied()
        .chain(std::iter::once(settings.time_format.as_str()));
    for pattern in time_formats {
        if let Ok(time) = NaiveTime::parse_from_str(text, pattern) {
            return Some(Julian::from_time(time));
        }
    }

    None
}

/// Optional sign, optional configured currency symbol, then a locale number
/// that must consume the rest of the text. Locales that write the symbol
/// after the amount also accept a configured symbol as a suffix.
fn parse_prefixed_number(text: &str, settings: &Settings) -> Option<Datum> {
    let locale = settings.number_locale();
    let (negative, rest) = split_sign(text);
    let matched = match_currency_symbol(rest, &settings.currency_symbols).or_else(|| {
        if locale.currency_prefix {
            None
        } else {
            match_currency_suffix(rest, &settings.currency_symbols)
        }
    });
    let (symbol, body) = match matched {
        Some((symbol, body)) => (Some(symbol), body),
        None => (None, rest),
    };

    let mut number = locale.parse_number(body)?;
    if negative {
        number = number.negate();
    }

    Some(match symbol {
        Some(symbol) => Datum::currency(text, latex_symbol(symbol), number),
        None => Datum::numeric(text, number),
    })
}

/// First configured symbol that prefixes `text`, in configuration order.
/// Control-word symbols (`\pounds`) also swallow the whitespace after them.
fn match_currency_symbol<'a>(text: &'a str, symbols: &'a [String]) -> Option<(&'a str, &'a str)> {
    symbols
        .iter()
        .filter(|symbol| !symbol.is_empty())
        .find_map(|symbol| {
            let rest = text.strip_prefix(symbol.as_str())?;
            if is_control_word(symbol) {
                if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return None;
                }
                Some((symbol.as_str(), rest.trim_start()))
            } else {
                Some((symbol.as_str(), rest))
            }
        })
}

/// First configured symbol that ends `text`, in configuration order, with
/// the space before it removed.
fn match_currency_suffix<'a>(text: &'a str, symbols: &'a [String]) -> Option<(&'a str, &'a str)> {
    symbols
        .iter()
        .filter(|symbol| !symbol.is_empty())
        .find_map(|symbol| {
            let rest = text.strip_suffix(symbol.as_str())?;
            Some((symbol.as_str(), rest.trim_end()))
        })
}

fn is_control_word(symbol: &str) -> bool {
    symbol
        .strip_prefix('\\')
        .is_some_and(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Escape the bare dollar sign so the symbol is safe in LaTeX.
pub fn latex_symbol(symbol: &str) -> String {
    if symbol == "$" {
        "\\$".to_string()
    } else {
        symbol.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datum::DatumType;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_empty_and_null() {
        let datum = classify("", &settings());
        assert_eq!(datum.datum_type(), DatumType::String);
        assert!(datum.is_empty());

        assert!(classify(NULL_VALUE, &settings()).is_null());
    }

    #[test]
    fn test_trailing_comment_stripped_before_classifying() {
        let datum = classify("42%", &settings());
        assert_eq!(datum.datum_type(), DatumType::Integer);
        assert_eq!(datum.text(), "42");
    }

    #[test]
    fn test_scientific_is_decimal() {
        let datum = classify("1.5e3", &settings());
        assert_eq!(datum.datum_type(), DatumType::Decimal);
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(1500, 0))));

        let datum = classify("-2E-2", &settings());
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(-2, 2))));
    }

    #[test]
    fn test_scientific_mantissa_with_trailing_point() {
        let datum = classify("1.e5", &settings());
        assert_eq!(datum.datum_type(), DatumType::Decimal);
        assert_eq!(datum.text(), "1.e5");
        assert_eq!(datum.number().map(|n| n.as_f64()), Some(100000.0));

        let datum = classify("-2.E-1", &settings());
        assert_eq!(datum.number().map(|n| n.as_f64()), Some(-0.2));
    }

    #[test]
    fn test_scientific_out_of_decimal_range_uses_double() {
        let datum = classify("1e300", &settings());
        assert_eq!(datum.datum_type(), DatumType::Decimal);
        assert_eq!(datum.number(), Some(Number::Real(1e300)));
    }

    #[test]
    fn test_temporal_literals() {
        assert_eq!(classify("2024-03-05", &settings()).datum_type(), DatumType::Date);
        assert_eq!(classify("14:30", &settings()).datum_type(), DatumType::Time);
        assert_eq!(
            classify("2024-03-05T14:30:00", &settings()).datum_type(),
            DatumType::DateTime
        );
        let datum = classify("2024-03-05T14:30:00+02:00", &settings());
        assert_eq!(datum.datum_type(), DatumType::DateTime);
        assert_eq!(datum.temporal_value().unwrap().offset_minutes(), Some(120));
    }

    #[test]
    fn test_locale_currency_escapes_dollar() {
        let datum = classify("$1,234.50", &settings());
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("\\$"));
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(123450, 2))));
        assert_eq!(datum.text(), "$1,234.50");
    }

    #[test]
    fn test_configured_symbol_prefix() {
        let datum = classify("€12.50", &settings());
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("€"));

        let datum = classify("-\\pounds 3", &settings());
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("\\pounds"));
        assert_eq!(datum.number(), Some(Number::Integer(-3)));
    }

    #[test]
    fn test_control_word_needs_word_boundary() {
        let datum = classify("\\poundsign 3", &settings());
        assert_eq!(datum.datum_type(), DatumType::String);
    }

    #[test]
    fn test_symbol_order_is_configuration_order() {
        let settings = Settings {
            currency_symbols: vec!["US".into(), "US$".into()],
            ..Settings::default()
        };
        // "US" wins and leaves "$5" which is not a number
        let datum = classify("US$5", &settings);
        assert_eq!(datum.datum_type(), DatumType::String);

        let settings = Settings {
            currency_symbols: vec!["US$".into(), "US".into()],
            ..Settings::default()
        };
        let datum = classify("US$5", &settings);
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("US$"));
    }

    #[test]
    fn test_plain_numbers() {
        let datum = classify("-1,234", &settings());
        assert_eq!(datum.datum_type(), DatumType::Integer);
        assert_eq!(datum.number(), Some(Number::Integer(-1234)));

        let datum = classify("3.25", &settings());
        assert_eq!(datum.datum_type(), DatumType::Decimal);
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(325, 2))));
    }

    #[test]
    fn test_trailing_garbage_is_string() {
        let datum = classify("12 apples", &settings());
        assert_eq!(datum.datum_type(), DatumType::String);
        assert_eq!(datum.text(), "12 apples");
        assert!(datum.number().is_none());

        assert_eq!(classify("€", &settings()).datum_type(), DatumType::String);
        assert_eq!(classify("-", &settings()).datum_type(), DatumType::String);
    }

    #[test]
    fn test_german_locale() {
        let settings = Settings {
            locale: "de-DE".into(),
            ..Settings::default()
        };
        let datum = classify("1.234,5", &settings);
        assert_eq!(datum.datum_type(), DatumType::Decimal);
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(12345, 1))));

        let datum = classify("5,00 €", &settings);
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("€"));
    }

    #[test]
    fn test_suffix_symbol_in_suffix_locale() {
        let settings = Settings {
            locale: "de-DE".into(),
            ..Settings::default()
        };
        let datum = classify("12,50 £", &settings);
        assert_eq!(datum.datum_type(), DatumType::Currency);
        assert_eq!(datum.currency_symbol(), Some("£"));
        assert_eq!(datum.number(), Some(Number::Decimal(Decimal::new(1250, 2))));

        let datum = classify("-3 \\pounds", &settings);
        assert_eq!(datum.currency_symbol(), Some("\\pounds"));
        assert_eq!(datum.number(), Some(Number::Integer(-3)));

        // prefix locales keep the symbol in front
        assert_eq!(classify("12.50 £", &Settings::default()).datum_type(), DatumType::String);
    }
}
