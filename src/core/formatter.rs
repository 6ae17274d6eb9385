//! Typed payload → canonical display text

use crate::core::classifier::latex_symbol;
use crate::core::datum::{Datum, DatumType, Number};
use crate::core::julian::Julian;
use crate::settings::Settings;

/// Build the datum for a known type and payload.
///
/// Temporal types fill in whichever of `number` and `temporal` is missing
/// from the other. Numeric types fall back to the temporal payload's number.
/// A type whose payload cannot be determined yields the null value.
pub fn format(
    datum_type: DatumType,
    currency_symbol: Option<&str>,
    number: Option<Number>,
    temporal: Option<Julian>,
    settings: &Settings,
) -> Datum {
    let locale = settings.number_locale();

    if datum_type.is_temporal() {
        return format_temporal(datum_type, number, temporal, settings);
    }

    let number = number.or_else(|| temporal.map(|t| t.number_for(t.datum_type())));

    match (datum_type, number) {
        (DatumType::Unknown, _) => Datum::null(),
        (DatumType::String, Some(n)) => Datum::string(n.plain()),
        (DatumType::String, None) => Datum::empty(),
        (DatumType::Integer, Some(n)) => {
            let value = n.as_i64();
            Datum::integer(locale.format_integer(value), value)
        }
        (DatumType::Decimal, Some(n)) => {
            let text = if settings.decimal_sci_macro {
                format!("\\num{{{}}}", format_g(n.as_f64()))
            } else {
                locale.format_decimal(&n)
            };
            Datum::decimal(text, n)
        }
        (DatumType::Currency, Some(n)) => {
            let symbol = latex_symbol(currency_symbol.unwrap_or(locale.currency_symbol));
            let text = locale.format_currency(&n, Some(&symbol));
            Datum::currency(text, symbol, n)
        }
        _ => Datum::null(),
    }
}

fn format_temporal(
    datum_type: DatumType,
    number: Option<Number>,
    temporal: Option<Julian>,
    settings: &Settings,
) -> Datum {
    let julian = match temporal {
        Some(julian) => julian,
        None => match number.and_then(|n| Julian::from_number(datum_type, &n)) {
            Some(julian) => julian,
            None => return Datum::null(),
        },
    };
    let number = number.unwrap_or_else(|| julian.number_for(datum_type));

    let text = if settings.temporal_macro {
        format!(
            "\\DTLtemporalvalue{{{}}}{{{}}}",
            number.plain(),
            julian.iso()
        )
    } else {
        let pattern = match datum_type {
            DatumType::Date => &settings.date_format,
            DatumType::Time => &settings.time_format,
            _ => &settings.datetime_format,
        };
        julian.format_with(pattern)
    };

    let mut datum = Datum::temporal(datum_type, text, julian);
    datum.set_number(number);
    datum
}

/// `%g`-style rendering: six significant digits, exponent form outside
/// `1e-4 <= |v| < 1e6`, trailing zeros removed.
pub fn format_g(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let sci = format!("{:.5e}", value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return value.to_string();
    };

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_fraction_zeros(&format!("{:.*}", decimals, value))
    }
}

fn trim_fraction_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}
