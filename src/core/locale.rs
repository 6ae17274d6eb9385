//! Locale-sensitive number and currency parsing and rendering
//!
//! Only the pieces the classifier and formatter need are modelled: decimal
//! and grouping separators, and the currency symbol with its position.

use crate::core::datum::Number;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub id: &'static str,
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
    pub currency_symbol: &'static str,
    /// Symbol written before the number (`$1.00`) rather than after (`1,00 €`)
    pub currency_prefix: bool,
    /// Space between symbol and number
    pub currency_space: bool,
}

pub static EN_US: NumberLocale = NumberLocale {
    id: "en-US",
    decimal_separator: '.',
    thousands_separator: Some(','),
    currency_symbol: "$",
    currency_prefix: true,
    currency_space: false,
};

pub static EN_GB: NumberLocale = NumberLocale {
    id: "en-GB",
    decimal_separator: '.',
    thousands_separator: Some(','),
    currency_symbol: "£",
    currency_prefix: true,
    currency_space: false,
};

pub static DE_DE: NumberLocale = NumberLocale {
    id: "de-DE",
    decimal_separator: ',',
    thousands_separator: Some('.'),
    currency_symbol: "€",
    currency_prefix: false,
    currency_space: true,
};

/// French uses U+00A0 NO-BREAK SPACE for grouping.
pub static FR_FR: NumberLocale = NumberLocale {
    id: "fr-FR",
    decimal_separator: ',',
    thousands_separator: Some('\u{a0}'),
    currency_symbol: "€",
    currency_prefix: false,
    currency_space: true,
};

pub static ES_ES: NumberLocale = NumberLocale {
    id: "es-ES",
    decimal_separator: ',',
    thousands_separator: Some('.'),
    currency_symbol: "€",
    currency_prefix: false,
    currency_space: true,
};

pub static IT_IT: NumberLocale = NumberLocale {
    id: "it-IT",
    decimal_separator: ',',
    thousands_separator: Some('.'),
    currency_symbol: "€",
    currency_prefix: false,
    currency_space: true,
};

/// Swiss German (`'` grouping, `.` decimal).
pub static DE_CH: NumberLocale = NumberLocale {
    id: "de-CH",
    decimal_separator: '.',
    thousands_separator: Some('\''),
    currency_symbol: "CHF",
    currency_prefix: true,
    currency_space: true,
};

static LOCALES: [&NumberLocale; 7] = [&EN_US, &EN_GB, &DE_DE, &FR_FR, &ES_ES, &IT_IT, &DE_CH];

/// Look up a locale by id. Accepts `en-US`, `en_US` and any letter case.
pub fn get_locale(id: &str) -> Option<&'static NumberLocale> {
    let wanted = id.trim().replace('_', "-");
    LOCALES
        .iter()
        .copied()
        .find(|locale| locale.id.eq_ignore_ascii_case(&wanted))
}

impl NumberLocale {
    fn is_grouping(&self, ch: char) -> bool {
        match self.thousands_separator {
            Some('\u{a0}') => matches!(ch, '\u{a0}' | '\u{202f}' | ' '),
            Some(sep) => ch == sep,
            None => false,
        }
    }

    /// Parse an unsigned number that must consume all of `text`.
    ///
    /// Grouping separators are only accepted between digits in groups of
    /// three. A decimal separator makes the result a decimal even when the
    /// fraction is zero.
    pub fn parse_number(&self, text: &str) -> Option<Number> {
        let (int_part, frac_part) = match text.split_once(self.decimal_separator) {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (text, None),
        };

        let digits = self.strip_grouping(int_part)?;
        if digits.is_empty() && frac_part.is_none() {
            return None;
        }

        match frac_part {
            Some(frac) => {
                if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let int_digits = if digits.is_empty() { "0" } else { digits.as_str() };
                let plain = format!("{}.{}", int_digits, frac);
                match Decimal::from_str(&plain) {
                    Ok(d) => Some(Number::Decimal(d)),
                    Err(_) => plain.parse::<f64>().ok().map(Number::Real),
                }
            }
            None => match digits.parse::<i64>() {
                Ok(i) => Some(Number::Integer(i)),
                Err(_) => match Decimal::from_str(&digits) {
                    Ok(d) => Some(Number::Decimal(d)),
                    Err(_) => digits.parse::<f64>().ok().map(Number::Real),
                },
            },
        }
    }

    /// Validate the integer part and drop its grouping separators.
    fn strip_grouping(&self, int_part: &str) -> Option<String> {
        let groups: Vec<&str> = int_part.split(|c| self.is_grouping(c)).collect();
        for (idx, group) in groups.iter().enumerate() {
            if !group.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            if groups.len() > 1 {
                let ok = if idx == 0 {
                    (1..=3).contains(&group.len())
                } else {
                    group.len() == 3
                };
                if !ok {
                    return None;
                }
            }
        }
        Some(groups.concat())
    }

    /// Parse text written in this locale's currency format, for example
    /// `$1,234.50`, `-$3.00` or `1.234,50 €`.
    pub fn parse_currency(&self, text: &str) -> Option<Number> {
        let (negative, rest) = split_sign(text);
        let body = if self.currency_prefix {
            rest.strip_prefix(self.currency_symbol)?.trim_start()
        } else {
            rest.strip_suffix(self.currency_symbol)?.trim_end()
        };
        let number = self.parse_number(body)?;
        Some(if negative { number.negate() } else { number })
    }

    /// Insert grouping separators and the locale decimal separator into a
    /// plain rendering such as `-1234.5`.
    pub fn localize_plain(&self, plain: &str) -> String {
        let (negative, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, plain),
        };
        if !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return plain.to_string();
        }
        let (int_digits, frac_digits) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };

        let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
        if negative {
            out.push('-');
        }
        out.push_str(&self.group_digits(int_digits));
        if let Some(frac) = frac_digits {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    fn group_digits(&self, digits: &str) -> String {
        let Some(sep) = self.thousands_separator else {
            return digits.to_string();
        };
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }

    pub fn format_integer(&self, value: i64) -> String {
        self.localize_plain(&value.to_string())
    }

    /// Decimal rendering with at least one fraction digit.
    pub fn format_decimal(&self, value: &Number) -> String {
        let mut plain = value.plain();
        let finite = match value {
            Number::Real(r) => r.is_finite(),
            _ => true,
        };
        if finite && !plain.contains('.') {
            plain.push_str(".0");
        }
        self.localize_plain(&plain)
    }

    /// Currency rendering with two fraction digits. `symbol` replaces the
    /// locale's own symbol when given.
    pub fn format_currency(&self, value: &Number, symbol: Option<&str>) -> String {
        let amount = value.as_f64();
        let plain = format!("{:.2}", amount.abs());
        let body = self.localize_plain(&plain);
        let symbol = symbol.unwrap_or(self.currency_symbol);
        let space = if self.currency_space { " " } else { "" };
        let sign = if amount < 0.0 && plain.chars().any(|c| matches!(c, '1'..='9')) {
            "-"
        } else {
            ""
        };
        if self.currency_prefix {
            format!("{}{}{}{}", sign, symbol, space, body)
        } else {
            format!("{}{}{}{}", sign, body, space, symbol)
        }
    }
}

/// Split an optional leading `+` or `-`.
pub(crate) fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}
