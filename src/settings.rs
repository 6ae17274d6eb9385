//! Import/export configuration
//!
//! A [`Settings`] value is built once per operation (defaults, then an
//! optional YAML file, then command-line overrides) and only read afterwards.

use crate::core::locale::{get_locale, NumberLocale, EN_US};
use crate::error::{DatatoolError, DatatoolResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// How a data source's completely blank rows are treated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BlankRowPolicy {
    /// Skip blank rows
    #[default]
    Ignore,
    /// Keep a blank row as a row of empty values
    EmptyRow,
    /// Stop reading at the first blank row
    End,
}

/// Worksheet selection, by 0-based index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetRef {
    Index(usize),
    Name(String),
}

impl FromStr for SheetRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(idx) => SheetRef::Index(idx),
            Err(_) => SheetRef::Name(s.to_string()),
        })
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRef::Index(idx) => write!(f, "{}", idx),
            SheetRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Locale id for number, currency and date handling (`en-US`, `de-DE`, ...)
    pub locale: String,
    /// Recognised currency symbols, matched in this order
    pub currency_symbols: Vec<String>,
    /// Replacement text for characters with special meaning in LaTeX
    pub text_map: BTreeMap<char, String>,
    /// Apply `text_map` to imported text
    pub literal_content: bool,
    pub blank_rows: BlankRowPolicy,
    /// First row after the skipped lines holds column titles
    pub has_header: bool,
    pub skip_lines: usize,
    pub import_empty_to_null: bool,
    pub nulls_first: bool,
    /// Write decimals as `\num{...}`
    pub decimal_sci_macro: bool,
    /// Write dates and times as `\DTLtemporalvalue{...}{...}`
    pub temporal_macro: bool,
    pub date_format: String,
    pub time_format: String,
    pub datetime_format: String,
    pub sheet: Option<SheetRef>,
    /// CSV field separator
    pub separator: char,
    /// CSV quote character
    pub delimiter: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: EN_US.id.to_string(),
            currency_symbols: default_currency_symbols(),
            text_map: default_text_map(),
            literal_content: true,
            blank_rows: BlankRowPolicy::Ignore,
            has_header: true,
            skip_lines: 0,
            import_empty_to_null: false,
            nulls_first: true,
            decimal_sci_macro: false,
            temporal_macro: false,
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M:%S".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            sheet: None,
            separator: ',',
            delimiter: '"',
        }
    }
}

fn default_currency_symbols() -> Vec<String> {
    [
        "\\$",
        "$",
        "\\textdollar",
        "£",
        "\\pounds",
        "\\textsterling",
        "€",
        "\\texteuro",
        "¥",
        "\\textyen",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_text_map() -> BTreeMap<char, String> {
    [
        ('\\', "\\textbackslash "),
        ('$', "\\$"),
        ('#', "\\#"),
        ('%', "\\%"),
        ('&', "\\&"),
        ('_', "\\_"),
        ('{', "\\{"),
        ('}', "\\}"),
        ('~', "\\textasciitilde "),
        ('^', "\\textasciicircum "),
    ]
    .into_iter()
    .map(|(c, s)| (c, s.to_string()))
    .collect()
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> DatatoolResult<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: &Path) -> DatatoolResult<Self> {
        if !path.exists() {
            return Err(DatatoolError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> DatatoolResult<()> {
        if !self.separator.is_ascii() {
            return Err(DatatoolError::Syntax(format!(
                "CSV separator must be a single ASCII character, got '{}'",
                self.separator
            )));
        }
        if !self.delimiter.is_ascii() {
            return Err(DatatoolError::Syntax(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// The configured locale, falling back to `en-US` for unknown ids.
    pub fn number_locale(&self) -> &'static NumberLocale {
        match get_locale(&self.locale) {
            Some(locale) => locale,
            None => {
                warn!(locale = %self.locale, "unknown locale, falling back to en-US");
                &EN_US
            }
        }
    }

    /// Text mapping is active only for literal content with a non-empty map.
    pub fn maps_text(&self) -> bool {
        self.literal_content && !self.text_map.is_empty()
    }
}
