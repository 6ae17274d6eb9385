//! CLI command handlers

pub mod commands;

pub use commands::{classify, import, inspect};

use crate::error::DatatoolResult;
use crate::import::ImportFormat;
use crate::settings::{BlankRowPolicy, Settings, SheetRef};
use clap::Args;
use std::path::{Path, PathBuf};

/// Options shared by every command that reads a data source.
#[derive(Args, Debug, Clone, Default)]
pub struct ImportArgs {
    /// Input format (default: guessed from the file extension)
    #[arg(short, long, value_enum)]
    pub format: Option<ImportFormat>,

    /// Worksheet to read, by 0-based index or name (default: first sheet)
    #[arg(long)]
    pub sheet: Option<SheetRef>,

    /// The first row is data, not column titles
    #[arg(long)]
    pub no_header: bool,

    /// Number of leading rows to skip before the header
    #[arg(long, value_name = "N")]
    pub skip_lines: Option<usize>,

    /// What to do with completely blank rows
    #[arg(long, value_enum, value_name = "POLICY")]
    pub blank_rows: Option<BlankRowPolicy>,

    /// Import empty cells as null instead of empty strings
    #[arg(long)]
    pub empty_to_null: bool,

    /// Treat cell text as literal content and escape LaTeX special characters
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub literal: Option<bool>,

    /// Number locale (en-US, en-GB, de-DE, fr-FR, es-ES, it-IT, de-CH)
    #[arg(long, value_name = "ID")]
    pub locale: Option<String>,

    /// YAML settings file; command-line options override it
    #[arg(long, value_name = "FILE", env = "DATATOOLTK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Database name (default: derived from the input file name)
    #[arg(long)]
    pub name: Option<String>,
}

impl ImportArgs {
    /// Defaults, then the settings file, then command-line overrides.
    pub fn settings(&self) -> DatatoolResult<Settings> {
        let base = match &self.settings {
            Some(path) => Settings::from_yaml_file(path)?,
            None => Settings::default(),
        };

        let settings = Settings {
            sheet: self.sheet.clone().or(base.sheet.clone()),
            has_header: base.has_header && !self.no_header,
            skip_lines: self.skip_lines.unwrap_or(base.skip_lines),
            blank_rows: self.blank_rows.unwrap_or(base.blank_rows),
            import_empty_to_null: base.import_empty_to_null || self.empty_to_null,
            literal_content: self.literal.unwrap_or(base.literal_content),
            locale: self.locale.clone().unwrap_or_else(|| base.locale.clone()),
            ..base
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn resolve_format(&self, input: &Path) -> DatatoolResult<ImportFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => ImportFormat::from_path(input),
        }
    }
}
