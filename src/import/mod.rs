//! Import formats and the importer factory
//!
//! Every source format is read through the [`Importer`] trait. Delimited
//! text goes through [`CsvImporter`]; workbooks (xlsx, xls, ods) go through
//! [`crate::excel::ExcelImporter`].

mod delimited;
pub mod rows;

pub use delimited::CsvImporter;
pub use rows::{read_table, RowSource, VecRowSource};

use crate::error::{DatatoolError, DatatoolResult};
use crate::excel::ExcelImporter;
use crate::settings::Settings;
use crate::types::Table;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportFormat {
    Csv,
    Tsv,
    /// Office Open XML workbook (.xlsx, .xlsm, .xlsb)
    Xlsx,
    /// Legacy binary workbook
    Xls,
    /// OpenDocument spreadsheet
    Ods,
}

impl ImportFormat {
    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> DatatoolResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                DatatoolError::UnsupportedFormat(format!(
                    "cannot determine format of '{}' (no extension)",
                    path.display()
                ))
            })?;

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xlsb" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "ods" => Ok(Self::Ods),
            other => Err(DatatoolError::UnsupportedFormat(format!(
                "'.{}' files are not supported",
                other
            ))),
        }
    }

    pub fn is_spreadsheet(self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls | Self::Ods)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Ods => "ods",
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImportFormat {
    type Err = DatatoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "ods" | "opendocument" => Ok(Self::Ods),
            other => Err(DatatoolError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Receives progress from a running import.
pub trait ProgressReporter {
    fn message(&self, message: &str);

    /// Percentage of the source read so far, 0 to 100.
    fn percent(&self, percent: u8);
}

/// Progress sink for synchronous imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn message(&self, _message: &str) {}

    fn percent(&self, _percent: u8) {}
}

/// Reads one source into a table.
pub trait Importer: Send {
    fn format(&self) -> ImportFormat;

    fn source(&self) -> &Path;

    fn import_data(
        &self,
        settings: &Settings,
        progress: &dyn ProgressReporter,
    ) -> DatatoolResult<Table>;
}

/// Importer for `format` reading from `path`.
pub fn importer_for(format: ImportFormat, path: &Path) -> Box<dyn Importer> {
    match format {
        ImportFormat::Csv => Box::new(CsvImporter::new(path)),
        ImportFormat::Tsv => Box::new(CsvImporter::tsv(path)),
        ImportFormat::Xlsx | ImportFormat::Xls | ImportFormat::Ods => {
            Box::new(ExcelImporter::new(path, format))
        }
    }
}

/// Import `path` synchronously, guessing the format from the extension
/// unless one is given.
pub fn import_file(
    path: &Path,
    format: Option<ImportFormat>,
    settings: &Settings,
) -> DatatoolResult<Table> {
    let format = match format {
        Some(format) => format,
        None => ImportFormat::from_path(path)?,
    };
    importer_for(format, path).import_data(settings, &NoProgress)
}

/// Database name derived from the file stem: `Q1 Sales.xlsx` → `Q1Sales`.
pub fn table_name_for(path: &Path) -> String {
    let name: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        "untitled".to_string()
    } else {
        name
    }
}
