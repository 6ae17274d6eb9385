//! Workbook importer - xlsx/xls/ods → table

use crate::error::{DatatoolError, DatatoolResult};
use crate::excel::cell::SheetCell;
use crate::import::rows::{read_table, VecRowSource};
use crate::import::{table_name_for, ImportFormat, Importer, ProgressReporter};
use crate::settings::{Settings, SheetRef};
use crate::types::{Column, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Imports one worksheet of a spreadsheet workbook.
pub struct ExcelImporter {
    path: PathBuf,
    format: ImportFormat,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P, format: ImportFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    /// Names of the worksheets in the workbook, in workbook order.
    pub fn sheet_names(&self) -> DatatoolResult<Vec<String>> {
        if !self.path.exists() {
            return Err(DatatoolError::FileNotFound(self.path.clone()));
        }
        let workbook =
            open_workbook_auto(&self.path).map_err(|e| DatatoolError::import(&self.path, e))?;
        Ok(workbook.sheet_names().to_vec())
    }

    fn read_workbook(
        &self,
        settings: &Settings,
        progress: &dyn ProgressReporter,
    ) -> DatatoolResult<Table> {
        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| DatatoolError::import(&self.path, e))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = resolve_sheet(&sheet_names, settings.sheet.as_ref())?;
        debug!(sheet = %sheet_name, available = sheet_names.len(), "resolved worksheet");
        progress.message(&format!("Reading sheet '{}'", sheet_name));

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| DatatoolError::import(&self.path, e))?;

        let mut source = VecRowSource::new(range_to_rows(&range));
        let name = table_name_for(&self.path);
        read_table(&mut source, &name, settings, Column::from_header, progress)
    }
}

impl Importer for ExcelImporter {
    fn format(&self) -> ImportFormat {
        self.format
    }

    fn source(&self) -> &Path {
        &self.path
    }

    fn import_data(
        &self,
        settings: &Settings,
        progress: &dyn ProgressReporter,
    ) -> DatatoolResult<Table> {
        if !self.path.exists() {
            return Err(DatatoolError::FileNotFound(self.path.clone()));
        }
        info!(path = %self.path.display(), format = %self.format, "importing workbook");
        progress.message(&format!("Opening {}", self.path.display()));

        self.read_workbook(settings, progress)
            .map_err(|e| e.into_import(&self.path))
    }
}

/// The worksheet named by `sheet`, or the first one.
pub fn resolve_sheet(names: &[String], sheet: Option<&SheetRef>) -> DatatoolResult<String> {
    let found = match sheet {
        None => names.first(),
        Some(SheetRef::Index(index)) => names.get(*index),
        Some(SheetRef::Name(name)) => names
            .iter()
            .find(|n| *n == name)
            .or_else(|| names.iter().find(|n| n.eq_ignore_ascii_case(name))),
    };

    found.cloned().ok_or_else(|| {
        DatatoolError::SheetNotFound(match sheet {
            Some(sheet) => sheet.to_string(),
            None => "workbook has no worksheets".to_string(),
        })
    })
}

/// Rows of a worksheet range, starting at its first populated row. Columns
/// before the range start come back blank so column positions match the
/// sheet.
pub fn range_to_rows(range: &Range<Data>) -> Vec<Vec<SheetCell>> {
    let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);

    range
        .rows()
        .map(|row| {
            let mut cells = vec![SheetCell::Blank; col_offset];
            cells.extend(row.iter().map(data_to_cell));
            cells
        })
        .collect()
}

/// Date-time cells lose their number format when read; give them one that
/// matches their value.
fn date_format_for(serial: f64, is_duration: bool) -> &'static str {
    if is_duration {
        "[h]:mm:ss"
    } else if serial.fract() == 0.0 {
        "yyyy-mm-dd"
    } else if serial < 1.0 {
        "hh:mm:ss"
    } else {
        "yyyy-mm-dd hh:mm:ss"
    }
}

fn data_to_cell(data: &Data) -> SheetCell {
    match data {
        Data::Empty => SheetCell::Blank,
        Data::String(s) => SheetCell::Text(s.clone()),
        Data::Float(f) => SheetCell::number(*f),
        Data::Int(i) => SheetCell::number(*i as f64),
        Data::Bool(b) => SheetCell::Boolean(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            SheetCell::formatted(serial, date_format_for(serial, dt.is_duration()))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
        Data::Error(e) => SheetCell::Error(e.to_string()),
        #[allow(unreachable_patterns)]
        other => SheetCell::Text(other.to_string()),
    }
}
