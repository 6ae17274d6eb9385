//! Workbook exporter - table → .xlsx

use crate::core::datum::{Datum, DatumType};
use crate::error::{DatatoolError, DatatoolResult};
use crate::types::Table;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

/// Julian day number of the 1900-system epoch (1899-12-30).
const EXCEL_EPOCH_JDN: f64 = 2_415_019.0;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Writes a table to a single worksheet: titles in the first row, one row
/// per record. Numbers, currency and temporal values stay numeric with a
/// matching number format; nulls are left blank.
pub struct ExcelExporter<'a> {
    table: &'a Table,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    /// Export the table to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> DatatoolResult<()> {
        if self.table.row_count() + 1 > MAX_ROWS || self.table.column_count() > MAX_COLUMNS {
            return Err(DatatoolError::Export(format!(
                "Table '{}' is too large for a worksheet ({} rows, {} columns)",
                self.table.name,
                self.table.row_count(),
                self.table.column_count()
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(worksheet_name(&self.table.name))
            .map_err(|e| DatatoolError::Export(format!("Failed to name worksheet: {}", e)))?;

        self.write_table(worksheet)?;

        workbook
            .save(output_path)
            .map_err(|e| DatatoolError::Export(format!("Failed to save workbook: {}", e)))?;
        info!(path = %output_path.display(), rows = self.table.row_count(), "exported workbook");
        Ok(())
    }

    fn write_table(&self, worksheet: &mut Worksheet) -> DatatoolResult<()> {
        let header_format = Format::new().set_bold();
        for (col, column) in self.table.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, &column.title, &header_format)
                .map_err(|e| DatatoolError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in self.table.rows().iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col, datum) in row.iter().enumerate() {
                write_datum(worksheet, excel_row, col as u16, datum).map_err(|e| {
                    DatatoolError::Export(format!(
                        "Failed to write row {}, column {}: {}",
                        row_idx + 1,
                        col + 1,
                        e
                    ))
                })?;
            }
        }
        Ok(())
    }
}

fn write_datum(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    datum: &Datum,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    if datum.is_null() || datum.is_empty() {
        return Ok(());
    }

    let number = datum.number().map(|n| n.as_f64());
    match (datum.datum_type(), number) {
        (DatumType::Integer | DatumType::Decimal, Some(value)) => {
            worksheet.write_number(row, col, value)?;
        }
        (DatumType::Currency, Some(value)) => {
            let code = currency_format(datum.currency_symbol().unwrap_or("$"));
            worksheet.write_number_with_format(row, col, value, &Format::new().set_num_format(code))?;
        }
        (t, _) if t.is_temporal() => match temporal_serial(datum) {
            Some(serial) => {
                let code = match t {
                    DatumType::Date => "yyyy-mm-dd",
                    DatumType::Time => "hh:mm:ss",
                    _ => "yyyy-mm-dd hh:mm:ss",
                };
                worksheet.write_number_with_format(
                    row,
                    col,
                    serial,
                    &Format::new().set_num_format(code),
                )?;
            }
            None => {
                worksheet.write_string(row, col, datum.text())?;
            }
        },
        _ => {
            worksheet.write_string(row, col, datum.text())?;
        }
    }
    Ok(())
}

/// 1900-system serial for a temporal value.
fn temporal_serial(datum: &Datum) -> Option<f64> {
    let julian = datum.temporal_value()?;
    let time = julian.time_fraction().unwrap_or(0.0);
    match julian.julian_day() {
        Some(day) => Some(day as f64 - EXCEL_EPOCH_JDN + time),
        None => julian.time_fraction(),
    }
}

/// Number format for a currency symbol, which may be a LaTeX command.
pub fn currency_format(symbol: &str) -> String {
    let symbol = match symbol {
        "\\$" | "\\textdollar" => "$",
        "\\pounds" | "\\textsterling" => "£",
        "\\texteuro" => "€",
        "\\textyen" => "¥",
        other => other,
    };
    match symbol {
        "$" | "£" | "€" | "¥" => format!("{}#,##0.00", symbol),
        other => format!("[${}] #,##0.00", other),
    }
}

/// Worksheet names are at most 31 characters and exclude `[]:*?/\`.
fn worksheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
