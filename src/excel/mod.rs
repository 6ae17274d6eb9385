//! Spreadsheet import/export
//!
//! - Import: workbook (.xlsx, .xls, .ods) → table, through calamine
//! - Export: table → .xlsx, through rust_xlsxwriter
//! - Cell adapter: spreadsheet cell + number format → typed value

pub mod cell;
mod exporter;
mod importer;

pub use cell::{extract_cell_value, SheetCell};
pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
