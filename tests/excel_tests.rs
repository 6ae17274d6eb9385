//! Workbook import/export tests
//!
//! Workbooks are written with rust_xlsxwriter into a temp directory and read
//! back through the calamine-based importer.

use datatooltk::core::{DatumType, Number};
use datatooltk::error::DatatoolError;
use datatooltk::excel::{ExcelExporter, ExcelImporter};
use datatooltk::import::{import_file, ImportFormat, Importer, NoProgress};
use datatooltk::settings::{BlankRowPolicy, Settings, SheetRef};
use datatooltk::Table;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Name/Score sheet: Alice 90, a blank row, then Bob with no score.
fn write_scores(dir: &Path) -> PathBuf {
    let path = dir.join("scores.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Scores").unwrap();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Score").unwrap();
    sheet.write_string(1, 0, "Alice").unwrap();
    sheet.write_string(1, 1, "90").unwrap();
    sheet.write_string(3, 0, "Bob").unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Typed").unwrap();
    other.write_string(0, 0, "When").unwrap();
    other.write_string(0, 1, "Count").unwrap();
    other.write_string(0, 2, "Done").unwrap();
    other
        .write_number_with_format(1, 0, 45356.0, &Format::new().set_num_format("yyyy-mm-dd"))
        .unwrap();
    other.write_number(1, 1, 42.0).unwrap();
    other.write_boolean(1, 2, true).unwrap();

    workbook.save(&path).unwrap();
    path
}

fn import(path: &Path, settings: &Settings) -> Result<Table, DatatoolError> {
    ExcelImporter::new(path, ImportFormat::Xlsx).import_data(settings, &NoProgress)
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_scores_with_empty_to_null() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());
    let settings = Settings {
        import_empty_to_null: true,
        ..Settings::default()
    };

    let table = import(&path, &settings).unwrap();

    assert_eq!(table.name, "scores");
    assert_eq!(table.column_count(), 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.columns()[0].key, "Name");
    assert_eq!(table.get(0, 1).unwrap().text(), "90");
    assert_eq!(table.get(1, 0).unwrap().text(), "Bob");

    let missing = table.get(1, 1).unwrap();
    assert!(missing.is_null());
    assert!(!missing.is_empty());
}

#[test]
fn test_blank_row_policies_on_workbook() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());

    let settings = Settings {
        blank_rows: BlankRowPolicy::End,
        ..Settings::default()
    };
    assert_eq!(import(&path, &settings).unwrap().row_count(), 1);

    let settings = Settings {
        blank_rows: BlankRowPolicy::EmptyRow,
        ..Settings::default()
    };
    let table = import(&path, &settings).unwrap();
    assert_eq!(table.row_count(), 3);
    assert!(table.get(1, 0).unwrap().is_empty());
}

#[test]
fn test_header_on_second_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("offset.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(1, 0, "Name").unwrap();
    sheet.write_string(1, 1, "Score").unwrap();
    sheet.write_string(2, 0, "Alice").unwrap();
    sheet.write_number(2, 1, 90.0).unwrap();
    workbook.save(&path).unwrap();

    let table = import(&path, &Settings::default()).unwrap();
    let keys: Vec<&str> = table.columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["Name", "Score"]);
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.get(0, 1).unwrap().number(), Some(Number::Integer(90)));
}

#[test]
fn test_typed_cells_from_second_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());
    let settings = Settings {
        sheet: Some(SheetRef::Name("Typed".into())),
        ..Settings::default()
    };

    let table = import(&path, &settings).unwrap();
    let row = &table.rows()[0];

    assert_eq!(row[0].datum_type(), DatumType::String);
    assert_eq!(row[0].text(), "2024-03-05");
    assert_eq!(row[1].datum_type(), DatumType::Integer);
    assert_eq!(row[1].number(), Some(Number::Integer(42)));
    assert_eq!(row[2].text(), "TRUE");
    assert_eq!(row[2].number(), Some(Number::Integer(1)));
}

#[test]
fn test_sheet_by_index() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());
    let settings = Settings {
        sheet: Some(SheetRef::Index(1)),
        ..Settings::default()
    };
    let table = import(&path, &settings).unwrap();
    assert_eq!(table.columns()[0].key, "When");
}

#[test]
fn test_sheet_names() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());
    let names = ExcelImporter::new(&path, ImportFormat::Xlsx).sheet_names().unwrap();
    assert_eq!(names, vec!["Scores".to_string(), "Typed".to_string()]);
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_scores(dir.path());
    let settings = Settings {
        sheet: Some(SheetRef::Name("Budget".into())),
        ..Settings::default()
    };
    let err = import(&path, &settings).unwrap_err();
    assert!(matches!(err, DatatoolError::SheetNotFound(_)));
}

#[test]
fn test_corrupt_workbook_is_import_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let err = import(&path, &Settings::default()).unwrap_err();
    match err {
        DatatoolError::Import { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected import error, got {:?}", other),
    }
}

#[test]
fn test_missing_workbook_is_reported_before_parsing() {
    let err = import(Path::new("/nonexistent/scores.xlsx"), &Settings::default()).unwrap_err();
    assert!(matches!(err, DatatoolError::FileNotFound(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_then_import() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("sales.csv");
    std::fs::write(&csv, "Item,Qty,Price,Sold\nPens,1200,$3.50,2024-03-05\nInk,,$12.00,2024-03-06\n")
        .unwrap();

    let table = import_file(&csv, None, &Settings::default()).unwrap();
    let xlsx = dir.path().join("sales.xlsx");
    ExcelExporter::new(&table).export(&xlsx).unwrap();

    let back = import(&xlsx, &Settings::default()).unwrap();
    assert_eq!(back.column_count(), 4);
    assert_eq!(back.row_count(), 2);
    assert_eq!(back.columns()[3].title, "Sold");
    assert_eq!(back.get(0, 0).unwrap().text(), "Pens");
    assert_eq!(back.get(0, 1).unwrap().number(), Some(Number::Integer(1200)));
    assert_eq!(back.get(0, 3).unwrap().text(), "2024-03-05");
    assert!(back.get(1, 1).unwrap().is_empty());
}
