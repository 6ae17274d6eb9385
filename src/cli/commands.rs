use crate::cli::ImportArgs;
use crate::core::classifier;
use crate::core::datum::DatumType;
use crate::error::DatatoolResult;
use crate::excel::ExcelImporter;
use crate::import::{import_file, importer_for};
use crate::settings::Settings;
use crate::types::Table;
use crate::worker::{ImportTask, Progress};
use crate::writer::save_table;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

fn colored_type(datum_type: DatumType) -> ColoredString {
    let name = datum_type.name();
    match datum_type {
        DatumType::Integer | DatumType::Decimal => name.bright_blue(),
        DatumType::Currency => name.bright_green(),
        DatumType::Date | DatumType::Time | DatumType::DateTime => name.bright_magenta(),
        DatumType::String => name.normal(),
        DatumType::Unknown => name.dimmed(),
    }
}

/// Execute the import command
pub fn import(
    input: PathBuf,
    output: PathBuf,
    args: &ImportArgs,
    verbose: bool,
) -> DatatoolResult<()> {
    println!("{}", "📥 datatooltk - Import".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let settings = Arc::new(args.settings()?);
    let format = args.resolve_format(&input)?;

    let task = ImportTask::spawn(importer_for(format, &input), Arc::clone(&settings));
    while let Some(event) = task.next_progress() {
        if !verbose {
            continue;
        }
        match event {
            Progress::Message(message) => println!("{}", format!("   {}", message).cyan()),
            Progress::Percent(100) => println!("   {}", "100%".bold()),
            Progress::Percent(_) => {}
        }
    }
    let mut table = task.join()?;

    if let Some(name) = &args.name {
        table.name = name.clone();
    }

    if verbose {
        println!(
            "\n   📊 Database: {} ({} columns, {} rows)",
            table.name.bright_blue(),
            table.column_count(),
            table.row_count()
        );
    }

    save_table(&table, &output)?;

    println!("{}", "✅ Import Complete!".bold().green());
    println!("   Written: {}\n", output.display());
    Ok(())
}

/// Execute the inspect command
pub fn inspect(input: PathBuf, args: &ImportArgs, rows: usize) -> DatatoolResult<()> {
    println!("{}", "🔍 datatooltk - Inspect".bold().green());
    println!("   File: {}\n", input.display());

    let settings = args.settings()?;
    let format = args.resolve_format(&input)?;

    if format.is_spreadsheet() {
        let sheets = ExcelImporter::new(&input, format).sheet_names()?;
        println!("   Sheets: {}", sheets.join(", ").bright_blue());
    }

    let mut table = import_file(&input, Some(format), &settings)?;
    if let Some(name) = &args.name {
        table.name = name.clone();
    }

    println!("   Database: {}", table.name.bold());
    println!(
        "   {} columns, {} rows\n",
        table.column_count(),
        table.row_count()
    );

    for column in table.columns() {
        println!(
            "   {:<20} {:<10} {}",
            column.key.bright_yellow(),
            colored_type(column.datum_type),
            column.title
        );
    }

    print_preview(&table, rows);
    Ok(())
}

fn print_preview(table: &Table, rows: usize) {
    if rows == 0 || table.row_count() == 0 {
        return;
    }
    println!();
    for row in table.rows().iter().take(rows) {
        let cells: Vec<String> = row
            .iter()
            .map(|datum| {
                if datum.is_null() {
                    "NULL".dimmed().to_string()
                } else {
                    datum.text().to_string()
                }
            })
            .collect();
        println!("   {}", cells.join(" | "));
    }
    if table.row_count() > rows {
        println!("   {}", format!("... {} more rows", table.row_count() - rows).dimmed());
    }
}

/// Execute the classify command
pub fn classify(
    values: Vec<String>,
    locale: Option<String>,
    settings_file: Option<PathBuf>,
) -> DatatoolResult<()> {
    let base = match settings_file {
        Some(path) => Settings::from_yaml_file(&path)?,
        None => Settings::default(),
    };
    let settings = Settings {
        locale: locale.unwrap_or_else(|| base.locale.clone()),
        ..base
    };

    for value in &values {
        let datum = classifier::classify(value, &settings);
        let number = datum
            .number()
            .map(|n| n.plain())
            .unwrap_or_else(|| "-".to_string());
        let symbol = datum.currency_symbol().unwrap_or("-");
        println!(
            "{:<10} {:<24} number={} symbol={}",
            colored_type(datum.datum_type()),
            datum.text(),
            number,
            symbol
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportFormat;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_import_csv_to_dtltex() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("scores.csv");
        let output = dir.path().join("scores.dtltex");
        fs::write(&input, "Name,Score\nAlice,90\nBob,85\n").unwrap();

        import(input, output.clone(), &ImportArgs::default(), false).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("% DTLTEX 3.0 UTF-8\n"));
        assert!(written.contains("\\DTLdbNewEntry{Score}{85}%"));
        assert!(written.contains("\\def\\dtllastloadeddb{scores}"));
    }

    #[test]
    fn test_import_renames_database() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("data.csv");
        let output = dir.path().join("out.dtltex");
        fs::write(&input, "A\n1\n").unwrap();

        let args = ImportArgs {
            name: Some("mydb".to_string()),
            format: Some(ImportFormat::Csv),
            ..ImportArgs::default()
        };
        import(input, output.clone(), &args, true).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("\\DTLdbProvideData{mydb}%"));
    }

    #[test]
    fn test_import_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let err = import(
            dir.path().join("missing.csv"),
            dir.path().join("out.dtltex"),
            &ImportArgs::default(),
            false,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    }

    #[test]
    fn test_inspect_and_classify_run() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, "A,B\n1,x\n").unwrap();

        inspect(input, &ImportArgs::default(), 5).unwrap();
        classify(vec!["$5".into(), "2024-01-01".into()], None, None).unwrap();
    }
}
