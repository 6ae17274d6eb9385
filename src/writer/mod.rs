//! Table writers
//!
//! - DTLTEX 3.0: the datatool database format that LaTeX loads with
//!   `\DTLread`
//! - CSV/TSV: display text of every cell
//! - XLSX: delegated to [`crate::excel::ExcelExporter`]

use crate::error::{DatatoolError, DatatoolResult};
use crate::excel::ExcelExporter;
use crate::types::Table;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Output formats, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dtltex,
    Csv,
    Tsv,
    Xlsx,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> DatatoolResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "dtltex" | "tex" => Ok(Self::Dtltex),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DatatoolError::UnsupportedFormat(format!(
                "cannot write '{}' (extension '{}')",
                path.display(),
                other
            ))),
        }
    }
}

/// Write `table` to `path` in the format its extension names.
pub fn save_table(table: &Table, path: &Path) -> DatatoolResult<()> {
    let format = ExportFormat::from_path(path)?;
    info!(path = %path.display(), ?format, "saving table");

    match format {
        ExportFormat::Xlsx => ExcelExporter::new(table).export(path),
        ExportFormat::Dtltex => write_to_file(path, |out| write_dtltex(table, out)),
        ExportFormat::Csv => write_to_file(path, |out| write_csv(table, out, b',', true)),
        ExportFormat::Tsv => write_to_file(path, |out| write_csv(table, out, b'\t', true)),
    }
}

fn write_to_file<F>(path: &Path, write: F) -> DatatoolResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> DatatoolResult<()>,
{
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Write the table as a DTLTEX 3.0 database. Null cells get no entry.
pub fn write_dtltex<W: Write>(table: &Table, out: &mut W) -> DatatoolResult<()> {
    let name = &table.name;

    writeln!(out, "% DTLTEX 3.0 UTF-8")?;
    writeln!(out, "\\DTLdbProvideData{{{}}}%", name)?;

    for row in table.rows() {
        writeln!(out, "\\DTLdbNewRow")?;
        for (column, datum) in table.columns().iter().zip(row) {
            if datum.is_null() {
                continue;
            }
            writeln!(out, "\\DTLdbNewEntry{{{}}}{{{}}}%", column.key, datum.text())?;
        }
    }

    for column in table.columns() {
        writeln!(out, "\\DTLdbSetHeader{{{}}}{{{}}}%", column.key, column.title)?;
    }

    writeln!(out, "\\def\\dtllastloadeddb{{{}}}", name)?;
    Ok(())
}

/// Write display texts as delimited text. Null cells are written empty.
pub fn write_csv<W: Write>(
    table: &Table,
    out: &mut W,
    separator: u8,
    with_header: bool,
) -> DatatoolResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(separator)
        .from_writer(out);

    if with_header {
        writer.write_record(table.columns().iter().map(|c| c.title.as_str()))?;
    }
    for row in table.rows() {
        writer.write_record(
            row.iter()
                .map(|datum| if datum.is_null() { "" } else { datum.text() }),
        )?;
    }
    writer.flush()?;
    Ok(())
}
