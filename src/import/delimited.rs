//! Delimited text (CSV/TSV) importer

use crate::core::classifier::classify;
use crate::core::datum::Datum;
use crate::core::texmap::map_text;
use crate::error::{DatatoolError, DatatoolResult};
use crate::excel::SheetCell;
use crate::import::rows::{read_table, RowSource};
use crate::import::{table_name_for, ImportFormat, Importer, ProgressReporter};
use crate::settings::Settings;
use crate::types::{Column, Table};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads a CSV or TSV file. Fields are classified from their text.
pub struct CsvImporter {
    path: PathBuf,
    format: ImportFormat,
}

impl CsvImporter {
    /// Comma (or the configured separator) delimited.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: ImportFormat::Csv,
        }
    }

    /// Tab delimited, whatever the configured separator.
    pub fn tsv<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: ImportFormat::Tsv,
        }
    }

    fn separator(&self, settings: &Settings) -> u8 {
        match self.format {
            ImportFormat::Tsv => b'\t',
            _ => settings.separator as u8,
        }
    }

    /// Read delimited text from any reader.
    pub fn read_from<R: Read>(
        &self,
        mut reader: R,
        name: &str,
        settings: &Settings,
        progress: &dyn ProgressReporter,
    ) -> DatatoolResult<Table> {
        settings.validate()?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let quote = settings.delimiter as u8;
        let mut blank_lines = blank_lines_before_records(&data, quote);
        // blank lines ahead of the first record are not rows
        if let Some(first) = blank_lines.first_mut() {
            *first = 0;
        }

        let records = ReaderBuilder::new()
            .delimiter(self.separator(settings))
            .quote(quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice())
            .into_records();

        let mut source = CsvRowSource {
            records,
            blank_lines: blank_lines.into_iter(),
            pending_blank: 0,
            held: None,
        };
        read_table(&mut source, name, settings, Column::from_header, progress)
    }
}

impl Importer for CsvImporter {
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
        info!(path = %self.path.display(), format = %self.format, "importing delimited text");
        progress.message(&format!("Reading {}", self.path.display()));

        let file = File::open(&self.path).map_err(|e| DatatoolError::import(&self.path, e))?;
        let name = table_name_for(&self.path);
        self.read_from(file, &name, settings, progress)
            .map_err(|e| e.into_import(&self.path))
    }
}

/// Number of empty lines in front of each record.
///
/// The csv reader skips empty lines, so they are found here by walking the
/// raw lines. A line is inside a quoted field while an odd number of quote
/// characters has been seen since the record started.
fn blank_lines_before_records(data: &[u8], quote: u8) -> Vec<usize> {
    let mut counts = Vec::new();
    let mut blank = 0;
    let mut in_quotes = false;
    for line in data.split(|b| *b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if !in_quotes {
            if line.is_empty() {
                blank += 1;
                continue;
            }
            counts.push(blank);
            blank = 0;
        }
        if line.iter().filter(|b| **b == quote).count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }
    counts
}

struct CsvRowSource<R> {
    records: StringRecordsIntoIter<R>,
    blank_lines: std::vec::IntoIter<usize>,
    /// Empty rows still owed before `held`
    pending_blank: usize,
    held: Option<StringRecord>,
}

fn record_cells(record: &StringRecord) -> Vec<SheetCell> {
    record
        .iter()
        .map(|field| {
            if field.is_empty() {
                SheetCell::Blank
            } else {
                SheetCell::text(field)
            }
        })
        .collect()
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn next_row(&mut self) -> DatatoolResult<Option<Vec<SheetCell>>> {
        if self.pending_blank > 0 {
            self.pending_blank -= 1;
            return Ok(Some(Vec::new()));
        }
        if let Some(record) = self.held.take() {
            return Ok(Some(record_cells(&record)));
        }

        let Some(record) = self.records.next().transpose()? else {
            return Ok(None);
        };
        let blank = self.blank_lines.next().unwrap_or(0);
        if blank > 0 {
            self.pending_blank = blank - 1;
            self.held = Some(record);
            return Ok(Some(Vec::new()));
        }
        Ok(Some(record_cells(&record)))
    }

    /// Text fields are mapped first so that a literal `%` or `$` survives
    /// classification.
    fn to_datum(&self, cell: &SheetCell, settings: &Settings) -> Datum {
        match cell {
            SheetCell::Text(field) => classify(&map_text(field, settings), settings),
            SheetCell::Blank => Datum::missing(settings.import_empty_to_null),
            other => crate::excel::extract_cell_value(other, settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datum::{DatumType, Number};
    use crate::import::NoProgress;
    use crate::settings::BlankRowPolicy;
    use pretty_assertions::assert_eq;

    fn read(data: &str, settings: &Settings) -> Table {
        CsvImporter::new("test.csv")
            .read_from(data.as_bytes(), "test", settings, &NoProgress)
            .unwrap()
    }

    #[test]
    fn test_classifies_fields() {
        let table = read(
            "Item,Qty,Price,When\nPens,1200,$3.50,2024-03-05\n",
            &Settings::default(),
        );
        let row = &table.rows()[0];
        assert_eq!(row[0].datum_type(), DatumType::String);
        assert_eq!(row[1].datum_type(), DatumType::Integer);
        assert_eq!(row[1].number(), Some(Number::Integer(1200)));
        assert_eq!(row[2].datum_type(), DatumType::Currency);
        assert_eq!(row[2].currency_symbol(), Some("\\$"));
        assert_eq!(row[2].text(), "\\$3.50");
        assert_eq!(row[3].datum_type(), DatumType::Date);
    }

    #[test]
    fn test_literal_percent_is_kept() {
        let table = read("Rate\n50%\n", &Settings::default());
        let datum = &table.rows()[0][0];
        assert_eq!(datum.datum_type(), DatumType::String);
        assert_eq!(datum.text(), "50\\%");
    }

    #[test]
    fn test_quoted_fields_and_empty_to_null() {
        let settings = Settings {
            import_empty_to_null: true,
            ..Settings::default()
        };
        let table = read("A,B\n\"x, y\",\n", &settings);
        assert_eq!(table.rows()[0][0].text(), "x, y");
        assert!(table.rows()[0][1].is_null());
    }

    #[test]
    fn test_custom_separator_and_tsv() {
        let settings = Settings {
            separator: ';',
            ..Settings::default()
        };
        let table = read("A;B\n1;2\n", &settings);
        assert_eq!(table.column_count(), 2);

        let table = CsvImporter::tsv("test.tsv")
            .read_from("A\tB\n1\t2\n".as_bytes(), "test", &Settings::default(), &NoProgress)
            .unwrap();
        assert_eq!(table.get(0, 1).unwrap().number(), Some(Number::Integer(2)));
    }

    #[test]
    fn test_separator_only_row_is_blank() {
        let table = read("A,B\n1,2\n,\n3,4\n", &Settings::default());
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_line_ends_data() {
        let settings = Settings {
            blank_rows: BlankRowPolicy::End,
            ..Settings::default()
        };
        let table = read("H\nA\n\nB\n", &settings);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(0, 0).unwrap().text(), "A");
    }

    #[test]
    fn test_empty_line_becomes_empty_row() {
        let settings = Settings {
            blank_rows: BlankRowPolicy::EmptyRow,
            ..Settings::default()
        };
        let table = read("H\nA\n\n\r\nB\n", &settings);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.get(0, 0).unwrap().text(), "A");
        assert!(table.get(1, 0).unwrap().is_empty());
        assert!(table.get(2, 0).unwrap().is_empty());
        assert_eq!(table.get(3, 0).unwrap().text(), "B");

        let table = read("H\nA\n\nB\n", &Settings::default());
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_line_inside_quotes_is_not_blank() {
        assert_eq!(blank_lines_before_records(b"\nH\n\"a\n\nb\"\n\nC\n", b'"'), vec![1, 0, 1]);

        let settings = Settings {
            blank_rows: BlankRowPolicy::End,
            ..Settings::default()
        };
        let table = read("H\n\"a\n\nb\"\nC\n", &settings);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, 0).unwrap().text(), "C");
    }

    #[test]
    fn test_missing_file() {
        let err = CsvImporter::new("/nonexistent/data.csv")
            .import_data(&Settings::default(), &NoProgress)
            .unwrap_err();
        assert!(matches!(err, DatatoolError::FileNotFound(_)));
    }
}
