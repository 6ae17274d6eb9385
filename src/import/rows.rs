//! Row-by-row reading shared by every importer
//!
//! A [`RowSource`] hands out rows of raw cells. [`read_table`] turns them
//! into a table: it skips leading lines, reads the header row, applies the
//! blank-row policy and widens the table when a row is longer than any
//! seen so far.

use crate::core::datum::Datum;
use crate::core::texmap::map_text;
use crate::error::DatatoolResult;
use crate::excel::{extract_cell_value, SheetCell};
use crate::import::ProgressReporter;
use crate::settings::{BlankRowPolicy, Settings};
use crate::types::{Column, Table};
use tracing::{debug, trace};

/// A source of raw rows.
pub trait RowSource {
    /// The next row, or `None` once the source is exhausted.
    fn next_row(&mut self) -> DatatoolResult<Option<Vec<SheetCell>>>;

    /// Total number of rows, when known up front.
    fn row_count_hint(&self) -> Option<usize> {
        None
    }

    fn to_datum(&self, cell: &SheetCell, settings: &Settings) -> Datum {
        extract_cell_value(cell, settings)
    }
}

/// Rows held in memory, as read from a worksheet range.
#[derive(Debug)]
pub struct VecRowSource {
    rows: std::vec::IntoIter<Vec<SheetCell>>,
    total: usize,
}

impl VecRowSource {
    pub fn new(rows: Vec<Vec<SheetCell>>) -> Self {
        Self {
            total: rows.len(),
            rows: rows.into_iter(),
        }
    }
}

impl RowSource for VecRowSource {
    fn next_row(&mut self) -> DatatoolResult<Option<Vec<SheetCell>>> {
        Ok(self.rows.next())
    }

    fn row_count_hint(&self) -> Option<usize> {
        Some(self.total)
    }
}

fn is_blank_row(cells: &[SheetCell]) -> bool {
    cells.iter().all(SheetCell::is_blank)
}

/// Read every row of `source` into a new table called `name`.
///
/// `header` builds the column for a 0-based index and optional title; it is
/// also used for columns added when a data row is wider than the header.
pub fn read_table<S, H>(
    source: &mut S,
    name: &str,
    settings: &Settings,
    header: H,
    progress: &dyn ProgressReporter,
) -> DatatoolResult<Table>
where
    S: RowSource + ?Sized,
    H: Fn(usize, Option<&str>) -> Column,
{
    let mut table = Table::new(name);
    let fill = Datum::missing(settings.import_empty_to_null);
    let total = source.row_count_hint();
    let mut consumed = 0usize;
    let mut last_percent = 0u8;

    for _ in 0..settings.skip_lines {
        if source.next_row()?.is_none() {
            debug!(skipped = consumed, "source ended while skipping lines");
            return Ok(table);
        }
        consumed += 1;
    }

    if settings.has_header {
        let Some(cells) = source.next_row()? else {
            return Ok(table);
        };
        consumed += 1;
        for (index, cell) in cells.iter().enumerate() {
            let title = cell.header_text().map(|t| map_text(&t, settings));
            table.add_column(header(index, title.as_deref()), &fill);
        }
    }

    while let Some(cells) = source.next_row()? {
        consumed += 1;

        if is_blank_row(&cells) {
            match settings.blank_rows {
                BlankRowPolicy::Ignore => {
                    trace!(row = consumed, "skipping blank row");
                    continue;
                }
                BlankRowPolicy::End => {
                    debug!(row = consumed, "blank row ends the data");
                    break;
                }
                BlankRowPolicy::EmptyRow => {
                    table.push_row(Vec::new(), &fill)?;
                    continue;
                }
            }
        }

        let mut width = cells.len();
        while width > table.column_count() && cells[width - 1].is_blank() {
            width -= 1;
        }
        while table.column_count() < width {
            let index = table.column_count();
            table.add_column(header(index, None), &fill);
        }

        let row = cells[..width]
            .iter()
            .map(|cell| source.to_datum(cell, settings))
            .collect();
        table.push_row(row, &fill)?;

        if let Some(total) = total.filter(|t| *t > 0) {
            let percent = ((consumed * 100) / total).min(100) as u8;
            if percent != last_percent {
                last_percent = percent;
                progress.percent(percent);
            }
        }
    }

    table.infer_column_types();
    debug!(
        table = name,
        rows = table.row_count(),
        columns = table.column_count(),
        "read table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datum::DatumType;
    use crate::import::NoProgress;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> SheetCell {
        SheetCell::text(s)
    }

    fn read(rows: Vec<Vec<SheetCell>>, settings: &Settings) -> Table {
        let mut source = VecRowSource::new(rows);
        read_table(&mut source, "test", settings, Column::from_header, &NoProgress).unwrap()
    }

    fn scores() -> Vec<Vec<SheetCell>> {
        vec![
            vec![text("Name"), text("Score")],
            vec![text("Alice"), SheetCell::number(90.0)],
            vec![SheetCell::Blank, SheetCell::Blank],
            vec![text("Bob"), SheetCell::Blank],
        ]
    }

    #[test]
    fn test_header_and_data() {
        let settings = Settings {
            import_empty_to_null: true,
            ..Settings::default()
        };
        let table = read(scores(), &settings);

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.columns()[0].key, "Name");
        assert_eq!(table.columns()[1].key, "Score");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 1).unwrap().text(), "90");
        assert!(table.get(1, 1).unwrap().is_null());
        assert_eq!(table.columns()[1].datum_type, DatumType::Integer);
    }

    #[test]
    fn test_blank_row_policies() {
        let settings = Settings {
            blank_rows: BlankRowPolicy::EmptyRow,
            ..Settings::default()
        };
        let table = read(scores(), &settings);
        assert_eq!(table.row_count(), 3);
        assert!(table.get(1, 0).unwrap().is_empty());

        let settings = Settings {
            blank_rows: BlankRowPolicy::End,
            ..Settings::default()
        };
        let table = read(scores(), &settings);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(0, 0).unwrap().text(), "Alice");
    }

    #[test]
    fn test_skip_lines_and_no_header() {
        let settings = Settings {
            skip_lines: 1,
            has_header: false,
            ..Settings::default()
        };
        let table = read(scores(), &settings);
        assert_eq!(table.columns()[0].key, "Column1");
        assert_eq!(table.columns()[1].key, "Column2");
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_wide_row_adds_columns_and_pads() {
        let rows = vec![
            vec![text("A")],
            vec![text("x")],
            vec![text("y"), text("z"), SheetCell::Blank],
        ];
        let table = read(rows, &Settings::default());
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.columns()[1].key, "Column2");
        assert!(table.get(0, 1).unwrap().is_empty());
        assert_eq!(table.get(1, 1).unwrap().text(), "z");
    }

    #[test]
    fn test_blank_header_cells_get_default_keys() {
        let rows = vec![vec![SheetCell::Blank, text("Total")], vec![text("a"), text("b")]];
        let table = read(rows, &Settings::default());
        assert_eq!(table.columns()[0].key, "Column1");
        assert_eq!(table.columns()[1].title, "Total");
    }

    #[test]
    fn test_empty_source() {
        let table = read(Vec::new(), &Settings::default());
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }
}
