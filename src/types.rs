use crate::core::datum::{Datum, DatumType};
use crate::error::{DatatoolError, DatatoolResult};
use std::cmp::Ordering;

//==============================================================================
// Columns
//==============================================================================

/// A column of the database: the key used by `\DTLfetch` and friends, the
/// human-readable title, and the type inferred from its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub title: String,
    pub datum_type: DatumType,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            datum_type: DatumType::Unknown,
        }
    }

    /// Column for the header cell at `index`. Missing or blank titles get the
    /// default `Column<n>` key and title.
    pub fn from_header(index: usize, title: Option<&str>) -> Self {
        match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => {
                let key = sanitize_key(title);
                let key = if key.is_empty() {
                    default_key(index)
                } else {
                    key
                };
                Self::new(key, title)
            }
            None => {
                let key = default_key(index);
                Self::new(key.clone(), key)
            }
        }
    }
}

/// Key for the 0-based column `index`: `Column1`, `Column2`, ...
pub fn default_key(index: usize) -> String {
    format!("Column{}", index + 1)
}

/// Reduce a title to characters that are safe in a column key.
pub fn sanitize_key(title: &str) -> String {
    title
        .trim()
        .replace(char::is_whitespace, "_")
        .replace('&', "and")
        .replace('-', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

//==============================================================================
// Tables
//==============================================================================

/// An in-memory database: ordered columns and rectangular rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Datum>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Datum>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Datum> {
        self.rows.get(row)?.get(column)
    }

    /// Append a column, giving every existing row a copy of `fill`.
    /// Duplicate keys are made unique with a numeric suffix.
    pub fn add_column(&mut self, mut column: Column, fill: &Datum) {
        column.key = self.unique_key(&column.key);
        self.columns.push(column);
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }

    fn unique_key(&self, key: &str) -> String {
        if self.column_index(key).is_none() {
            return key.to_string();
        }
        (2..)
            .map(|n| format!("{}{}", key, n))
            .find(|candidate| self.column_index(candidate).is_none())
            .unwrap_or_else(|| key.to_string())
    }

    /// Append a row, padding it with `fill` up to the column count.
    pub fn push_row(&mut self, mut row: Vec<Datum>, fill: &Datum) -> DatatoolResult<()> {
        if row.len() > self.columns.len() {
            return Err(DatatoolError::Edit(format!(
                "Row has {} values but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        row.resize(self.columns.len(), fill.clone());
        self.rows.push(row);
        Ok(())
    }

    pub fn insert_row(&mut self, index: usize, row: Vec<Datum>) -> DatatoolResult<()> {
        if index > self.rows.len() {
            return Err(DatatoolError::Edit(format!(
                "Row index {} out of range (0..={})",
                index,
                self.rows.len()
            )));
        }
        if row.len() != self.columns.len() {
            return Err(DatatoolError::Edit(format!(
                "Row has {} values, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.insert(index, row);
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> DatatoolResult<Vec<Datum>> {
        if index >= self.rows.len() {
            return Err(DatatoolError::Edit(format!(
                "Row index {} out of range ({} rows)",
                index,
                self.rows.len()
            )));
        }
        Ok(self.rows.remove(index))
    }

    /// Insert a column with one value per existing row.
    pub fn insert_column(
        &mut self,
        index: usize,
        column: Column,
        cells: Vec<Datum>,
    ) -> DatatoolResult<()> {
        if index > self.columns.len() {
            return Err(DatatoolError::Edit(format!(
                "Column index {} out of range (0..={})",
                index,
                self.columns.len()
            )));
        }
        if cells.len() != self.rows.len() {
            return Err(DatatoolError::Edit(format!(
                "Column has {} values, expected {}",
                cells.len(),
                self.rows.len()
            )));
        }
        if self.column_index(&column.key).is_some() {
            return Err(DatatoolError::Edit(format!(
                "Duplicate column key '{}'",
                column.key
            )));
        }
        self.columns.insert(index, column);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.insert(index, cell);
        }
        Ok(())
    }

    pub fn remove_column(&mut self, index: usize) -> DatatoolResult<(Column, Vec<Datum>)> {
        if index >= self.columns.len() {
            return Err(DatatoolError::Edit(format!(
                "Column index {} out of range ({} columns)",
                index,
                self.columns.len()
            )));
        }
        let column = self.columns.remove(index);
        let cells = self.rows.iter_mut().map(|row| row.remove(index)).collect();
        Ok((column, cells))
    }

    /// Replace a cell, returning the previous value.
    pub fn set(&mut self, row: usize, column: usize, datum: Datum) -> DatatoolResult<Datum> {
        let (rows, cols) = (self.rows.len(), self.columns.len());
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| {
                DatatoolError::Edit(format!(
                    "Cell ({}, {}) out of range ({} rows, {} columns)",
                    row, column, rows, cols
                ))
            })?;
        Ok(std::mem::replace(cell, datum))
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &Datum> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Set every column's type from the values it holds.
    pub fn infer_column_types(&mut self) {
        for idx in 0..self.columns.len() {
            let datum_type = self
                .column_values(idx)
                .filter(|d| !d.is_null() && !d.is_empty())
                .fold(DatumType::Unknown, |acc, d| widen(acc, d.datum_type()));
            self.columns[idx].datum_type = datum_type;
        }
    }

    /// Stable sort of the rows on one column.
    pub fn sort_rows(&mut self, column: usize, descending: bool, nulls_first: bool) {
        self.rows.sort_by(|a, b| {
            let (Some(x), Some(y)) = (a.get(column), b.get(column)) else {
                return Ordering::Equal;
            };
            let ord = x.compare(y, nulls_first);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    /// Check the rectangular invariant.
    pub fn validate_shape(&self) -> Result<(), String> {
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(format!(
                    "Row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    self.columns.len()
                ));
            }
        }
        Ok(())
    }
}

/// Narrowest type that can hold values of both types.
pub fn widen(current: DatumType, next: DatumType) -> DatumType {
    use DatumType::*;

    fn numeric_rank(t: DatumType) -> u8 {
        match t {
            DatumType::Integer => 1,
            DatumType::Decimal => 2,
            _ => 3,
        }
    }

    match (current, next) {
        (Unknown, t) | (t, Unknown) => t,
        (a, b) if a == b => a,
        (Date, DateTime) | (DateTime, Date) => DateTime,
        (a, b) if a.is_temporal() || b.is_temporal() => String,
        (String, _) | (_, String) => String,
        (a, b) => {
            if numeric_rank(a) >= numeric_rank(b) {
                a
            } else {
                b
            }
        }
    }
}
