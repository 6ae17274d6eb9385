//! Undo/redo for table edits
//!
//! Every change to a table is an [`Edit`]. Applying an edit returns the edit
//! that reverses it, so the history only stores inverses: undoing pops an
//! inverse, applies it, and pushes *its* inverse onto the redo stack.

use crate::core::datum::Datum;
use crate::error::{DatatoolError, DatatoolResult};
use crate::types::{Column, Table};
use tracing::debug;

/// A single reversible change to a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    SetCell {
        row: usize,
        column: usize,
        value: Datum,
    },
    InsertRow {
        index: usize,
        row: Vec<Datum>,
    },
    RemoveRow {
        index: usize,
    },
    InsertColumn {
        index: usize,
        column: Column,
        cells: Vec<Datum>,
    },
    RemoveColumn {
        index: usize,
    },
}

impl Edit {
    /// Apply the edit, returning the edit that undoes it. On error the table
    /// is left unchanged.
    pub fn apply(&self, table: &mut Table) -> DatatoolResult<Edit> {
        match self {
            Edit::SetCell { row, column, value } => {
                let previous = table.set(*row, *column, value.clone())?;
                Ok(Edit::SetCell {
                    row: *row,
                    column: *column,
                    value: previous,
                })
            }
            Edit::InsertRow { index, row } => {
                table.insert_row(*index, row.clone())?;
                Ok(Edit::RemoveRow { index: *index })
            }
            Edit::RemoveRow { index } => {
                let row = table.remove_row(*index)?;
                Ok(Edit::InsertRow { index: *index, row })
            }
            Edit::InsertColumn {
                index,
                column,
                cells,
            } => {
                table.insert_column(*index, column.clone(), cells.clone())?;
                Ok(Edit::RemoveColumn { index: *index })
            }
            Edit::RemoveColumn { index } => {
                let (column, cells) = table.remove_column(*index)?;
                Ok(Edit::InsertColumn {
                    index: *index,
                    column,
                    cells,
                })
            }
        }
    }

    /// Short label, as shown in an "Undo ..." menu entry.
    pub fn label(&self) -> &'static str {
        match self {
            Edit::SetCell { .. } => "Edit Cell",
            Edit::InsertRow { .. } => "Insert Row",
            Edit::RemoveRow { .. } => "Remove Row",
            Edit::InsertColumn { .. } => "Insert Column",
            Edit::RemoveColumn { .. } => "Remove Column",
        }
    }
}

/// Undo and redo stacks for one table.
#[derive(Debug, Default)]
pub struct EditHistory {
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a new edit. A successful edit clears the redo stack.
    pub fn apply(&mut self, table: &mut Table, edit: Edit) -> DatatoolResult<()> {
        let inverse = edit.apply(table)?;
        debug!(edit = edit.label(), "applied edit");
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo(&mut self, table: &mut Table) -> DatatoolResult<()> {
        let inverse = self
            .undo_stack
            .pop()
            .ok_or_else(|| DatatoolError::Edit("Nothing to undo".to_string()))?;
        match inverse.apply(table) {
            Ok(redo) => {
                self.redo_stack.push(redo);
                Ok(())
            }
            Err(e) => {
                self.undo_stack.push(inverse);
                Err(e)
            }
        }
    }

    pub fn redo(&mut self, table: &mut Table) -> DatatoolResult<()> {
        let edit = self
            .redo_stack
            .pop()
            .ok_or_else(|| DatatoolError::Edit("Nothing to redo".to_string()))?;
        match edit.apply(table) {
            Ok(inverse) => {
                self.undo_stack.push(inverse);
                Ok(())
            }
            Err(e) => {
                self.redo_stack.push(edit);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the edit the next undo reverses.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo_stack.last().map(Edit::label)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        let mut table = Table::new("t");
        let fill = Datum::empty();
        table.add_column(Column::new("A", "A"), &fill);
        table.add_column(Column::new("B", "B"), &fill);
        table
            .push_row(vec![Datum::string("a1"), Datum::string("b1")], &fill)
            .unwrap();
        table
            .push_row(vec![Datum::string("a2"), Datum::string("b2")], &fill)
            .unwrap();
        table
    }

    fn texts(table: &Table) -> Vec<Vec<String>> {
        table
            .rows()
            .iter()
            .map(|r| r.iter().map(|d| d.text().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_set_cell_undo_redo() {
        let mut table = table();
        let mut history = EditHistory::new();

        history
            .apply(
                &mut table,
                Edit::SetCell {
                    row: 1,
                    column: 0,
                    value: Datum::string("changed"),
                },
            )
            .unwrap();
        assert_eq!(table.get(1, 0).unwrap().text(), "changed");
        assert_eq!(history.undo_label(), Some("Edit Cell"));

        history.undo(&mut table).unwrap();
        assert_eq!(table.get(1, 0).unwrap().text(), "a2");
        assert!(history.can_redo());

        history.redo(&mut table).unwrap();
        assert_eq!(table.get(1, 0).unwrap().text(), "changed");
    }

    #[test]
    fn test_row_and_column_edits_reverse() {
        let mut table = table();
        let original = texts(&table);
        let mut history = EditHistory::new();

        history.apply(&mut table, Edit::RemoveRow { index: 0 }).unwrap();
        history.apply(&mut table, Edit::RemoveColumn { index: 1 }).unwrap();
        assert_eq!(texts(&table), vec![vec!["a2".to_string()]]);

        history.undo(&mut table).unwrap();
        history.undo(&mut table).unwrap();
        assert_eq!(texts(&table), original);
        assert_eq!(table.columns()[1].key, "B");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut table = table();
        let mut history = EditHistory::new();

        history.apply(&mut table, Edit::RemoveRow { index: 0 }).unwrap();
        history.undo(&mut table).unwrap();
        assert!(history.can_redo());

        history
            .apply(
                &mut table,
                Edit::InsertRow {
                    index: 2,
                    row: vec![Datum::string("a3"), Datum::string("b3")],
                },
            )
            .unwrap();
        assert!(!history.can_redo());
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_invalid_edit_leaves_table_and_history_alone() {
        let mut table = table();
        let original = texts(&table);
        let mut history = EditHistory::new();

        let err = history
            .apply(&mut table, Edit::RemoveColumn { index: 9 })
            .unwrap_err();
        assert!(matches!(err, DatatoolError::Edit(_)));
        assert_eq!(texts(&table), original);
        assert!(!history.can_undo());
        assert!(history.undo(&mut table).is_err());
    }
}
