//! Recording wrapper around a calculation model.
//!
//! `UserModel` is the only way the grid mutates a model. Each user-level
//! mutation captures the old state, applies the change and pushes exactly
//! one transaction onto the history. Undo and redo go through here too so
//! the replay never records.

pub mod clipboard;
pub(crate) mod mutation;

use crate::error::{GridError, Result};
use crate::history::snapshot::{capture_columns, capture_rows, capture_sheet};
use crate::history::{ActionHistory, Command, HistoryConfig, Transaction};
use crate::model::CalcModel;
use crate::types::{Area, Cell, StyleSnapshot, LAST_COLUMN, LAST_ROW};

/// A calculation model plus the undo history of everything done to it.
#[derive(Debug)]
pub struct UserModel<M> {
    model: M,
    history: ActionHistory,
    /// Bumped on every change to the model
    revision: u64,
    /// Transactions applied since `begin_transaction`, not yet recorded
    pending: Option<Vec<Transaction>>,
}

impl<M: CalcModel> UserModel<M> {
    pub fn new(model: M, config: HistoryConfig) -> Self {
        Self {
            model,
            history: ActionHistory::new(config),
            revision: 0,
            pending: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    /// Counter that changes whenever the model does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_inner(self) -> M {
        self.model
    }

    /// Replace the workbook from JSON. History does not survive a reload.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.model.load_json(json)?;
        self.history.clear();
        self.revision += 1;
        Ok(())
    }

    /// Apply a transaction and record it. Nothing is recorded on failure.
    ///
    /// Between `begin_transaction` and `end_transaction` recording is held
    /// back until the outcome is known.
    fn apply(&mut self, transaction: Transaction) -> Result<()> {
        if transaction.is_empty() {
            return Ok(());
        }
        mutation::apply_all(&mut self.model, &transaction)?;
        self.revision += 1;
        match &mut self.pending {
            Some(pending) => pending.push(transaction),
            None => self.record(transaction),
        }
        Ok(())
    }

    fn record(&mut self, transaction: Transaction) {
        log::debug!("recorded transaction of {} command(s)", transaction.len());
        self.history.push(transaction);
    }

    /// Hold back the transactions of the following mutations until
    /// [`UserModel::end_transaction`]. Does nothing if already holding.
    pub fn begin_transaction(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(Vec::new());
        }
    }

    /// Finish what `begin_transaction` started. With `keep` the held
    /// transactions are recorded in order, each its own undo step; otherwise
    /// they are reverted newest first and the model is back where
    /// `begin_transaction` found it.
    pub fn end_transaction(&mut self, keep: bool) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.is_empty() {
            return;
        }
        if keep {
            for transaction in pending {
                self.record(transaction);
            }
            return;
        }
        log::debug!("reverting {} transaction(s) of a failed action", pending.len());
        for command in pending.iter().rev().flat_map(|t| t.iter().rev()) {
            if let Err(e) = command.undo(&mut self.model) {
                log::warn!("revert of {command:?} failed: {e}");
            }
        }
        self.revision += 1;
    }

    // ---- cell contents ----

    /// Write what the user typed into a cell.
    ///
    /// Always records a transaction, even when the text is unchanged, so a
    /// commit is one undo step.
    pub fn set_user_input(&mut self, sheet: u32, cell: Cell, text: &str) -> Result<()> {
        let command = mutation::value_change(&self.model, sheet, cell, text.to_string())?;
        self.apply(vec![command])
    }

    /// Give every cell of `area` the same style.
    ///
    /// Whole-row and whole-column areas only touch cells already in use.
    pub fn set_area_style(&mut self, sheet: u32, area: &Area, style: &StyleSnapshot) -> Result<()> {
        let mut transaction = Vec::new();
        for cell in self.cells_in(sheet, area)? {
            transaction.extend(mutation::style_change(&self.model, sheet, cell, style)?);
        }
        self.apply(transaction)
    }

    /// Clear the input of every used cell in `area`, keeping styles.
    pub fn clear_contents(&mut self, sheet: u32, area: &Area) -> Result<()> {
        let a = area.normalized();
        let mut transaction = Vec::new();
        for cell in self.model.sheet_cells(sheet)? {
            if a.contains(cell) && !self.model.get_input(sheet, cell.row, cell.column)?.is_empty() {
                transaction.push(mutation::value_change(&self.model, sheet, cell, String::new())?);
            }
        }
        self.apply(transaction)
    }

    /// Cells of `area` worth visiting: every cell for small blocks, only the
    /// used ones for whole rows/columns.
    fn cells_in(&self, sheet: u32, area: &Area) -> Result<Vec<Cell>> {
        let a = area.normalized();
        if a.row_end == LAST_ROW || a.column_end == LAST_COLUMN {
            let used = self.model.sheet_cells(sheet)?;
            return Ok(used.into_iter().filter(|c| a.contains(*c)).collect());
        }
        Ok(a.cells().collect())
    }

    // ---- structure ----

    pub fn insert_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()> {
        self.apply(vec![Command::InsertRows { sheet, row, count }])
    }

    /// Delete rows `row..row + count`, keeping a snapshot for undo.
    pub fn delete_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()> {
        let snapshot = capture_rows(&self.model, sheet, row, count)?;
        self.apply(vec![Command::DeleteRows {
            sheet,
            row,
            count,
            snapshot,
        }])
    }

    pub fn insert_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()> {
        self.apply(vec![Command::InsertColumns {
            sheet,
            column,
            count,
        }])
    }

    pub fn delete_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()> {
        let snapshot = capture_columns(&self.model, sheet, column, count)?;
        self.apply(vec![Command::DeleteColumns {
            sheet,
            column,
            count,
            snapshot,
        }])
    }

    pub fn set_row_height(&mut self, sheet: u32, row: u32, height: Option<f64>) -> Result<()> {
        let old_height = self.model.row_height(sheet, row)?;
        self.apply(vec![Command::SetRowHeight {
            sheet,
            row,
            old_height,
            new_height: height,
        }])
    }

    pub fn set_column_width(&mut self, sheet: u32, column: u32, width: Option<f64>) -> Result<()> {
        let old_width = self.model.column_width(sheet, column)?;
        self.apply(vec![Command::SetColumnWidth {
            sheet,
            column,
            old_width,
            new_width: width,
        }])
    }

    pub fn set_frozen_rows(&mut self, sheet: u32, count: u32) -> Result<()> {
        let old_count = self.model.frozen_rows(sheet)?;
        self.apply(vec![Command::SetFrozenRows {
            sheet,
            old_count,
            new_count: count,
        }])
    }

    pub fn set_frozen_columns(&mut self, sheet: u32, count: u32) -> Result<()> {
        let old_count = self.model.frozen_columns(sheet)?;
        self.apply(vec![Command::SetFrozenColumns {
            sheet,
            old_count,
            new_count: count,
        }])
    }

    // ---- sheets ----

    /// Append a sheet, named `name` or the next free `SheetN`. Returns its index.
    pub fn add_sheet(&mut self, name: Option<&str>) -> Result<u32> {
        let name = name.map_or_else(|| self.model.new_sheet_name(), str::to_string);
        let index = self.model.sheet_count();
        self.apply(vec![Command::AddSheet { index, name }])?;
        Ok(index)
    }

    pub fn rename_sheet(&mut self, sheet: u32, name: &str) -> Result<()> {
        let old_name = usize::try_from(sheet)
            .ok()
            .and_then(|i| self.model.sheet_names().get(i).cloned())
            .ok_or(GridError::StaleSheet(sheet))?;
        self.apply(vec![Command::RenameSheet {
            sheet,
            old_name,
            new_name: name.to_string(),
        }])
    }

    pub fn delete_sheet(&mut self, sheet: u32) -> Result<()> {
        let snapshot = capture_sheet(&self.model, sheet)?;
        self.apply(vec![Command::DeleteSheet { sheet, snapshot }])
    }

    // ---- fill handle ----

    /// Extend `source` vertically so the filled block reaches `to_row`.
    pub fn auto_fill_rows(&mut self, sheet: u32, source: &Area, to_row: u32) -> Result<()> {
        let plan = mutation::fill_rows_plan(source, to_row);
        self.fill(sheet, plan)
    }

    /// Extend `source` horizontally so the filled block reaches `to_column`.
    pub fn auto_fill_columns(&mut self, sheet: u32, source: &Area, to_column: u32) -> Result<()> {
        let plan = mutation::fill_columns_plan(source, to_column);
        self.fill(sheet, plan)
    }

    fn fill(&mut self, sheet: u32, plan: Vec<(Cell, Cell)>) -> Result<()> {
        let mut transaction = Vec::new();
        for (source, target) in plan {
            let value = self.model.extended_value(sheet, source, target)?;
            let style = self.model.get_style(sheet, source.row, source.column)?;
            transaction.extend(mutation::copy_cell(&self.model, sheet, target, value, &style)?);
        }
        self.apply(transaction)
    }

    // ---- history ----

    /// Revert the last transaction. Returns whether anything was undone.
    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.history.undo(&mut self.model)?.is_some();
        if undone {
            self.revision += 1;
        }
        Ok(undone)
    }

    /// Re-apply the last undone transaction.
    pub fn redo(&mut self) -> Result<bool> {
        let redone = self.history.redo(&mut self.model)?.is_some();
        if redone {
            self.revision += 1;
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::MemoryModel;
    use serde_json::json;

    fn user_model() -> UserModel<MemoryModel> {
        UserModel::new(MemoryModel::new(), HistoryConfig::default())
    }

    #[test]
    fn test_set_user_input_records_one_transaction() {
        let mut um = user_model();
        um.set_user_input(0, Cell::new(1, 1), "42").unwrap();
        assert_eq!(um.history().undo_len(), 1);
        assert!(um.undo().unwrap());
        assert_eq!(um.model().get_value(0, 1, 1).unwrap(), "");
        assert!(um.redo().unwrap());
        assert_eq!(um.model().get_value(0, 1, 1).unwrap(), "42");
    }

    #[test]
    fn test_failed_input_records_nothing() {
        let mut um = user_model();
        assert!(um.set_user_input(0, Cell::new(1, 1), "=SUM(A1").is_err());
        assert!(!um.can_undo());
    }

    #[test]
    fn test_clear_contents_keeps_style() {
        let mut um = user_model();
        let style = StyleSnapshot(json!({"bold": true}));
        um.set_user_input(0, Cell::new(2, 2), "x").unwrap();
        um.set_area_style(0, &Area::new(2, 2, 2, 2), &style).unwrap();
        um.clear_contents(0, &Area::new(1, 5, 1, 5)).unwrap();
        assert_eq!(um.model().get_input(0, 2, 2).unwrap(), "");
        assert_eq!(um.model().get_style(0, 2, 2).unwrap(), style);
        um.undo().unwrap();
        assert_eq!(um.model().get_input(0, 2, 2).unwrap(), "x");
    }

    #[test]
    fn test_delete_rows_undo_restores_height_and_values() {
        let mut um = user_model();
        um.set_user_input(0, Cell::new(3, 1), "a").unwrap();
        um.set_user_input(0, Cell::new(4, 1), "b").unwrap();
        um.set_row_height(0, 3, Some(42.0)).unwrap();
        um.delete_rows(0, 3, 2).unwrap();
        assert_eq!(um.model().get_input(0, 3, 1).unwrap(), "");
        um.undo().unwrap();
        assert_eq!(um.model().get_input(0, 3, 1).unwrap(), "a");
        assert_eq!(um.model().get_input(0, 4, 1).unwrap(), "b");
        assert_eq!(um.model().row_height(0, 3).unwrap(), Some(42.0));
    }

    #[test]
    fn test_sheet_lifecycle_is_undoable() {
        let mut um = user_model();
        let index = um.add_sheet(None).unwrap();
        assert_eq!(index, 1);
        um.rename_sheet(1, "Data").unwrap();
        um.set_user_input(1, Cell::new(1, 1), "kept").unwrap();
        um.delete_sheet(1).unwrap();
        assert_eq!(um.model().sheet_names(), vec!["Sheet1"]);
        um.undo().unwrap();
        assert_eq!(um.model().sheet_names(), vec!["Sheet1", "Data"]);
        assert_eq!(um.model().get_input(1, 1, 1).unwrap(), "kept");
    }

    #[test]
    fn test_kept_transaction_records_each_step() {
        let mut um = user_model();
        um.begin_transaction();
        um.set_user_input(0, Cell::new(1, 1), "a").unwrap();
        um.insert_rows(0, 1, 1).unwrap();
        assert!(!um.can_undo());
        um.end_transaction(true);
        assert_eq!(um.history().undo_len(), 2);
        assert_eq!(um.model().get_input(0, 2, 1).unwrap(), "a");
        um.undo().unwrap();
        assert_eq!(um.model().get_input(0, 1, 1).unwrap(), "a");
        um.undo().unwrap();
        assert_eq!(um.model().get_input(0, 1, 1).unwrap(), "");
    }

    #[test]
    fn test_dropped_transaction_reverts_model() {
        let mut um = user_model();
        um.set_user_input(0, Cell::new(3, 3), "kept").unwrap();
        let before = um.model().to_json().unwrap();
        um.begin_transaction();
        um.set_user_input(0, Cell::new(1, 1), "a").unwrap();
        um.add_sheet(None).unwrap();
        assert!(um.add_sheet(Some("Sheet1")).is_err());
        um.end_transaction(false);
        assert_eq!(um.model().to_json().unwrap(), before);
        assert_eq!(um.history().undo_len(), 1);
    }

    #[test]
    fn test_auto_fill_rows_extends_formulas() {
        let mut um = user_model();
        um.set_user_input(0, Cell::new(1, 2), "=A1").unwrap();
        um.auto_fill_rows(0, &Area::new(1, 1, 2, 2), 3).unwrap();
        assert_eq!(um.model().get_input(0, 2, 2).unwrap(), "=A2");
        assert_eq!(um.model().get_input(0, 3, 2).unwrap(), "=A3");
        assert_eq!(um.history().undo_len(), 2);
        um.undo().unwrap();
        assert_eq!(um.model().get_input(0, 3, 2).unwrap(), "");
    }
}
