//! Reversible model mutations.
//!
//! Each variant carries absolute coordinates valid at the moment it was
//! recorded plus whatever old state is needed to reverse it. Replaying a
//! transaction's commands in recorded order, forwards or backwards, never
//! needs to recompute an index.

use serde::{Deserialize, Serialize};

use super::snapshot::{restore_cells, restore_sheet, LinesSnapshot, SheetSnapshot};
use crate::error::Result;
use crate::model::CalcModel;
use crate::types::StyleSnapshot;

/// One reversible mutation of the calculation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    SetCellValue {
        sheet: u32,
        row: u32,
        column: u32,
        old_value: String,
        new_value: String,
    },
    #[serde(rename_all = "camelCase")]
    SetCellStyle {
        sheet: u32,
        row: u32,
        column: u32,
        old_style: StyleSnapshot,
        new_style: StyleSnapshot,
    },
    InsertRows {
        sheet: u32,
        row: u32,
        count: u32,
    },
    DeleteRows {
        sheet: u32,
        row: u32,
        count: u32,
        snapshot: LinesSnapshot,
    },
    InsertColumns {
        sheet: u32,
        column: u32,
        count: u32,
    },
    DeleteColumns {
        sheet: u32,
        column: u32,
        count: u32,
        snapshot: LinesSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    SetRowHeight {
        sheet: u32,
        row: u32,
        old_height: Option<f64>,
        new_height: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    SetColumnWidth {
        sheet: u32,
        column: u32,
        old_width: Option<f64>,
        new_width: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    SetFrozenRows {
        sheet: u32,
        old_count: u32,
        new_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    SetFrozenColumns {
        sheet: u32,
        old_count: u32,
        new_count: u32,
    },
    AddSheet {
        index: u32,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    RenameSheet {
        sheet: u32,
        old_name: String,
        new_name: String,
    },
    DeleteSheet {
        sheet: u32,
        snapshot: SheetSnapshot,
    },
}

impl Command {
    /// Apply the mutation.
    pub fn redo<M: CalcModel + ?Sized>(&self, model: &mut M) -> Result<()> {
        match self {
            Self::SetCellValue {
                sheet,
                row,
                column,
                new_value,
                ..
            } => model.set_input(*sheet, *row, *column, new_value),
            Self::SetCellStyle {
                sheet,
                row,
                column,
                new_style,
                ..
            } => model.set_style(*sheet, *row, *column, new_style),
            Self::InsertRows { sheet, row, count } => model.insert_rows(*sheet, *row, *count),
            Self::DeleteRows {
                sheet, row, count, ..
            } => model.delete_rows(*sheet, *row, *count),
            Self::InsertColumns {
                sheet,
                column,
                count,
            } => model.insert_columns(*sheet, *column, *count),
            Self::DeleteColumns {
                sheet,
                column,
                count,
                ..
            } => model.delete_columns(*sheet, *column, *count),
            Self::SetRowHeight {
                sheet,
                row,
                new_height,
                ..
            } => model.set_row_height(*sheet, *row, *new_height),
            Self::SetColumnWidth {
                sheet,
                column,
                new_width,
                ..
            } => model.set_column_width(*sheet, *column, *new_width),
            Self::SetFrozenRows {
                sheet, new_count, ..
            } => model.set_frozen_rows(*sheet, *new_count),
            Self::SetFrozenColumns {
                sheet, new_count, ..
            } => model.set_frozen_columns(*sheet, *new_count),
            Self::AddSheet { index, name } => model.insert_sheet(*index, name),
            Self::RenameSheet {
                sheet, new_name, ..
            } => model.rename_sheet(*sheet, new_name),
            Self::DeleteSheet { sheet, .. } => model.delete_sheet(*sheet),
        }
    }

    /// Reverse the mutation.
    pub fn undo<M: CalcModel + ?Sized>(&self, model: &mut M) -> Result<()> {
        match self {
            Self::SetCellValue {
                sheet,
                row,
                column,
                old_value,
                ..
            } => model.set_input(*sheet, *row, *column, old_value),
            Self::SetCellStyle {
                sheet,
                row,
                column,
                old_style,
                ..
            } => model.set_style(*sheet, *row, *column, old_style),
            Self::InsertRows { sheet, row, count } => model.delete_rows(*sheet, *row, *count),
            Self::DeleteRows {
                sheet,
                row,
                count,
                snapshot,
            } => {
                model.insert_rows(*sheet, *row, *count)?;
                for (r, height) in &snapshot.sizes {
                    model.set_row_height(*sheet, *r, Some(*height))?;
                }
                restore_cells(model, *sheet, &snapshot.cells)
            }
            Self::InsertColumns {
                sheet,
                column,
                count,
            } => model.delete_columns(*sheet, *column, *count),
            Self::DeleteColumns {
                sheet,
                column,
                count,
                snapshot,
            } => {
                model.insert_columns(*sheet, *column, *count)?;
                for (c, width) in &snapshot.sizes {
                    model.set_column_width(*sheet, *c, Some(*width))?;
                }
                restore_cells(model, *sheet, &snapshot.cells)
            }
            Self::SetRowHeight {
                sheet,
                row,
                old_height,
                ..
            } => model.set_row_height(*sheet, *row, *old_height),
            Self::SetColumnWidth {
                sheet,
                column,
                old_width,
                ..
            } => model.set_column_width(*sheet, *column, *old_width),
            Self::SetFrozenRows {
                sheet, old_count, ..
            } => model.set_frozen_rows(*sheet, *old_count),
            Self::SetFrozenColumns {
                sheet, old_count, ..
            } => model.set_frozen_columns(*sheet, *old_count),
            Self::AddSheet { index, .. } => model.delete_sheet(*index),
            Self::RenameSheet {
                sheet, old_name, ..
            } => model.rename_sheet(*sheet, old_name),
            Self::DeleteSheet { sheet, snapshot } => restore_sheet(model, *sheet, snapshot),
        }
    }

    /// Does the command add, remove or rename sheets?
    pub fn changes_sheets(&self) -> bool {
        matches!(
            self,
            Self::AddSheet { .. } | Self::RenameSheet { .. } | Self::DeleteSheet { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::MemoryModel;

    #[test]
    fn test_set_value_roundtrip() {
        let mut model = MemoryModel::new();
        let cmd = Command::SetCellValue {
            sheet: 0,
            row: 1,
            column: 1,
            old_value: String::new(),
            new_value: "hi".into(),
        };
        cmd.redo(&mut model).unwrap();
        assert_eq!(model.get_value(0, 1, 1).unwrap(), "hi");
        cmd.undo(&mut model).unwrap();
        assert_eq!(model.get_value(0, 1, 1).unwrap(), "");
    }

    #[test]
    fn test_add_sheet_undo_removes_it() {
        let mut model = MemoryModel::new();
        let cmd = Command::AddSheet {
            index: 1,
            name: "Extra".into(),
        };
        cmd.redo(&mut model).unwrap();
        assert_eq!(model.sheet_names(), vec!["Sheet1", "Extra"]);
        cmd.undo(&mut model).unwrap();
        assert_eq!(model.sheet_names(), vec!["Sheet1"]);
        assert!(cmd.changes_sheets());
    }

    #[test]
    fn test_serde_tag() {
        let cmd = Command::SetFrozenRows {
            sheet: 0,
            old_count: 0,
            new_count: 2,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "setFrozenRows");
        assert_eq!(json["newCount"], 2);
        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }
}
