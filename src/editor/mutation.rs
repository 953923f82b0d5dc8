//! Building and applying transactions.
//!
//! Every user-level mutation is first turned into a list of commands with
//! their old state captured from the model, then applied in one go. If one
//! command fails, the ones already applied are reverted so the model is left
//! exactly as it was and nothing is recorded.

use crate::error::Result;
use crate::history::{Command, Transaction};
use crate::model::CalcModel;
use crate::types::{Area, Cell, StyleSnapshot};

/// Apply `transaction` in order, reverting the applied prefix on failure.
pub(crate) fn apply_all<M: CalcModel + ?Sized>(model: &mut M, transaction: &Transaction) -> Result<()> {
    for (applied, command) in transaction.iter().enumerate() {
        if let Err(e) = command.redo(model) {
            for done in transaction.iter().take(applied).rev() {
                if let Err(rollback) = done.undo(model) {
                    log::warn!("rollback after failed mutation also failed: {rollback}");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Command writing `new_value` into `cell`.
pub(crate) fn value_change<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    cell: Cell,
    new_value: String,
) -> Result<Command> {
    Ok(Command::SetCellValue {
        sheet,
        row: cell.row,
        column: cell.column,
        old_value: model.get_input(sheet, cell.row, cell.column)?,
        new_value,
    })
}

/// Command setting the style of `cell`, or `None` if it already has it.
pub(crate) fn style_change<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    cell: Cell,
    new_style: &StyleSnapshot,
) -> Result<Option<Command>> {
    let old_style = model.get_style(sheet, cell.row, cell.column)?;
    if old_style == *new_style {
        return Ok(None);
    }
    Ok(Some(Command::SetCellStyle {
        sheet,
        row: cell.row,
        column: cell.column,
        old_style,
        new_style: new_style.clone(),
    }))
}

/// Commands copying the contents of `source` into `target`, with the value
/// already rewritten for its new position.
pub(crate) fn copy_cell<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    target: Cell,
    value: String,
    style: &StyleSnapshot,
) -> Result<Vec<Command>> {
    let mut commands = Vec::with_capacity(2);
    if model.get_input(sheet, target.row, target.column)? != value {
        commands.push(value_change(model, sheet, target, value)?);
    }
    commands.extend(style_change(model, sheet, target, style)?);
    Ok(commands)
}

/// Index in the repeating source span `start..start + len` that feeds `target`.
fn cyclic_source(start: u32, len: u32, target: u32) -> u32 {
    let offset = (i64::from(target) - i64::from(start)).rem_euclid(i64::from(len.max(1)));
    u32::try_from(i64::from(start) + offset).unwrap_or(start)
}

/// Inclusive span of new indices between a block `start..=end` and `to`.
fn fill_span(start: u32, end: u32, to: u32) -> Option<(u32, u32)> {
    if to > end {
        Some((end + 1, to))
    } else if to < start {
        Some((to, start - 1))
    } else {
        None
    }
}

/// `(source, target)` pairs for filling `source` vertically up to/down to `to_row`.
pub(crate) fn fill_rows_plan(source: &Area, to_row: u32) -> Vec<(Cell, Cell)> {
    let a = source.normalized();
    let Some((first, last)) = fill_span(a.row_start, a.row_end, to_row) else {
        return Vec::new();
    };
    let height = a.row_count();
    (first..=last)
        .flat_map(|row| {
            let from_row = cyclic_source(a.row_start, height, row);
            (a.column_start..=a.column_end)
                .map(move |column| (Cell::new(from_row, column), Cell::new(row, column)))
        })
        .collect()
}

/// `(source, target)` pairs for filling `source` horizontally to `to_column`.
pub(crate) fn fill_columns_plan(source: &Area, to_column: u32) -> Vec<(Cell, Cell)> {
    let a = source.normalized();
    let Some((first, last)) = fill_span(a.column_start, a.column_end, to_column) else {
        return Vec::new();
    };
    let width = a.column_count();
    (a.row_start..=a.row_end)
        .flat_map(|row| {
            (first..=last).map(move |column| {
                let from_column = cyclic_source(a.column_start, width, column);
                (Cell::new(row, from_column), Cell::new(row, column))
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::MemoryModel;

    #[test]
    fn test_fill_rows_plan_down_repeats_pattern() {
        let plan = fill_rows_plan(&Area::new(1, 2, 1, 1), 5);
        let sources: Vec<u32> = plan.iter().map(|(s, _)| s.row).collect();
        let targets: Vec<u32> = plan.iter().map(|(_, t)| t.row).collect();
        assert_eq!(targets, vec![3, 4, 5]);
        assert_eq!(sources, vec![1, 2, 1]);
    }

    #[test]
    fn test_fill_rows_plan_up() {
        let plan = fill_rows_plan(&Area::new(4, 5, 2, 2), 2);
        let pairs: Vec<(u32, u32)> = plan.iter().map(|(s, t)| (s.row, t.row)).collect();
        assert_eq!(pairs, vec![(4, 2), (5, 3)]);
    }

    #[test]
    fn test_fill_columns_plan_left() {
        let plan = fill_columns_plan(&Area::new(1, 1, 3, 3), 1);
        let pairs: Vec<(u32, u32)> = plan.iter().map(|(s, t)| (s.column, t.column)).collect();
        assert_eq!(pairs, vec![(3, 1), (3, 2)]);
        assert!(fill_columns_plan(&Area::new(1, 1, 3, 3), 3).is_empty());
    }

    #[test]
    fn test_apply_all_rolls_back() {
        let mut model = MemoryModel::new();
        let tx = vec![
            Command::SetCellValue {
                sheet: 0,
                row: 1,
                column: 1,
                old_value: String::new(),
                new_value: "ok".into(),
            },
            Command::SetCellValue {
                sheet: 0,
                row: 2,
                column: 1,
                old_value: String::new(),
                new_value: "=(".into(),
            },
        ];
        assert!(apply_all(&mut model, &tx).is_err());
        assert_eq!(model.get_value(0, 1, 1).unwrap(), "");
    }
}
