//! Growing and shrinking the selection: Shift+Arrow and the fill handle.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Context, GridState};
use crate::error::Result;
use crate::model::CalcModel;
use crate::types::{Area, Axis, Border, Cell, Direction, LAST_COLUMN, LAST_ROW};

/// Block the fill handle is being dragged over, next to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendToArea {
    pub area: Area,
    /// Selection edge the block is attached to
    pub border: Border,
}

/// Distance from `index` to the span `start..=end` (0 when inside).
fn overshoot(index: u32, start: u32, end: u32) -> u32 {
    if index > end {
        index - end
    } else if index < start {
        start - index
    } else {
        0
    }
}

/// Fill-handle block for a pointer over `target`.
///
/// The axis the pointer overshoots the selection by more wins; a tie keeps
/// the axis of `previous` (rows when there is none). The block spans the
/// selection's full width (or height) and stops at the target. A target
/// inside the selection gives `None`.
pub fn extend_to(selection: &Area, target: Cell, previous: Option<Border>) -> Option<ExtendToArea> {
    let a = selection.normalized();
    let rows = overshoot(target.row, a.row_start, a.row_end);
    let columns = overshoot(target.column, a.column_start, a.column_end);
    if rows == 0 && columns == 0 {
        return None;
    }
    let axis = match rows.cmp(&columns) {
        Ordering::Greater => Axis::Rows,
        Ordering::Less => Axis::Columns,
        Ordering::Equal => previous.map_or(Axis::Rows, Border::axis),
    };
    let extend = match axis {
        Axis::Rows if target.row > a.row_end => ExtendToArea {
            area: Area::new(a.row_end + 1, target.row, a.column_start, a.column_end),
            border: Border::Bottom,
        },
        Axis::Rows => ExtendToArea {
            area: Area::new(target.row, a.row_start - 1, a.column_start, a.column_end),
            border: Border::Top,
        },
        Axis::Columns if target.column > a.column_end => ExtendToArea {
            area: Area::new(a.row_start, a.row_end, a.column_end + 1, target.column),
            border: Border::Right,
        },
        Axis::Columns => ExtendToArea {
            area: Area::new(a.row_start, a.row_end, target.column, a.column_start - 1),
            border: Border::Left,
        },
    };
    Some(extend)
}

/// Where the moving edge at `from` lands after one step (or a jump to the
/// data edge) in `direction`.
fn step<M: CalcModel>(
    ctx: &Context<'_, M>,
    sheet: u32,
    from: Cell,
    direction: Direction,
    to_edge: bool,
) -> Cell {
    if to_edge {
        return ctx
            .model
            .model()
            .navigate_to_edge(sheet, from, direction)
            .unwrap_or(from);
    }
    let (dr, dc) = direction.delta();
    from.offset_clamped(dr, dc)
}

/// Shift+Arrow: move the edge opposite the active cell, shrinking first.
///
/// The active cell stays put and always remains inside the selection.
pub(super) fn extend_selection<M: CalcModel>(
    state: &GridState,
    direction: Direction,
    to_edge: bool,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    let view = state.view();
    let anchor = view.selected_cell;
    let sheet = state.selected_sheet;
    let mut a = view.selected_area.normalized();

    // the cell whose row/column is being moved, used for reveal
    let moving = match direction {
        Direction::Down if a.row_start < anchor.row => {
            let next = step(ctx, sheet, Cell::new(a.row_start, anchor.column), direction, to_edge);
            a.row_start = next.row.min(anchor.row);
            Cell::new(a.row_start, anchor.column)
        }
        Direction::Down => {
            let next = step(ctx, sheet, Cell::new(a.row_end, anchor.column), direction, to_edge);
            a.row_end = next.row.max(a.row_end).min(LAST_ROW);
            Cell::new(a.row_end, anchor.column)
        }
        Direction::Up if a.row_end > anchor.row => {
            let next = step(ctx, sheet, Cell::new(a.row_end, anchor.column), direction, to_edge);
            a.row_end = next.row.max(anchor.row);
            Cell::new(a.row_end, anchor.column)
        }
        Direction::Up => {
            let next = step(ctx, sheet, Cell::new(a.row_start, anchor.column), direction, to_edge);
            a.row_start = next.row.min(a.row_start);
            Cell::new(a.row_start, anchor.column)
        }
        Direction::Right if a.column_start < anchor.column => {
            let next = step(ctx, sheet, Cell::new(anchor.row, a.column_start), direction, to_edge);
            a.column_start = next.column.min(anchor.column);
            Cell::new(anchor.row, a.column_start)
        }
        Direction::Right => {
            let next = step(ctx, sheet, Cell::new(anchor.row, a.column_end), direction, to_edge);
            a.column_end = next.column.max(a.column_end).min(LAST_COLUMN);
            Cell::new(anchor.row, a.column_end)
        }
        Direction::Left if a.column_end > anchor.column => {
            let next = step(ctx, sheet, Cell::new(anchor.row, a.column_end), direction, to_edge);
            a.column_end = next.column.max(anchor.column);
            Cell::new(anchor.row, a.column_end)
        }
        Direction::Left => {
            let next = step(ctx, sheet, Cell::new(anchor.row, a.column_start), direction, to_edge);
            a.column_start = next.column.min(a.column_start);
            Cell::new(anchor.row, a.column_start)
        }
    };

    if a == view.selected_area.normalized() {
        return Ok(state.clone());
    }
    let layout = ctx.layout(sheet)?;
    let scroll = ctx.viewport.reveal(&layout, view.scroll, moving);
    Ok(state.with_view(view.select_area(anchor, a).with_scroll(scroll)))
}
