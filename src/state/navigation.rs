//! Keyboard navigation, programmatic selection and scrolling.

use super::{Context, GridState};
use crate::error::Result;
use crate::layout::{AxisLayout, SheetLayout, Viewport};
use crate::model::CalcModel;
use crate::types::{clamp_index, Area, Axis, Cell, Direction, ScrollPosition, LAST_COLUMN, LAST_ROW};

fn index_on(cell: Cell, axis: Axis) -> u32 {
    match axis {
        Axis::Rows => cell.row,
        Axis::Columns => cell.column,
    }
}

/// Scroll after the active cell moves from `from` to `to`.
///
/// Leaving a frozen band for the scrollable region starts that axis from
/// the top (or left); then the smallest scroll revealing `to` is taken.
pub(super) fn scroll_for_move(
    viewport: &Viewport,
    layout: &SheetLayout,
    scroll: ScrollPosition,
    from: Cell,
    to: Cell,
) -> ScrollPosition {
    let mut scroll = scroll;
    for axis in [Axis::Rows, Axis::Columns] {
        let a = layout.axis(axis);
        if a.is_frozen(index_on(from, axis)) && !a.is_frozen(index_on(to, axis)) {
            scroll = scroll.with(axis, 0.0);
        }
    }
    viewport.reveal(layout, scroll, to)
}

/// Collapse the selection onto `target` and scroll it into view.
pub(super) fn move_to<M: CalcModel>(state: &GridState, target: Cell, ctx: &Context<'_, M>) -> Result<GridState> {
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let scroll = scroll_for_move(ctx.viewport, &layout, view.scroll, view.selected_cell, target);
    Ok(state.with_view(view.select_cell(target).with_scroll(scroll)))
}

/// Arrow keys. Stepping off the grid does nothing.
pub(super) fn navigate<M: CalcModel>(
    state: &GridState,
    direction: Direction,
    to_edge: bool,
    ctx: &Context<'_, M>,
) -> Result<GridState> {
    let view = state.view();
    let from = view.selected_cell;
    let target = if to_edge {
        ctx.model
            .model()
            .navigate_to_edge(state.selected_sheet, from, direction)
            .unwrap_or_else(|e| {
                log::warn!("navigate_to_edge failed: {e}");
                from
            })
    } else {
        let (dr, dc) = direction.delta();
        match from.offset(dr, dc) {
            Some(cell) => cell,
            None => return Ok(state.clone()),
        }
    };
    if target == from && view.selected_area.is_single_cell() {
        return Ok(state.clone());
    }
    move_to(state, target, ctx)
}

/// First scrollable index at least `page` away from the current top/left.
fn paged_offset(axis: &AxisLayout, current: f64, page: u32, forward: bool) -> f64 {
    let first = axis.quantize(current).index;
    let index = if forward {
        first.saturating_add(page).min(axis.last)
    } else {
        first.saturating_sub(page).max(axis.first_scrollable())
    };
    axis.scroll_offset_of(index)
}

/// PageUp/PageDown (rows) and their column counterparts: move the active
/// cell and the window by one screenful.
pub(super) fn page<M: CalcModel>(state: &GridState, direction: Direction, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let axis = direction.axis();
    let page = ctx.viewport.page_size(&layout, axis, view.scroll);
    let (dr, dc) = direction.delta();
    let step = i64::from(page);
    let target = view.selected_cell.offset_clamped(dr * step, dc * step);
    if target == view.selected_cell {
        return Ok(state.clone());
    }
    let forward = matches!(direction, Direction::Down | Direction::Right);
    let offset = paged_offset(layout.axis(axis), view.scroll.get(axis), page, forward);
    let scroll = ctx
        .viewport
        .reveal(&layout, view.scroll.with(axis, offset), target);
    Ok(state.with_view(view.select_cell(target).with_scroll(scroll)))
}

/// Home: first column of the current row.
pub(super) fn home<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let row = state.view().selected_cell.row;
    move_to(state, Cell::new(row, 1), ctx)
}

/// Ctrl+Home: first cell outside the frozen panes, window back at the origin.
pub(super) fn sheet_start<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let layout = ctx.layout(state.selected_sheet)?;
    let target = Cell::new(
        layout.rows.first_scrollable().min(LAST_ROW),
        layout.columns.first_scrollable().min(LAST_COLUMN),
    );
    let view = state
        .view()
        .select_cell(target)
        .with_scroll(ScrollPosition::default());
    Ok(state.with_view(view))
}

/// Ctrl+End: bottom-right corner of the used range.
pub(super) fn sheet_end<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let used = ctx.model.model().dimension(state.selected_sheet)?.normalized();
    move_to(state, Cell::new(used.row_end, used.column_end), ctx)
}

fn clamp_cell(cell: Cell) -> Cell {
    Cell::new(
        clamp_index(i64::from(cell.row), LAST_ROW),
        clamp_index(i64::from(cell.column), LAST_COLUMN),
    )
}

fn clamp_area(area: Area) -> Area {
    let start = clamp_cell(Cell::new(area.row_start, area.column_start));
    let end = clamp_cell(Cell::new(area.row_end, area.column_end));
    Area::from_corners(start, end)
}

pub(super) fn select_cell<M: CalcModel>(state: &GridState, cell: Cell, ctx: &Context<'_, M>) -> Result<GridState> {
    let cell = clamp_cell(cell);
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
    Ok(state.with_view(view.select_cell(cell).with_scroll(scroll)))
}

pub(super) fn select_area<M: CalcModel>(state: &GridState, area: Area, ctx: &Context<'_, M>) -> Result<GridState> {
    let area = clamp_area(area);
    let anchor = Cell::new(area.row_start, area.column_start);
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let scroll = ctx.viewport.reveal(&layout, view.scroll, anchor);
    Ok(state.with_view(view.select_area(anchor, area).with_scroll(scroll)))
}

pub(super) fn select_rows(state: &GridState, start: u32, end: u32) -> GridState {
    let start = clamp_index(i64::from(start), LAST_ROW);
    let end = clamp_index(i64::from(end), LAST_ROW);
    state.with_view(state.view().select_rows(start.min(end), start.max(end)))
}

pub(super) fn select_columns(state: &GridState, start: u32, end: u32) -> GridState {
    let start = clamp_index(i64::from(start), LAST_COLUMN);
    let end = clamp_index(i64::from(end), LAST_COLUMN);
    state.with_view(state.view().select_columns(start.min(end), start.max(end)))
}

/// One wheel step on one axis. A forward step that quantizes back onto the
/// current stop still advances by one index, so slow wheels make progress.
fn wheel_axis(axis: &AxisLayout, current: f64, delta: f64) -> f64 {
    if delta.abs() < f64::EPSILON {
        return current;
    }
    let stop = axis.quantize(current + delta);
    if delta > 0.0 && stop.offset <= current {
        let next = stop.index.saturating_add(1).min(axis.last);
        return axis.scroll_offset_of(next);
    }
    stop.offset
}

/// Wheel scroll by a pixel delta, quantized on both axes.
pub(super) fn scroll_by<M: CalcModel>(state: &GridState, dx: f64, dy: f64, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let scroll = ScrollPosition::new(
        wheel_axis(&layout.columns, view.scroll.left, dx),
        wheel_axis(&layout.rows, view.scroll.top, dy),
    );
    Ok(state.with_view(view.with_scroll(scroll)))
}

/// Jump to an absolute scroll position (scrollbar drag), quantized.
pub(super) fn scroll_to<M: CalcModel>(state: &GridState, left: f64, top: f64, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let view = state.view();
    let layout = ctx.layout(state.selected_sheet)?;
    let scroll = ctx
        .viewport
        .quantize_position(&layout, ScrollPosition::new(left, top));
    Ok(state.with_view(view.with_scroll(scroll)))
}
