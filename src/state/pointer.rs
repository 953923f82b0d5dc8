//! Mouse and touch: click to select, drag to extend, drag the fill handle,
//! point at cells while writing a formula.

use super::extend::extend_to;
use super::{editing, navigation, Context, Drag, EditFocus, GridState};
use crate::error::Result;
use crate::layout::HitTarget;
use crate::model::CalcModel;
use crate::types::{Area, Border};

pub(super) fn pointer_down<M: CalcModel>(
    state: &GridState,
    x: f64,
    y: f64,
    shift: bool,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    let layout = ctx.layout(state.selected_sheet)?;
    let view = state.view();
    let hit = ctx.viewport.hit_test(&layout, view.scroll, x, y);

    if let Some(edit) = &state.cell_editing {
        if let HitTarget::Cell(cell) = hit {
            if edit.can_pick() {
                return Ok(editing::pick_reference(state, cell, ctx));
            }
            if cell == edit.cell() && state.selected_sheet == edit.sheet {
                return Ok(state.clone());
            }
        }
        let committed = editing::commit(state, None, ctx)?;
        return pointer_down(&committed, x, y, shift, ctx);
    }

    if !shift && ctx.viewport.hits_fill_handle(&layout, view.scroll, &view.selected_area, x, y) {
        return Ok(GridState {
            drag: Some(Drag::FillHandle),
            extend_to_area: None,
            ..state.clone()
        });
    }

    let anchor = view.selected_cell;
    let next = match hit {
        HitTarget::Cell(cell) if shift => GridState {
            drag: Some(Drag::Select { anchor }),
            ..state.with_view(view.select_area(anchor, Area::from_corners(anchor, cell)))
        },
        HitTarget::Cell(cell) => {
            let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
            GridState {
                drag: Some(Drag::Select { anchor: cell }),
                ..state.with_view(view.select_cell(cell).with_scroll(scroll))
            }
        }
        HitTarget::RowHeader(row) => {
            let from = if shift { anchor.row } else { row };
            GridState {
                drag: Some(Drag::Rows { anchor: from }),
                ..navigation::select_rows(state, from, row)
            }
        }
        HitTarget::ColumnHeader(column) => {
            let from = if shift { anchor.column } else { column };
            GridState {
                drag: Some(Drag::Columns { anchor: from }),
                ..navigation::select_columns(state, from, column)
            }
        }
        HitTarget::CornerHeader => state.with_view(view.select_all()),
        HitTarget::None => state.clone(),
    };
    Ok(GridState {
        extend_to_area: None,
        ..next
    })
}

/// Pointer moved with a button held. Points outside the grid clamp to the
/// nearest visible cell.
pub(super) fn pointer_move<M: CalcModel>(state: &GridState, x: f64, y: f64, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let Some(drag) = state.drag else {
        return Ok(state.clone());
    };
    let layout = ctx.layout(state.selected_sheet)?;
    let view = state.view();
    let cell = ctx.viewport.clamped_cell_at(&layout, view.scroll, x, y);

    let next = match drag {
        Drag::Select { anchor } => {
            let area = Area::from_corners(anchor, cell);
            if area.normalized() == view.selected_area.normalized() {
                return Ok(state.clone());
            }
            let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
            state.with_view(view.select_area(anchor, area).with_scroll(scroll))
        }
        Drag::Rows { anchor } => navigation::select_rows(state, anchor, cell.row),
        Drag::Columns { anchor } => navigation::select_columns(state, anchor, cell.column),
        Drag::FillHandle => {
            let previous = state.extend_to_area.map(|e| e.border);
            let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
            GridState {
                extend_to_area: extend_to(&view.selected_area, cell, previous),
                ..state.with_view(view.with_scroll(scroll))
            }
        }
        Drag::Reference => editing::drag_reference(state, cell, ctx),
    };
    Ok(next)
}

/// Button released. Finishing a fill-handle drag fills the block and
/// selects source and block together.
pub(super) fn pointer_up<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let released = GridState {
        drag: None,
        extend_to_area: None,
        ..state.clone()
    };
    let (Some(Drag::FillHandle), Some(extend)) = (state.drag, state.extend_to_area) else {
        return Ok(released);
    };

    let sheet = state.selected_sheet;
    let view = state.view();
    let source = view.selected_area.normalized();
    let target = extend.area.normalized();
    match extend.border {
        Border::Bottom => ctx.model.auto_fill_rows(sheet, &source, target.row_end)?,
        Border::Top => ctx.model.auto_fill_rows(sheet, &source, target.row_start)?,
        Border::Right => ctx.model.auto_fill_columns(sheet, &source, target.column_end)?,
        Border::Left => ctx.model.auto_fill_columns(sheet, &source, target.column_start)?,
    }
    Ok(released.with_view(view.select_area(view.selected_cell, source.union(&target))))
}

/// Double click on a cell opens the editor on it.
pub(super) fn double_click<M: CalcModel>(state: &GridState, x: f64, y: f64, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if state.is_editing() {
        return Ok(state.clone());
    }
    let layout = ctx.layout(state.selected_sheet)?;
    let view = state.view();
    let HitTarget::Cell(cell) = ctx.viewport.hit_test(&layout, view.scroll, x, y) else {
        return Ok(state.clone());
    };
    let selected = GridState {
        drag: None,
        ..state.with_view(view.select_cell(cell))
    };
    editing::start(&selected, None, EditFocus::Cell, ctx)
}
