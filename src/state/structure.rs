//! Workbook-changing actions and keeping the view state in step with the
//! model after any mutation.

use super::{editing, Context, GridState};
use crate::editor::clipboard::{Clipboard, ClipboardMode};
use crate::error::{GridError, Result};
use crate::model::CalcModel;
use crate::types::{Axis, SheetView, StyleSnapshot};

/// What the view state needs to know about a sheet before a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SheetMark {
    pub name: String,
    pub frozen_rows: u32,
    pub frozen_columns: u32,
}

pub(super) fn sheet_marks<M: CalcModel + ?Sized>(model: &M) -> Result<Vec<SheetMark>> {
    let mut marks = Vec::new();
    for (sheet, name) in (0u32..).zip(model.sheet_names()) {
        marks.push(SheetMark {
            name,
            frozen_rows: model.frozen_rows(sheet)?,
            frozen_columns: model.frozen_columns(sheet)?,
        });
    }
    Ok(marks)
}

/// Position of the sheet that sat at `before` in `marks` within `names`.
///
/// When the sheet count is unchanged sheets are matched by position (a
/// rename keeps its view); otherwise by name.
fn follow(before: u32, marks: &[SheetMark], names: &[String]) -> Option<usize> {
    let index = usize::try_from(before).ok()?;
    if marks.len() == names.len() {
        return (index < names.len()).then_some(index);
    }
    let name = &marks.get(index)?.name;
    names.iter().position(|n| n == name)
}

/// Carry each sheet's view over to the sheet's new position. New sheets
/// start with a default view.
fn reconcile_views(views: &[SheetView], marks: &[SheetMark], names: &[String]) -> Vec<SheetView> {
    let mut next = vec![SheetView::default(); names.len()];
    for (before, view) in (0u32..).zip(views) {
        if let Some(slot) = follow(before, marks, names).and_then(|i| next.get_mut(i)) {
            *slot = *view;
        }
    }
    next
}

/// Bring `next` back in line with the model after a mutation: one view per
/// sheet, a valid selected sheet, scroll on row and column boundaries, and
/// no editor on a sheet that is gone.
pub(super) fn settle<M: CalcModel>(next: GridState, marks: &[SheetMark], ctx: &mut Context<'_, M>) -> Result<GridState> {
    let names = ctx.model.model().sheet_names();
    let count = u32::try_from(names.len()).map_err(|_| GridError::Invariant("sheet count".into()))?;
    if count == 0 {
        return Err(GridError::Invariant("workbook has no sheets".into()));
    }

    let selected_sheet = match follow(next.selected_sheet, marks, &names) {
        Some(i) => u32::try_from(i).unwrap_or(0),
        None => next.selected_sheet.min(count - 1),
    };
    let mut views = reconcile_views(&next.views, marks, &names);

    let mut previous: Vec<Option<&SheetMark>> = vec![None; names.len()];
    for (before, mark) in (0u32..).zip(marks) {
        if let Some(slot) = follow(before, marks, &names).and_then(|i| previous.get_mut(i)) {
            *slot = Some(mark);
        }
    }

    for ((sheet, view), before) in (0u32..).zip(views.iter_mut()).zip(previous) {
        let layout = ctx.layout(sheet)?;
        let mut scroll = view.scroll;
        if let Some(mark) = before {
            if mark.frozen_rows != layout.frozen_rows() {
                scroll = scroll.with(Axis::Rows, 0.0);
            }
            if mark.frozen_columns != layout.frozen_cols() {
                scroll = scroll.with(Axis::Columns, 0.0);
            }
        }
        view.scroll = ctx.viewport.quantize_position(&layout, scroll);
    }

    let cell_editing = next.cell_editing.clone().and_then(|mut edit| {
        let sheet = follow(edit.sheet, marks, &names)?;
        edit.sheet = u32::try_from(sheet).ok()?;
        Some(edit)
    });
    if next.cell_editing.is_some() && cell_editing.is_none() {
        log::info!("closing editor on a deleted sheet");
    }

    Ok(GridState {
        selected_sheet,
        views,
        cell_editing,
        ..next
    })
}

pub(super) fn set_style<M: CalcModel>(state: &GridState, style: &StyleSnapshot, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let area = state.view().selected_area;
    ctx.model.set_area_style(state.selected_sheet, &area, style)?;
    Ok(state)
}

/// Delete key: clear values, keep styles. Inside the editor the key belongs
/// to the text.
pub(super) fn delete_contents<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if state.is_editing() {
        return Ok(state.clone());
    }
    let area = state.view().selected_area;
    ctx.model.clear_contents(state.selected_sheet, &area)?;
    Ok(state.clone())
}

pub(super) fn insert_rows<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let a = state.view().selected_area.normalized();
    ctx.model
        .insert_rows(state.selected_sheet, a.row_start, a.row_count())?;
    Ok(state)
}

pub(super) fn delete_rows<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let a = state.view().selected_area.normalized();
    ctx.model
        .delete_rows(state.selected_sheet, a.row_start, a.row_count())?;
    Ok(state)
}

pub(super) fn insert_columns<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let a = state.view().selected_area.normalized();
    ctx.model
        .insert_columns(state.selected_sheet, a.column_start, a.column_count())?;
    Ok(state)
}

pub(super) fn delete_columns<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let a = state.view().selected_area.normalized();
    ctx.model
        .delete_columns(state.selected_sheet, a.column_start, a.column_count())?;
    Ok(state)
}

/// Switch sheets. While pointing a reference the editor stays open so the
/// reference can come from the other sheet.
pub(super) fn select_sheet<M: CalcModel>(state: &GridState, sheet: u32, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if sheet >= ctx.model.model().sheet_count() {
        return Err(GridError::StaleSheet(sheet));
    }
    let picking = state.cell_editing.as_ref().is_some_and(|e| e.can_pick());
    let state = if picking {
        state.clone()
    } else {
        editing::commit_pending(state, ctx)?
    };
    Ok(GridState {
        selected_sheet: sheet,
        drag: None,
        extend_to_area: None,
        ..state
    })
}

pub(super) fn add_sheet<M: CalcModel>(state: &GridState, name: Option<&str>, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    let index = ctx.model.add_sheet(name)?;
    Ok(GridState {
        selected_sheet: index,
        ..state
    })
}

pub(super) fn delete_sheet<M: CalcModel>(state: &GridState, sheet: u32, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let state = editing::commit_pending(state, ctx)?;
    ctx.model.delete_sheet(sheet)?;
    Ok(state)
}

/// Copy or cut the selection into the widget clipboard.
pub(super) fn copy<M: CalcModel>(state: &GridState, is_cut: bool, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if state.is_editing() {
        return Ok(state.clone());
    }
    let mode = if is_cut {
        ClipboardMode::Cut
    } else {
        ClipboardMode::Copy
    };
    let area = state.view().selected_area;
    let clipboard = Clipboard::capture(ctx.model.model(), ctx.session, state.selected_sheet, &area, mode)?;
    log::debug!("{mode:?} {} cell(s)", clipboard.area.row_count() * clipboard.area.column_count());
    *ctx.clipboard = Some(clipboard);
    Ok(state.clone())
}

/// Paste onto the selection.
///
/// The widget clipboard is used when `text` is absent or matches what it
/// put on the system clipboard; anything else is pasted as plain text. A
/// cut from another widget pastes as a copy. The pasted block is selected.
pub(super) fn paste<M: CalcModel>(state: &GridState, text: Option<&str>, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if state.is_editing() {
        return Ok(state.clone());
    }
    let sheet = state.selected_sheet;
    let view = state.view();
    let internal = ctx
        .clipboard
        .as_ref()
        .filter(|c| text.map_or(true, |t| t == c.text))
        .cloned();

    let area = match (internal, text) {
        (Some(mut clipboard), _) => {
            if clipboard.mode == ClipboardMode::Cut && clipboard.session != ctx.session {
                clipboard.mode = ClipboardMode::Copy;
            }
            let area = ctx.model.paste(sheet, &view.selected_area, &clipboard)?;
            if clipboard.mode == ClipboardMode::Cut {
                *ctx.clipboard = None;
            }
            area
        }
        (None, Some(text)) => ctx.model.paste_text(sheet, view.selected_cell, text)?,
        (None, None) => return Ok(state.clone()),
    };

    let layout = ctx.layout(sheet)?;
    let anchor = area.top_left();
    let scroll = ctx.viewport.reveal(&layout, view.scroll, anchor);
    Ok(state.with_view(view.select_area(anchor, area).with_scroll(scroll)))
}

pub(super) fn undo<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if !state.is_editing() {
        ctx.model.undo()?;
    }
    Ok(state.clone())
}

pub(super) fn redo<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if !state.is_editing() {
        ctx.model.redo()?;
    }
    Ok(state.clone())
}
