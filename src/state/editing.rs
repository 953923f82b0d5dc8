//! In-place cell editing: start, typing, caret, commit, escape, pointing
//! references into a formula and cycling `$` flags with F4.
//!
//! Caret positions are byte offsets into the edited text and are always
//! kept on `char` boundaries.

use serde::{Deserialize, Serialize};

use super::{navigation, Context, Drag, GridState};
use crate::cell_ref::{area_address, qualify};
use crate::error::Result;
use crate::model::lexer::{render_reference, sheet_prefix};
use crate::model::CalcModel;
use crate::types::{Area, Cell, Direction, Token, TokenKind};

/// `Init` is entered by typing over a cell: arrow keys commit and move.
/// `Edit` is entered with F2, a double click or the formula bar: arrow keys
/// move the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditMode {
    Init,
    Edit,
}

/// Which editor has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditFocus {
    Cell,
    FormulaBar,
}

/// A reference being pointed at with the mouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picking {
    /// Cell the pick started on
    pub anchor: Cell,
    /// Sheet the picked cells live on
    pub sheet: u32,
    /// Text after the inserted reference
    pub tail: String,
}

/// An open cell editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEditingState {
    pub sheet: u32,
    pub row: u32,
    pub column: u32,
    pub text: String,
    /// Text a pointed reference is appended to
    pub base: String,
    pub mode: EditMode,
    pub focus: EditFocus,
    pub cursor_start: usize,
    pub cursor_end: usize,
    pub picking: Option<Picking>,
}

impl CellEditingState {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.column)
    }

    /// A click on the grid would point a reference rather than commit.
    pub fn can_pick(&self) -> bool {
        self.text.starts_with('=')
            && self.cursor_start == self.cursor_end
            && (self.picking.is_some() || is_reference_position(&self.text, self.cursor_start))
    }

    /// Forget any pick in progress; what is typed now is the new base.
    fn settle_text(&mut self) {
        self.base.clone_from(&self.text);
        self.picking = None;
    }
}

/// Whether a reference may be inserted at `caret` in `text`: the text is a
/// formula, the caret follows `=`, an operator, `(`, `,` or `;`, and what
/// comes after it is nothing, an operator, `)`, `,` or `;` (whitespace
/// ignored on both sides).
pub fn is_reference_position(text: &str, caret: usize) -> bool {
    if !text.starts_with('=') {
        return false;
    }
    let (Some(head), Some(tail)) = (text.get(..caret), text.get(caret..)) else {
        return false;
    };
    let opens = head
        .trim_end()
        .chars()
        .last()
        .is_some_and(|c| "=+-*/^&<>,;(".contains(c));
    let closes = tail
        .trim_start()
        .chars()
        .next()
        .map_or(true, |c| "=+-*/^&<>%,;)".contains(c));
    opens && closes
}

/// Largest char boundary `<= offset`.
fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn with_editor(state: &GridState, edit: CellEditingState) -> GridState {
    GridState {
        cell_editing: Some(edit),
        ..state.clone()
    }
}

/// Open the editor on the selected cell, or switch an open one to `Edit`.
///
/// `text` is a typed character (`Init` mode); `None` loads the cell's input
/// with its quote prefix (`Edit` mode).
pub(super) fn start<M: CalcModel>(
    state: &GridState,
    text: Option<&str>,
    focus: EditFocus,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    if let Some(edit) = &state.cell_editing {
        if text.is_some() {
            return Ok(state.clone());
        }
        let edit = CellEditingState {
            mode: EditMode::Edit,
            focus,
            ..edit.clone()
        };
        return Ok(with_editor(state, edit));
    }

    let sheet = state.selected_sheet;
    let view = state.view();
    let cell = view.selected_cell;
    let (text, mode) = match text {
        Some(typed) => (typed.to_string(), EditMode::Init),
        None => (
            ctx.model.model().get_input(sheet, cell.row, cell.column)?,
            EditMode::Edit,
        ),
    };
    let caret = text.len();
    let edit = CellEditingState {
        sheet,
        row: cell.row,
        column: cell.column,
        base: text.clone(),
        text,
        mode,
        focus,
        cursor_start: caret,
        cursor_end: caret,
        picking: None,
    };
    let layout = ctx.layout(sheet)?;
    let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
    Ok(with_editor(&state.with_view(view.with_scroll(scroll)), edit))
}

/// The editor's text changed.
pub(super) fn input(state: &GridState, text: &str, cursor_start: usize, cursor_end: usize) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    let mut edit = CellEditingState {
        text: text.to_string(),
        ..edit.clone()
    };
    edit.cursor_start = floor_boundary(text, cursor_start);
    edit.cursor_end = floor_boundary(text, cursor_end);
    edit.settle_text();
    with_editor(state, edit)
}

pub(super) fn set_caret(state: &GridState, start: usize, end: usize) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    let mut edit = edit.clone();
    edit.cursor_start = floor_boundary(&edit.text, start);
    edit.cursor_end = floor_boundary(&edit.text, end);
    edit.settle_text();
    with_editor(state, edit)
}

/// Left/Right in `Edit` mode: move the caret one character, collapsing a
/// selection onto its near end first.
pub(super) fn move_caret(state: &GridState, direction: Direction) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    let mut edit = edit.clone();
    let (lo, hi) = (
        edit.cursor_start.min(edit.cursor_end),
        edit.cursor_start.max(edit.cursor_end),
    );
    let caret = match direction {
        Direction::Left if lo != hi => lo,
        Direction::Right if lo != hi => hi,
        Direction::Left => edit
            .text
            .get(..lo)
            .and_then(|head| head.char_indices().last())
            .map_or(0, |(i, _)| i),
        Direction::Right => edit
            .text
            .get(hi..)
            .and_then(|tail| tail.chars().next())
            .map_or(hi, |c| hi + c.len_utf8()),
        Direction::Up | Direction::Down => return state.clone(),
    };
    edit.cursor_start = caret;
    edit.cursor_end = caret;
    edit.settle_text();
    with_editor(state, edit)
}

/// Write the edited text to the model and close the editor, then move the
/// active cell one step in `direction` (clamped to the grid).
///
/// On failure the editor stays open and nothing is recorded.
pub(super) fn commit<M: CalcModel>(
    state: &GridState,
    direction: Option<Direction>,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    let Some(edit) = &state.cell_editing else {
        return Ok(state.clone());
    };
    let cell = edit.cell();
    if let Err(e) = ctx.model.set_user_input(edit.sheet, cell, &edit.text) {
        log::warn!("commit of {cell:?} failed: {e}");
        return Err(e);
    }
    let closed = GridState {
        selected_sheet: edit.sheet,
        cell_editing: None,
        drag: None,
        ..state.clone()
    };
    let closed = closed.with_view(closed.view().select_cell(cell));
    let target = direction.map_or(cell, |d| {
        let (dr, dc) = d.delta();
        cell.offset_clamped(dr, dc)
    });
    navigation::move_to(&closed, target, ctx)
}

/// Commit an open editor in place; a no-op without one.
pub(super) fn commit_pending<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    if state.is_editing() {
        commit(state, None, ctx)
    } else {
        Ok(state.clone())
    }
}

/// Escape: drop the edit and go back to the edited cell.
///
/// Without an editor, Escape ends any drag and forgets the clipboard.
pub(super) fn cancel<M: CalcModel>(state: &GridState, ctx: &mut Context<'_, M>) -> Result<GridState> {
    let Some(edit) = &state.cell_editing else {
        *ctx.clipboard = None;
        return Ok(GridState {
            drag: None,
            extend_to_area: None,
            ..state.clone()
        });
    };
    let cell = edit.cell();
    let closed = GridState {
        selected_sheet: edit.sheet,
        cell_editing: None,
        drag: None,
        ..state.clone()
    };
    let view = closed.view();
    let layout = ctx.layout(closed.selected_sheet)?;
    let scroll = ctx.viewport.reveal(&layout, view.scroll, cell);
    Ok(closed.with_view(view.select_cell(cell).with_scroll(scroll)))
}

/// Text of a pointed reference to `area` on `sheet`, qualified when the
/// formula lives on another sheet.
fn picked_text<M: CalcModel>(ctx: &Context<'_, M>, edit: &CellEditingState, sheet: u32, area: &Area) -> String {
    let address = area_address(area);
    if sheet == edit.sheet {
        return address;
    }
    let name = usize::try_from(sheet)
        .ok()
        .and_then(|i| ctx.model.model().sheet_names().get(i).cloned());
    match name {
        Some(name) => qualify(&name, &address),
        None => address,
    }
}

/// Put the reference to `area` between `base` and the pick's tail.
fn write_pick<M: CalcModel>(ctx: &Context<'_, M>, edit: &mut CellEditingState, area: &Area) {
    let Some(picking) = &edit.picking else {
        return;
    };
    let reference = picked_text(ctx, edit, picking.sheet, area);
    let caret = edit.base.len() + reference.len();
    edit.text = format!("{}{reference}{}", edit.base, picking.tail);
    edit.cursor_start = caret;
    edit.cursor_end = caret;
}

/// Pointer down on `cell` while the caret sits in a reference position.
pub(super) fn pick_reference<M: CalcModel>(state: &GridState, cell: Cell, ctx: &Context<'_, M>) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    let mut edit = edit.clone();
    let tail = match edit.picking.take() {
        Some(previous) => previous.tail,
        None => {
            let caret = floor_boundary(&edit.text, edit.cursor_start);
            let (head, tail) = edit.text.split_at(caret);
            edit.base = head.to_string();
            tail.to_string()
        }
    };
    edit.picking = Some(Picking {
        anchor: cell,
        sheet: state.selected_sheet,
        tail,
    });
    write_pick(ctx, &mut edit, &Area::from_cell(cell));
    GridState {
        cell_editing: Some(edit),
        drag: Some(Drag::Reference),
        ..state.clone()
    }
}

/// Pointer drag while picking: the reference becomes a range.
pub(super) fn drag_reference<M: CalcModel>(state: &GridState, target: Cell, ctx: &Context<'_, M>) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    let Some(anchor) = edit.picking.as_ref().map(|p| p.anchor) else {
        return state.clone();
    };
    let mut edit = edit.clone();
    write_pick(ctx, &mut edit, &Area::from_corners(anchor, target));
    with_editor(state, edit)
}

/// Cycle the `$` flags of both ends of a reference token.
fn cycled(kind: &TokenKind) -> TokenKind {
    match kind {
        TokenKind::Reference { sheet, cell } => TokenKind::Reference {
            sheet: sheet.clone(),
            cell: cell.cycle_absolute(),
        },
        TokenKind::Range { sheet, start, end } => TokenKind::Range {
            sheet: sheet.clone(),
            start: start.cycle_absolute(),
            end: end.cycle_absolute(),
        },
        other => other.clone(),
    }
}

/// F4: cycle `A1 → $A$1 → A$1 → $A1 → A1`.
///
/// With a bare caret the reference under it cycles and the caret moves to
/// its end. With a selection every reference it overlaps cycles and the
/// selection then spans the rewritten references.
pub(super) fn cycle_reference<M: CalcModel>(state: &GridState, ctx: &Context<'_, M>) -> GridState {
    let Some(edit) = &state.cell_editing else {
        return state.clone();
    };
    if !edit.text.starts_with('=') {
        return state.clone();
    }
    let lo = edit.cursor_start.min(edit.cursor_end);
    let hi = edit.cursor_start.max(edit.cursor_end);
    let tokens = ctx.model.model().tokenize(&edit.text);
    let mut hits: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.is_reference())
        .filter(|t| {
            if lo == hi {
                t.overlaps(lo, hi)
            } else {
                t.start < hi && lo < t.end
            }
        })
        .collect();
    if lo == hi {
        hits.truncate(1);
    }
    if hits.is_empty() {
        return state.clone();
    }

    let mut text = String::with_capacity(edit.text.len() + 4 * hits.len());
    let mut copied = 0;
    let mut first = None;
    let mut last = 0;
    for token in hits {
        let Some(original) = edit.text.get(token.start..token.end) else {
            continue;
        };
        let Some(rendered) = render_reference(sheet_prefix(original), &cycled(&token.kind)) else {
            continue;
        };
        text.push_str(edit.text.get(copied..token.start).unwrap_or_default());
        if first.is_none() {
            first = Some(text.len());
        }
        text.push_str(&rendered);
        last = text.len();
        copied = token.end;
    }
    text.push_str(edit.text.get(copied..).unwrap_or_default());

    let mut edit = CellEditingState {
        text,
        ..edit.clone()
    };
    edit.cursor_start = if lo == hi { last } else { first.unwrap_or(last) };
    edit.cursor_end = last;
    edit.settle_text();
    with_editor(state, edit)
}
