//! Selection and editing state machine.
//!
//! [`reduce`] is the single place where the grid state changes. It takes the
//! current [`GridState`] and an action and returns the next state, calling
//! into the recording model for anything that mutates the workbook. The old
//! state is never modified; a failed transition returns the error and the
//! caller keeps the old state.

mod editing;
mod extend;
mod navigation;
mod pointer;
mod structure;

pub use editing::{is_reference_position, CellEditingState, EditFocus, EditMode, Picking};
pub use extend::{extend_to, ExtendToArea};

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::editor::clipboard::{Clipboard, ClipboardMode};
use crate::editor::UserModel;
use crate::error::Result;
use crate::layout::{SheetLayout, Viewport};
use crate::model::CalcModel;
use crate::types::{Area, Cell, Direction, SheetView, StyleSnapshot};

/// What a held pointer button is dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Drag {
    /// Range selection from `anchor`
    Select { anchor: Cell },
    /// Whole-row selection from row `anchor`
    Rows { anchor: u32 },
    /// Whole-column selection from column `anchor`
    Columns { anchor: u32 },
    /// Fill handle
    FillHandle,
    /// Pointing a reference into the formula being edited
    Reference,
}

/// Complete widget state. Replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState {
    pub selected_sheet: u32,
    /// One view per sheet, in sheet order
    pub views: Vec<SheetView>,
    pub cell_editing: Option<CellEditingState>,
    pub extend_to_area: Option<ExtendToArea>,
    pub drag: Option<Drag>,
    /// Incremented whenever the grid needs to be drawn again
    pub render_request: u64,
}

impl GridState {
    /// Fresh state for a workbook with `sheet_count` sheets.
    pub fn new(sheet_count: u32) -> Self {
        let count = usize::try_from(sheet_count.max(1)).unwrap_or(1);
        Self {
            selected_sheet: 0,
            views: vec![SheetView::default(); count],
            cell_editing: None,
            extend_to_area: None,
            drag: None,
            render_request: 0,
        }
    }

    /// View of the selected sheet.
    pub fn view(&self) -> SheetView {
        self.view_of(self.selected_sheet)
    }

    pub fn view_of(&self, sheet: u32) -> SheetView {
        usize::try_from(sheet)
            .ok()
            .and_then(|i| self.views.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// Copy of the state with the selected sheet's view replaced.
    #[must_use]
    pub fn with_view(&self, view: SheetView) -> Self {
        let mut next = self.clone();
        if let Some(slot) = usize::try_from(self.selected_sheet)
            .ok()
            .and_then(|i| next.views.get_mut(i))
        {
            *slot = view;
        }
        next
    }

    pub fn is_editing(&self) -> bool {
        self.cell_editing.is_some()
    }
}

/// Everything the state machine can be asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GridAction {
    // ---- keyboard navigation ----
    /// Arrow key, or Ctrl+Arrow with `to_edge`
    #[serde(rename_all = "camelCase")]
    Navigate {
        direction: Direction,
        #[serde(default)]
        to_edge: bool,
    },
    /// Shift+Arrow, or Ctrl+Shift+Arrow with `to_edge`
    #[serde(rename_all = "camelCase")]
    Extend {
        direction: Direction,
        #[serde(default)]
        to_edge: bool,
    },
    /// PageUp/PageDown (and Alt+PageUp/PageDown for columns)
    Page { direction: Direction },
    /// Start of the current row
    Home,
    /// Ctrl+Home
    SheetStart,
    /// Ctrl+End
    SheetEnd,

    // ---- programmatic selection ----
    SelectCell { cell: Cell },
    /// Select `area`; its start corner becomes the active cell
    SelectArea { area: Area },
    SelectAll,
    SelectRows { start: u32, end: u32 },
    SelectColumns { start: u32, end: u32 },

    // ---- pointer ----
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    DoubleClick { x: f64, y: f64 },

    // ---- scrolling ----
    Scroll { dx: f64, dy: f64 },
    SetScroll { left: f64, top: f64 },

    // ---- cell editing ----
    /// F2 (`text` = None) or a typed character
    StartEditing {
        #[serde(default)]
        text: Option<String>,
    },
    FocusFormulaBar,
    /// The editor's text changed
    #[serde(rename_all = "camelCase")]
    EditInput {
        text: String,
        cursor_start: usize,
        cursor_end: usize,
    },
    SetCaret { start: usize, end: usize },
    /// Enter/Tab and friends; `None` commits in place
    CommitEditing {
        #[serde(default)]
        direction: Option<Direction>,
    },
    /// Escape
    CancelEditing,
    /// F4
    CycleReference,

    // ---- workbook edits ----
    SetStyle { style: StyleSnapshot },
    DeleteContents,
    InsertRows,
    DeleteRows,
    InsertColumns,
    DeleteColumns,
    SetRowHeight { row: u32, height: Option<f64> },
    SetColumnWidth { column: u32, width: Option<f64> },
    SetFrozenRows { count: u32 },
    SetFrozenColumns { count: u32 },
    SelectSheet { sheet: u32 },
    AddSheet {
        #[serde(default)]
        name: Option<String>,
    },
    RenameSheet { sheet: u32, name: String },
    DeleteSheet { sheet: u32 },

    // ---- clipboard ----
    Copy,
    Cut,
    /// Paste the widget clipboard, or `text` when it came from elsewhere
    Paste {
        #[serde(default)]
        text: Option<String>,
    },

    // ---- history ----
    Undo,
    Redo,
}

/// Everything a transition may read or mutate besides the state itself.
pub struct Context<'a, M> {
    pub model: &'a mut UserModel<M>,
    pub viewport: &'a Viewport,
    pub config: &'a GridConfig,
    pub clipboard: &'a mut Option<Clipboard>,
    /// Identifies the widget that owns `clipboard`
    pub session: u64,
}

impl<M: CalcModel> Context<'_, M> {
    /// Current geometry of `sheet`.
    pub(crate) fn layout(&self, sheet: u32) -> Result<SheetLayout> {
        SheetLayout::from_model(
            self.model.model(),
            sheet,
            self.config.default_row_height,
            self.config.default_column_width,
        )
    }
}

fn clipboard_key(clipboard: Option<&Clipboard>) -> Option<(u64, u32, Area, ClipboardMode)> {
    clipboard.map(|c| (c.session, c.sheet, c.area, c.mode))
}

/// Apply `action` to `state`.
///
/// Returns the next state with `render_request` bumped when anything
/// visible changed. On error the caller keeps `state`; the model and its
/// history are left as they were.
pub fn reduce<M: CalcModel>(
    state: &GridState,
    action: &GridAction,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    log::debug!("dispatch {action:?}");
    let revision = ctx.model.revision();
    let clipboard_before = clipboard_key(ctx.clipboard.as_ref());
    let marks = structure::sheet_marks(ctx.model.model())?;

    // a failed action reverts whatever it applied before failing
    ctx.model.begin_transaction();
    let outcome = transition(state, action, ctx).and_then(|next| {
        if ctx.model.revision() == revision {
            Ok(next)
        } else {
            structure::settle(next, &marks, ctx)
        }
    });
    ctx.model.end_transaction(outcome.is_ok());
    let mut next = outcome?;
    let mutated = ctx.model.revision() != revision;

    next.render_request = state.render_request;
    if next != *state || mutated || clipboard_key(ctx.clipboard.as_ref()) != clipboard_before {
        next.render_request = state.render_request.wrapping_add(1);
    }
    Ok(next)
}

fn transition<M: CalcModel>(
    state: &GridState,
    action: &GridAction,
    ctx: &mut Context<'_, M>,
) -> Result<GridState> {
    use GridAction as A;

    match action {
        A::Navigate { direction, to_edge } => match &state.cell_editing {
            Some(edit) if edit.mode == EditMode::Edit => Ok(editing::move_caret(state, *direction)),
            Some(_) => editing::commit(state, Some(*direction), ctx),
            None => navigation::navigate(state, *direction, *to_edge, ctx),
        },
        A::Extend { direction, to_edge } => keyboard(state, ctx, |s, ctx| {
            extend::extend_selection(s, *direction, *to_edge, ctx)
        }),
        A::Page { direction } => keyboard(state, ctx, |s, ctx| navigation::page(s, *direction, ctx)),
        A::Home => keyboard(state, ctx, navigation::home),
        A::SheetStart => keyboard(state, ctx, navigation::sheet_start),
        A::SheetEnd => keyboard(state, ctx, navigation::sheet_end),

        A::SelectCell { cell } => {
            let state = editing::commit_pending(state, ctx)?;
            navigation::select_cell(&state, *cell, ctx)
        }
        A::SelectArea { area } => {
            let state = editing::commit_pending(state, ctx)?;
            navigation::select_area(&state, *area, ctx)
        }
        A::SelectAll => {
            let state = editing::commit_pending(state, ctx)?;
            Ok(state.with_view(state.view().select_all()))
        }
        A::SelectRows { start, end } => {
            let state = editing::commit_pending(state, ctx)?;
            Ok(navigation::select_rows(&state, *start, *end))
        }
        A::SelectColumns { start, end } => {
            let state = editing::commit_pending(state, ctx)?;
            Ok(navigation::select_columns(&state, *start, *end))
        }

        A::PointerDown { x, y, shift } => pointer::pointer_down(state, *x, *y, *shift, ctx),
        A::PointerMove { x, y } => pointer::pointer_move(state, *x, *y, ctx),
        A::PointerUp => pointer::pointer_up(state, ctx),
        A::DoubleClick { x, y } => pointer::double_click(state, *x, *y, ctx),

        A::Scroll { dx, dy } => navigation::scroll_by(state, *dx, *dy, ctx),
        A::SetScroll { left, top } => navigation::scroll_to(state, *left, *top, ctx),

        A::StartEditing { text } => editing::start(state, text.as_deref(), EditFocus::Cell, ctx),
        A::FocusFormulaBar => editing::start(state, None, EditFocus::FormulaBar, ctx),
        A::EditInput {
            text,
            cursor_start,
            cursor_end,
        } => Ok(editing::input(state, text, *cursor_start, *cursor_end)),
        A::SetCaret { start, end } => Ok(editing::set_caret(state, *start, *end)),
        A::CommitEditing { direction } => editing::commit(state, *direction, ctx),
        A::CancelEditing => editing::cancel(state, ctx),
        A::CycleReference => Ok(editing::cycle_reference(state, ctx)),

        A::SetStyle { style } => structure::set_style(state, style, ctx),
        A::DeleteContents => structure::delete_contents(state, ctx),
        A::InsertRows => structure::insert_rows(state, ctx),
        A::DeleteRows => structure::delete_rows(state, ctx),
        A::InsertColumns => structure::insert_columns(state, ctx),
        A::DeleteColumns => structure::delete_columns(state, ctx),
        A::SetRowHeight { row, height } => {
            ctx.model.set_row_height(state.selected_sheet, *row, *height)?;
            Ok(state.clone())
        }
        A::SetColumnWidth { column, width } => {
            ctx.model
                .set_column_width(state.selected_sheet, *column, *width)?;
            Ok(state.clone())
        }
        A::SetFrozenRows { count } => {
            ctx.model.set_frozen_rows(state.selected_sheet, *count)?;
            Ok(state.clone())
        }
        A::SetFrozenColumns { count } => {
            ctx.model.set_frozen_columns(state.selected_sheet, *count)?;
            Ok(state.clone())
        }
        A::SelectSheet { sheet } => structure::select_sheet(state, *sheet, ctx),
        A::AddSheet { name } => structure::add_sheet(state, name.as_deref(), ctx),
        A::RenameSheet { sheet, name } => {
            ctx.model.rename_sheet(*sheet, name)?;
            Ok(state.clone())
        }
        A::DeleteSheet { sheet } => structure::delete_sheet(state, *sheet, ctx),

        A::Copy => structure::copy(state, false, ctx),
        A::Cut => structure::copy(state, true, ctx),
        A::Paste { text } => structure::paste(state, text.as_deref(), ctx),

        A::Undo => structure::undo(state, ctx),
        A::Redo => structure::redo(state, ctx),
    }
}

/// Run a keyboard selection action: ignored while the caret is being moved
/// inside the editor, and commits a freshly typed entry first.
fn keyboard<M: CalcModel>(
    state: &GridState,
    ctx: &mut Context<'_, M>,
    f: impl FnOnce(&GridState, &mut Context<'_, M>) -> Result<GridState>,
) -> Result<GridState> {
    match &state.cell_editing {
        Some(edit) if edit.mode == EditMode::Edit => Ok(state.clone()),
        Some(_) => {
            let committed = editing::commit(state, None, ctx)?;
            f(&committed, ctx)
        }
        None => f(state, ctx),
    }
}
