//! Common test utilities and assertion helpers.
//!
//! Widgets here use the default configuration: 40px row headers, 20px column
//! headers, 20px rows and 64px columns on an 800x600 viewport.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use serde_json::json;
use xlgrid::{CalcModel, Cell, GridAction, GridConfig, GridWidget, MemoryModel};

pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 600.0;

/// Widget over an empty one-sheet workbook.
pub fn widget() -> GridWidget<MemoryModel> {
    GridWidget::with_model(MemoryModel::new(), GridConfig::default(), WIDTH, HEIGHT)
}

pub fn widget_with(model: MemoryModel) -> GridWidget<MemoryModel> {
    GridWidget::with_model(model, GridConfig::default(), WIDTH, HEIGHT)
}

/// Workbook with `cells` as `(row, column, input)` on `Sheet1`.
pub fn workbook(cells: &[(u32, u32, &str)]) -> MemoryModel {
    let mut model = MemoryModel::new();
    for (row, column, input) in cells {
        model.set_input(0, *row, *column, input).unwrap();
    }
    model
}

/// Workbook with the given sheet names, all empty.
pub fn sheets(names: &[&str]) -> MemoryModel {
    let sheets: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
    MemoryModel::from_json(&json!({ "sheets": sheets }).to_string()).unwrap()
}

/// Screen point at the centre of `cell`, unscrolled and unfrozen.
pub fn center(cell: Cell) -> (f64, f64) {
    (
        40.0 + f64::from(cell.column - 1) * 64.0 + 32.0,
        20.0 + f64::from(cell.row - 1) * 20.0 + 10.0,
    )
}

/// Screen point of the bottom-right corner of `cell`, where the fill handle sits.
pub fn corner(cell: Cell) -> (f64, f64) {
    (
        40.0 + f64::from(cell.column) * 64.0,
        20.0 + f64::from(cell.row) * 20.0,
    )
}

/// Dispatch and require success.
pub fn run(widget: &mut GridWidget<MemoryModel>, action: GridAction) {
    widget.dispatch(&action);
    assert_eq!(widget.last_error(), None, "{action:?} failed");
}

pub fn select(widget: &mut GridWidget<MemoryModel>, row: u32, column: u32) {
    run(widget, GridAction::SelectCell { cell: Cell::new(row, column) });
}

/// Start typing `text` over the selected cell, caret at the end.
pub fn type_text(widget: &mut GridWidget<MemoryModel>, text: &str) {
    let first: String = text.chars().take(1).collect();
    run(widget, GridAction::StartEditing { text: Some(first) });
    edit(widget, text);
}

/// Replace the editor text, caret at the end.
pub fn edit(widget: &mut GridWidget<MemoryModel>, text: &str) {
    run(
        widget,
        GridAction::EditInput {
            text: text.to_string(),
            cursor_start: text.len(),
            cursor_end: text.len(),
        },
    );
}

pub fn click(widget: &mut GridWidget<MemoryModel>, cell: Cell) {
    let (x, y) = center(cell);
    widget.pointer_down(x, y, false);
    widget.pointer_up();
}

pub fn value(widget: &GridWidget<MemoryModel>, sheet: u32, row: u32, column: u32) -> String {
    widget
        .model()
        .expect("model")
        .model()
        .get_value(sheet, row, column)
        .unwrap()
}

pub fn editor_text(widget: &GridWidget<MemoryModel>) -> String {
    widget
        .state()
        .cell_editing
        .as_ref()
        .expect("editor open")
        .text
        .clone()
}

pub fn undo_len(widget: &GridWidget<MemoryModel>) -> usize {
    widget.model().expect("model").history().undo_len()
}
