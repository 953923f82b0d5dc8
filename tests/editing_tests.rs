//! Tests for in-place cell editing: start, commit, escape and caret keys.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use common::*;
use xlgrid::state::{EditFocus, EditMode};
use xlgrid::{Cell, Command, Direction, GridAction, KeyEvent};

#[test]
fn test_type_then_tab_moves_right_in_one_transaction() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "5");
    assert!(w.key_down(&KeyEvent::new("Tab")));

    assert!(!w.state().is_editing());
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 2));
    assert_eq!(value(&w, 0, 1, 1), "5");
    assert_eq!(undo_len(&w), 1);
    let history = w.model().unwrap().history();
    assert_eq!(
        history.last_transaction(),
        Some(&vec![Command::SetCellValue {
            sheet: 0,
            row: 1,
            column: 1,
            old_value: String::new(),
            new_value: "5".into(),
        }])
    );
}

#[test]
fn test_commit_directions() {
    let mut w = widget();
    select(&mut w, 3, 3);
    type_text(&mut w, "a");
    run(&mut w, GridAction::CommitEditing { direction: Some(Direction::Down) });
    assert_eq!(w.state().view().selected_cell, Cell::new(4, 3));

    type_text(&mut w, "b");
    assert!(w.key_down(&KeyEvent::new("Enter").with_shift()));
    assert_eq!(w.state().view().selected_cell, Cell::new(3, 3));

    type_text(&mut w, "c");
    assert!(w.key_down(&KeyEvent::new("Tab").with_shift()));
    assert_eq!(w.state().view().selected_cell, Cell::new(3, 2));
}

#[test]
fn test_commit_clamps_at_the_grid_edge() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "top");
    run(&mut w, GridAction::CommitEditing { direction: Some(Direction::Up) });
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 1));
    assert_eq!(value(&w, 0, 1, 1), "top");
}

#[test]
fn test_commit_without_direction_stays() {
    let mut w = widget();
    select(&mut w, 2, 2);
    type_text(&mut w, "here");
    run(&mut w, GridAction::CommitEditing { direction: None });
    assert_eq!(w.state().view().selected_cell, Cell::new(2, 2));
    assert!(!w.state().is_editing());
}

#[test]
fn test_failed_commit_keeps_editor_and_history() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "=SUM(A1");
    let before = w.state().clone();

    w.key_down(&KeyEvent::new("Enter"));
    assert!(w.last_error().is_some());
    assert_eq!(w.state(), &before);
    assert_eq!(editor_text(&w), "=SUM(A1");
    assert_eq!(undo_len(&w), 0);
    assert_eq!(value(&w, 0, 1, 1), "");
}

#[test]
fn test_escape_discards_and_restores_selection() {
    let mut w = widget_with(workbook(&[(2, 2, "keep")]));
    select(&mut w, 2, 2);
    run(&mut w, GridAction::StartEditing { text: None });
    edit(&mut w, "changed");
    assert!(w.key_down(&KeyEvent::new("Escape")));

    assert!(!w.state().is_editing());
    assert_eq!(w.state().view().selected_cell, Cell::new(2, 2));
    assert_eq!(value(&w, 0, 2, 2), "keep");
    assert_eq!(undo_len(&w), 0);
}

#[test]
fn test_f2_loads_input_with_quote_prefix() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "'007");
    run(&mut w, GridAction::CommitEditing { direction: None });
    assert_eq!(value(&w, 0, 1, 1), "007");

    assert!(w.key_down(&KeyEvent::new("F2")));
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!(edit.text, "'007");
    assert_eq!(edit.mode, EditMode::Edit);
    assert_eq!(edit.focus, EditFocus::Cell);
    assert_eq!((edit.cursor_start, edit.cursor_end), (4, 4));
}

#[test]
fn test_typed_character_starts_init_mode() {
    let mut w = widget_with(workbook(&[(1, 1, "old")]));
    assert!(w.key_down(&KeyEvent::new("x")));
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!(edit.text, "x");
    assert_eq!(edit.base, "x");
    assert_eq!(edit.mode, EditMode::Init);
}

#[test]
fn test_arrows_commit_in_init_mode() {
    let mut w = widget();
    select(&mut w, 5, 5);
    type_text(&mut w, "12");
    assert!(w.key_down(&KeyEvent::new("ArrowRight")));
    assert!(!w.state().is_editing());
    assert_eq!(w.state().view().selected_cell, Cell::new(5, 6));
    assert_eq!(value(&w, 0, 5, 5), "12");
}

#[test]
fn test_arrows_move_caret_in_edit_mode() {
    let mut w = widget_with(workbook(&[(1, 1, "héllo")]));
    run(&mut w, GridAction::StartEditing { text: None });
    let end = "héllo".len();

    w.key_down(&KeyEvent::new("ArrowLeft"));
    w.key_down(&KeyEvent::new("ArrowLeft"));
    w.key_down(&KeyEvent::new("ArrowLeft"));
    w.key_down(&KeyEvent::new("ArrowLeft"));
    let edit = w.state().cell_editing.clone().unwrap();
    // back over "llo" and the two-byte "é"
    assert_eq!(edit.cursor_start, end - 5);
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 1));

    w.key_down(&KeyEvent::new("ArrowUp"));
    assert_eq!(w.state().cell_editing.as_ref().unwrap().cursor_start, end - 5);
}

#[test]
fn test_focus_formula_bar_switches_to_edit_mode() {
    let mut w = widget();
    type_text(&mut w, "4");
    run(&mut w, GridAction::FocusFormulaBar);
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!(edit.mode, EditMode::Edit);
    assert_eq!(edit.focus, EditFocus::FormulaBar);
    assert_eq!(edit.text, "4");
}

#[test]
fn test_caret_snaps_to_char_boundary() {
    let mut w = widget();
    type_text(&mut w, "é");
    run(&mut w, GridAction::SetCaret { start: 1, end: 1 });
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!((edit.cursor_start, edit.cursor_end), (0, 0));
}

#[test]
fn test_double_click_opens_editor() {
    let mut w = widget_with(workbook(&[(3, 2, "=A1")]));
    let (x, y) = center(Cell::new(3, 2));
    w.double_click(x, y);
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!((edit.row, edit.column), (3, 2));
    assert_eq!(edit.text, "=A1");
    assert_eq!(edit.mode, EditMode::Edit);
}

#[test]
fn test_keyboard_selection_commits_init_entry() {
    let mut w = widget();
    select(&mut w, 2, 2);
    type_text(&mut w, "v");
    run(&mut w, GridAction::Home);
    assert!(!w.state().is_editing());
    assert_eq!(value(&w, 0, 2, 2), "v");
    assert_eq!(w.state().view().selected_cell, Cell::new(2, 1));
}

#[test]
fn test_undo_is_ignored_while_editing() {
    let mut w = widget();
    type_text(&mut w, "1");
    run(&mut w, GridAction::CommitEditing { direction: None });
    type_text(&mut w, "2");
    run(&mut w, GridAction::Undo);
    assert!(w.state().is_editing());
    assert_eq!(value(&w, 0, 1, 1), "1");
}
