//! Pointing at cells while writing a formula, and F4 cycling.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use common::*;
use xlgrid::state::Drag;
use xlgrid::{Cell, GridAction, KeyEvent};

#[test]
fn test_click_then_drag_points_a_range() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "=");

    let (x, y) = center(Cell::new(3, 3));
    w.pointer_down(x, y, false);
    assert_eq!(editor_text(&w), "=C3");
    assert_eq!(w.state().drag, Some(Drag::Reference));
    assert!(w.has_capture());

    let (x, y) = center(Cell::new(5, 4));
    w.pointer_move(x, y);
    assert_eq!(editor_text(&w), "=C3:D5");
    w.pointer_up();

    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!((edit.cursor_start, edit.cursor_end), (6, 6));
    // the active cell never left the edited cell
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 1));
    assert_eq!(undo_len(&w), 0);
}

#[test]
fn test_second_click_replaces_the_pick() {
    let mut w = widget();
    type_text(&mut w, "=SUM(");
    click(&mut w, Cell::new(2, 2));
    assert_eq!(editor_text(&w), "=SUM(B2");
    click(&mut w, Cell::new(4, 1));
    assert_eq!(editor_text(&w), "=SUM(A4");
}

#[test]
fn test_pick_keeps_text_after_the_caret() {
    let mut w = widget();
    type_text(&mut w, "=SUM()");
    run(&mut w, GridAction::SetCaret { start: 5, end: 5 });
    click(&mut w, Cell::new(2, 3));
    assert_eq!(editor_text(&w), "=SUM(C2)");
    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!(edit.cursor_start, 7);
}

#[test]
fn test_typing_an_operator_appends_the_next_pick() {
    let mut w = widget();
    type_text(&mut w, "=");
    click(&mut w, Cell::new(3, 3));
    edit(&mut w, "=C3+");
    click(&mut w, Cell::new(4, 4));
    assert_eq!(editor_text(&w), "=C3+D4");

    run(&mut w, GridAction::CommitEditing { direction: None });
    assert_eq!(value(&w, 0, 1, 1), "=C3+D4");
}

#[test]
fn test_click_outside_reference_position_commits() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "=B1");
    click(&mut w, Cell::new(4, 2));

    assert!(!w.state().is_editing());
    assert_eq!(value(&w, 0, 1, 1), "=B1");
    assert_eq!(w.state().view().selected_cell, Cell::new(4, 2));
}

#[test]
fn test_plain_text_never_picks() {
    let mut w = widget();
    type_text(&mut w, "+");
    click(&mut w, Cell::new(2, 2));
    assert!(!w.state().is_editing());
    assert_eq!(value(&w, 0, 1, 1), "+");
}

#[test]
fn test_click_on_edited_cell_keeps_editor() {
    let mut w = widget();
    select(&mut w, 2, 2);
    type_text(&mut w, "abc");
    click(&mut w, Cell::new(2, 2));
    assert_eq!(editor_text(&w), "abc");
}

#[test]
fn test_cross_sheet_pick_is_qualified() {
    let mut w = widget_with(sheets(&["Main", "Data"]));
    type_text(&mut w, "=");
    run(&mut w, GridAction::SelectSheet { sheet: 1 });
    assert!(w.state().is_editing());
    assert_eq!(w.state().selected_sheet, 1);

    click(&mut w, Cell::new(2, 2));
    assert_eq!(editor_text(&w), "=Data!B2");

    w.key_down(&KeyEvent::new("Enter"));
    assert_eq!(w.state().selected_sheet, 0);
    assert_eq!(w.state().view().selected_cell, Cell::new(2, 1));
    assert_eq!(value(&w, 0, 1, 1), "=Data!B2");
    assert_eq!(value(&w, 1, 1, 1), "");
}

#[test]
fn test_sheet_names_with_spaces_are_quoted() {
    let mut w = widget_with(sheets(&["Main", "Q1 Data"]));
    type_text(&mut w, "=");
    run(&mut w, GridAction::SelectSheet { sheet: 1 });
    click(&mut w, Cell::new(1, 1));
    assert_eq!(editor_text(&w), "='Q1 Data'!A1");
}

#[test]
fn test_switching_sheet_outside_reference_position_commits() {
    let mut w = widget_with(sheets(&["Main", "Data"]));
    type_text(&mut w, "42");
    run(&mut w, GridAction::SelectSheet { sheet: 1 });
    assert!(!w.state().is_editing());
    assert_eq!(w.state().selected_sheet, 1);
    assert_eq!(value(&w, 0, 1, 1), "42");
}

#[test]
fn test_f4_cycles_reference_under_caret() {
    let mut w = widget();
    type_text(&mut w, "=A1+B2");
    run(&mut w, GridAction::SetCaret { start: 2, end: 2 });

    let expected = [("=$A$1+B2", 5), ("=A$1+B2", 4), ("=$A1+B2", 4), ("=A1+B2", 3)];
    for (text, caret) in expected {
        assert!(w.key_down(&KeyEvent::new("F4")));
        let edit = w.state().cell_editing.clone().unwrap();
        assert_eq!(edit.text, text);
        assert_eq!((edit.cursor_start, edit.cursor_end), (caret, caret));
    }
}

#[test]
fn test_f4_cycles_every_reference_in_selection() {
    let mut w = widget();
    type_text(&mut w, "=A1+B2:C3");
    run(&mut w, GridAction::SetCaret { start: 0, end: 9 });
    run(&mut w, GridAction::CycleReference);

    let edit = w.state().cell_editing.clone().unwrap();
    assert_eq!(edit.text, "=$A$1+$B$2:$C$3");
    assert_eq!((edit.cursor_start, edit.cursor_end), (1, 15));
}

#[test]
fn test_f4_without_reference_does_nothing() {
    let mut w = widget();
    type_text(&mut w, "=1+2");
    let before = w.state().clone();
    run(&mut w, GridAction::CycleReference);
    assert_eq!(w.state(), &before);

    type_text(&mut w, "A1");
    let edit = w.state().cell_editing.clone().unwrap();
    run(&mut w, GridAction::CycleReference);
    assert_eq!(w.state().cell_editing.as_ref(), Some(&edit));
}

#[test]
fn test_f4_keeps_sheet_prefix() {
    let mut w = widget_with(sheets(&["Main", "Data"]));
    type_text(&mut w, "=Data!B2");
    run(&mut w, GridAction::CycleReference);
    assert_eq!(editor_text(&w), "=Data!$B$2");
}

#[test]
fn test_click_in_front_of_a_reference_commits() {
    let mut w = widget();
    select(&mut w, 1, 1);
    type_text(&mut w, "=SUM(A2)");
    run(&mut w, GridAction::SetCaret { start: 5, end: 5 });
    click(&mut w, Cell::new(3, 3));
    assert!(!w.state().is_editing());
    assert_eq!(value(&w, 0, 1, 1), "=SUM(A2)");
    assert_eq!(w.state().view().selected_cell, Cell::new(3, 3));
}
