//! Frozen rows and columns: hit testing, scroll resets and navigation
//! across the frozen band.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::float_cmp)]

mod common;

use common::*;
use xlgrid::layout::FROZEN_SEPARATOR_WIDTH;
use xlgrid::{CalcModel, Cell, Direction, GridAction, GridWidget, KeyEvent, MemoryModel, ScrollPosition};

/// Widget with two frozen rows, scrolled so row 8 is the first scrollable row.
fn frozen_and_scrolled() -> GridWidget<MemoryModel> {
    let mut w = widget();
    run(&mut w, GridAction::SetFrozenRows { count: 2 });
    run(&mut w, GridAction::SetScroll { left: 0.0, top: 100.0 });
    assert_eq!(w.state().view().scroll.top, 100.0);
    w
}

#[test]
fn test_freezing_resets_scroll_on_that_axis() {
    let mut w = widget();
    run(&mut w, GridAction::SetScroll { left: 128.0, top: 200.0 });
    run(&mut w, GridAction::SetFrozenRows { count: 2 });
    assert_eq!(w.state().view().scroll, ScrollPosition::new(128.0, 0.0));

    run(&mut w, GridAction::SetScroll { left: 128.0, top: 200.0 });
    run(&mut w, GridAction::SetFrozenColumns { count: 1 });
    assert_eq!(w.state().view().scroll, ScrollPosition::new(0.0, 200.0));
}

#[test]
fn test_undoing_a_freeze_resets_scroll_again() {
    let mut w = frozen_and_scrolled();
    run(&mut w, GridAction::Undo);
    assert_eq!(w.model().unwrap().model().frozen_rows(0).unwrap(), 0);
    assert_eq!(w.state().view().scroll.top, 0.0);
}

#[test]
fn test_click_below_band_accounts_for_scroll() {
    let mut w = frozen_and_scrolled();
    // header 20 + two frozen rows 40 + separator
    let y = 20.0 + 40.0 + FROZEN_SEPARATOR_WIDTH + 5.0;
    w.pointer_down(72.0, y, false);
    w.pointer_up();
    assert_eq!(w.state().view().selected_cell, Cell::new(8, 1));
}

#[test]
fn test_click_in_band_ignores_scroll() {
    let mut w = frozen_and_scrolled();
    click(&mut w, Cell::new(2, 2));
    assert_eq!(w.state().view().selected_cell, Cell::new(2, 2));
    assert_eq!(w.state().view().scroll.top, 100.0);
}

#[test]
fn test_click_on_separator_does_nothing() {
    let mut w = frozen_and_scrolled();
    let before = w.state().clone();
    w.pointer_down(72.0, 20.0 + 40.0 + 1.0, false);
    w.pointer_up();
    assert_eq!(w.state().view(), before.view());
}

#[test]
fn test_leaving_the_band_starts_scroll_from_the_top() {
    let mut w = frozen_and_scrolled();
    click(&mut w, Cell::new(2, 1));
    run(&mut w, GridAction::Navigate { direction: Direction::Down, to_edge: false });
    assert_eq!(w.state().view().selected_cell, Cell::new(3, 1));
    assert_eq!(w.state().view().scroll.top, 0.0);
}

#[test]
fn test_scroll_never_stops_inside_the_band() {
    let mut w = frozen_and_scrolled();
    run(&mut w, GridAction::SetScroll { left: 0.0, top: 15.0 });
    assert_eq!(w.state().view().scroll.top, 0.0);
    run(&mut w, GridAction::SetScroll { left: 0.0, top: 21.0 });
    assert_eq!(w.state().view().scroll.top, 20.0);
    let window = w.visible_window().unwrap();
    assert_eq!(window.frozen_rows, 2);
    assert_eq!(window.rows.0, 4);
}

#[test]
fn test_visible_window_starts_after_frozen_rows() {
    let mut w = widget();
    run(&mut w, GridAction::SetFrozenRows { count: 2 });
    let window = w.visible_window().unwrap();
    // 537px below the band: rows 3..=29
    assert_eq!(window.rows, (3, 29));
}

#[test]
fn test_ctrl_home_goes_to_first_unfrozen_cell() {
    let mut w = widget();
    run(&mut w, GridAction::SetFrozenRows { count: 2 });
    run(&mut w, GridAction::SetFrozenColumns { count: 1 });
    select(&mut w, 200, 20);
    assert!(w.key_down(&KeyEvent::new("Home").with_ctrl()));
    assert_eq!(w.state().view().selected_cell, Cell::new(3, 2));
    assert_eq!(w.state().view().scroll, ScrollPosition::default());
}

#[test]
fn test_frozen_column_hit() {
    let mut w = widget();
    run(&mut w, GridAction::SetFrozenColumns { count: 1 });
    run(&mut w, GridAction::SetScroll { left: 64.0, top: 0.0 });
    // column 1 stays put, column 3 is the first scrollable one on screen
    click(&mut w, Cell::new(1, 1));
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 1));
    let x = 40.0 + 64.0 + FROZEN_SEPARATOR_WIDTH + 10.0;
    w.pointer_down(x, 30.0, false);
    w.pointer_up();
    assert_eq!(w.state().view().selected_cell, Cell::new(1, 3));
}

#[test]
fn test_other_sheets_keep_their_scroll() {
    let mut w = widget_with(sheets(&["A", "B"]));
    run(&mut w, GridAction::SelectSheet { sheet: 1 });
    run(&mut w, GridAction::SetScroll { left: 0.0, top: 200.0 });
    run(&mut w, GridAction::SelectSheet { sheet: 0 });
    run(&mut w, GridAction::SetFrozenRows { count: 3 });
    assert_eq!(w.state().view_of(1).scroll.top, 200.0);
}
