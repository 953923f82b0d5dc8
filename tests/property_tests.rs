//! Property tests for the state machine and the undo history.
//! CI: 128 cases. Soak: PROPTEST_CASES=5000 cargo test --release
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::float_cmp)]

mod common;

use common::*;
use proptest::prelude::*;
use xlgrid::state::extend_to;
use xlgrid::{Area, Border, CalcModel, Cell, Direction, GridAction, GridWidget, MemoryModel, LAST_COLUMN, LAST_ROW};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn arb_border() -> impl Strategy<Value = Option<Border>> {
    prop::option::of(prop_oneof![
        Just(Border::Top),
        Just(Border::Bottom),
        Just(Border::Left),
        Just(Border::Right),
    ])
}

fn arb_cell() -> impl Strategy<Value = Cell> {
    (1..60u32, 1..30u32).prop_map(|(row, column)| Cell::new(row, column))
}

/// Input that can reach the state machine without editing.
#[derive(Debug, Clone)]
enum Step {
    Action(GridAction),
    Down(f64, f64, bool),
    Move(f64, f64),
    Up,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (arb_direction(), any::<bool>())
            .prop_map(|(direction, to_edge)| Step::Action(GridAction::Navigate { direction, to_edge })),
        (arb_direction(), any::<bool>())
            .prop_map(|(direction, to_edge)| Step::Action(GridAction::Extend { direction, to_edge })),
        arb_direction().prop_map(|direction| Step::Action(GridAction::Page { direction })),
        arb_cell().prop_map(|cell| Step::Action(GridAction::SelectCell { cell })),
        (arb_cell(), arb_cell()).prop_map(|(a, b)| Step::Action(GridAction::SelectArea {
            area: Area::new(a.row, b.row, a.column, b.column),
        })),
        (1..40u32, 1..40u32).prop_map(|(start, end)| Step::Action(GridAction::SelectRows { start, end })),
        Just(Step::Action(GridAction::SelectAll)),
        Just(Step::Action(GridAction::Home)),
        Just(Step::Action(GridAction::SheetStart)),
        Just(Step::Action(GridAction::SheetEnd)),
        (-2000.0..2000.0f64, -2000.0..2000.0f64)
            .prop_map(|(dx, dy)| Step::Action(GridAction::Scroll { dx, dy })),
        (-100.0..5000.0f64, -100.0..5000.0f64)
            .prop_map(|(left, top)| Step::Action(GridAction::SetScroll { left, top })),
        (0..4u32).prop_map(|count| Step::Action(GridAction::SetFrozenRows { count })),
        (0..3u32).prop_map(|count| Step::Action(GridAction::SetFrozenColumns { count })),
        (0.0..WIDTH, 0.0..HEIGHT, any::<bool>()).prop_map(|(x, y, shift)| Step::Down(x, y, shift)),
        (-50.0..WIDTH + 50.0, -50.0..HEIGHT + 50.0).prop_map(|(x, y)| Step::Move(x, y)),
        Just(Step::Up),
    ]
}

fn apply(w: &mut GridWidget<MemoryModel>, step: &Step) {
    match step {
        Step::Action(action) => {
            w.dispatch(action);
        }
        Step::Down(x, y, shift) => {
            w.pointer_down(*x, *y, *shift);
        }
        Step::Move(x, y) => {
            w.pointer_move(*x, *y);
        }
        Step::Up => {
            w.pointer_up();
        }
    }
}

/// Data around the top-left so Ctrl+arrows have edges to find.
fn seeded() -> GridWidget<MemoryModel> {
    widget_with(workbook(&[(1, 1, "a"), (2, 1, "b"), (5, 3, "c"), (12, 7, "d"), (40, 2, "e")]))
}

/// Edits whose undo must restore the workbook.
fn arb_edit() -> impl Strategy<Value = Vec<GridAction>> {
    prop_oneof![
        (arb_cell(), "[a-z0-9]{1,4}").prop_map(|(cell, text)| vec![
            GridAction::SelectCell { cell },
            GridAction::StartEditing { text: Some(text) },
            GridAction::CommitEditing { direction: None },
        ]),
        arb_cell().prop_map(|cell| vec![GridAction::SelectCell { cell }, GridAction::DeleteContents]),
        arb_cell().prop_map(|cell| vec![GridAction::SelectCell { cell }, GridAction::InsertRows]),
        arb_cell().prop_map(|cell| vec![GridAction::SelectCell { cell }, GridAction::DeleteRows]),
        arb_cell().prop_map(|cell| vec![GridAction::SelectCell { cell }, GridAction::InsertColumns]),
        arb_cell().prop_map(|cell| vec![GridAction::SelectCell { cell }, GridAction::DeleteColumns]),
        (1..30u32, 5.0..80.0f64).prop_map(|(row, height)| vec![GridAction::SetRowHeight {
            row,
            height: Some(height),
        }]),
        (0..3u32).prop_map(|count| vec![GridAction::SetFrozenRows { count }]),
        Just(vec![GridAction::AddSheet { name: None }]),
        (arb_cell(), arb_cell()).prop_map(|(from, to)| vec![
            GridAction::SelectCell { cell: from },
            GridAction::Copy,
            GridAction::SelectCell { cell: to },
            GridAction::Paste { text: None },
        ]),
    ]
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn prop_selected_cell_stays_inside_selection(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut w = seeded();
        for step in &steps {
            apply(&mut w, step);
            let view = w.state().view();
            prop_assert!(view.selected_area.contains(view.selected_cell), "{step:?} left {view:?}");
            let cell = view.selected_cell;
            prop_assert!((1..=LAST_ROW).contains(&cell.row));
            prop_assert!((1..=LAST_COLUMN).contains(&cell.column));
        }
    }

    #[test]
    fn prop_scroll_stops_on_row_and_column_starts(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut w = seeded();
        for step in &steps {
            apply(&mut w, step);
            // no resized rows or columns, so every stop is a multiple of the default size
            let scroll = w.state().view().scroll;
            prop_assert!(scroll.top >= 0.0 && scroll.left >= 0.0);
            prop_assert_eq!((scroll.top / 20.0).fract(), 0.0, "top {}", scroll.top);
            prop_assert_eq!((scroll.left / 64.0).fract(), 0.0, "left {}", scroll.left);
        }
    }

    #[test]
    fn prop_undo_all_restores_workbook(edits in prop::collection::vec(arb_edit(), 1..12)) {
        let mut w = seeded();
        let original = w.model().unwrap().model().to_json().unwrap();
        for edit in &edits {
            for action in edit {
                w.dispatch(action);
            }
        }
        let edited = w.model().unwrap().model().to_json().unwrap();

        while w.model().unwrap().can_undo() {
            prop_assert!(w.dispatch(&GridAction::Undo));
        }
        prop_assert_eq!(w.model().unwrap().model().to_json().unwrap(), original);

        while w.model().unwrap().can_redo() {
            w.dispatch(&GridAction::Redo);
        }
        prop_assert_eq!(w.model().unwrap().model().to_json().unwrap(), edited);
    }

    #[test]
    fn prop_fill_handle_block_shares_one_edge(
        from in arb_cell(),
        to in arb_cell(),
        target in arb_cell(),
        previous in arb_border(),
    ) {
        let selection = Area::new(from.row, to.row, from.column, to.column).normalized();
        let Some(extend) = extend_to(&selection, target, previous) else {
            prop_assert!(selection.contains(target));
            return Ok(());
        };
        prop_assert!(!selection.contains(target));
        let block = extend.area;
        prop_assert!(!block.intersects(&selection), "{block:?} overlaps {selection:?}");
        match extend.border {
            Border::Top | Border::Bottom => {
                prop_assert_eq!((block.column_start, block.column_end), (selection.column_start, selection.column_end));
            }
            Border::Left | Border::Right => {
                prop_assert_eq!((block.row_start, block.row_end), (selection.row_start, selection.row_end));
            }
        }
        match extend.border {
            Border::Top => {
                prop_assert_eq!(block.row_end + 1, selection.row_start);
                prop_assert_eq!(block.row_start, target.row);
            }
            Border::Bottom => {
                prop_assert_eq!(block.row_start, selection.row_end + 1);
                prop_assert_eq!(block.row_end, target.row);
            }
            Border::Left => {
                prop_assert_eq!(block.column_end + 1, selection.column_start);
                prop_assert_eq!(block.column_start, target.column);
            }
            Border::Right => {
                prop_assert_eq!(block.column_start, selection.column_end + 1);
                prop_assert_eq!(block.column_end, target.column);
            }
        }
    }
}
