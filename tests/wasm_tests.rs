#![cfg(target_arch = "wasm32")]
//! Browser binding smoke tests, run with `wasm-pack test --headless --chrome`.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::wasm_bindgen_test;

use xlgrid::wasm::XlGrid;
use xlgrid::{GridState, VisibleWindow};

fn js(text: &str) -> JsValue {
    js_sys::JSON::parse(text).unwrap()
}

fn grid() -> XlGrid {
    XlGrid::new(800.0, 600.0, JsValue::UNDEFINED).unwrap()
}

#[wasm_bindgen_test]
fn dispatch_accepts_plain_objects() {
    let mut grid = grid();
    let changed = grid
        .dispatch(js(r#"{ "type": "selectCell", "cell": { "row": 3, "column": 2 } }"#))
        .unwrap();
    assert!(changed);
    let state: GridState = serde_wasm_bindgen::from_value(grid.state().unwrap()).unwrap();
    assert_eq!(state.view().selected_cell, xlgrid::Cell::new(3, 2));
}

#[wasm_bindgen_test]
fn malformed_actions_are_rejected() {
    let mut grid = grid();
    assert!(grid.dispatch(js(r#"{ "type": "noSuchAction" }"#)).is_err());
}

#[wasm_bindgen_test]
fn edit_and_undo_round_trip_through_json() {
    let mut grid = grid();
    let empty = grid.to_json().unwrap();
    grid.dispatch(js(r#"{ "type": "startEditing", "text": "4" }"#)).unwrap();
    grid.dispatch(js(r#"{ "type": "commitEditing", "direction": "down" }"#)).unwrap();
    assert!(grid.can_undo());
    assert_ne!(grid.to_json().unwrap(), empty);

    grid.dispatch(js(r#"{ "type": "undo" }"#)).unwrap();
    assert_eq!(grid.to_json().unwrap(), empty);
    assert!(grid.can_redo());
}

#[wasm_bindgen_test]
fn config_object_is_partial() {
    let mut grid = XlGrid::new(800.0, 600.0, js(r#"{ "defaultRowHeight": 30 }"#)).unwrap();
    let window: Option<VisibleWindow> = serde_wasm_bindgen::from_value(grid.visible_window().unwrap()).unwrap();
    // 580px at 30px a row: 19 whole rows and part of row 20
    assert_eq!(window.unwrap().rows, (1, 20));

    grid.resize(800.0, 320.0);
    let window: Option<VisibleWindow> = serde_wasm_bindgen::from_value(grid.visible_window().unwrap()).unwrap();
    assert_eq!(window.unwrap().rows, (1, 10));
}

#[wasm_bindgen_test]
fn load_json_replaces_workbook_and_reports_errors() {
    let mut grid = grid();
    grid.load_json(r#"{ "sheets": [{ "name": "A" }, { "name": "B" }] }"#)
        .unwrap();
    grid.dispatch(js(r#"{ "type": "selectSheet", "sheet": 1 }"#)).unwrap();
    assert!(grid.last_error().is_none());

    grid.dispatch(js(r#"{ "type": "selectSheet", "sheet": 5 }"#)).unwrap();
    assert!(grid.last_error().is_some());
    assert!(grid.load_json("not json").is_err());
}

#[wasm_bindgen_test]
fn paste_text_writes_cells() {
    let mut grid = grid();
    assert!(grid.paste_text("a\tb".to_string()));
    assert!(grid.to_json().unwrap().contains("\"b\""));
    assert!(grid.clipboard_text().is_none());
}
