//! Browser binding: the grid widget over the in-memory model.
//!
//! ```javascript
//! import init, { XlGrid } from 'xlgrid';
//! await init();
//! const grid = new XlGrid(canvas.width, canvas.height, { defaultRowHeight: 20 });
//! grid.load_json(workbookJson);
//! grid.set_render_callback(() => requestAnimationFrame(draw));
//! canvas.addEventListener('keydown', (e) => grid.on_key_down(e));
//! ```

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent, PointerEvent, WheelEvent};

use crate::config::GridConfig;
use crate::model::{CalcModel, MemoryModel};
use crate::state::GridAction;
use crate::viewer::{GridWidget, KeyEvent, WheelDeltaMode};

#[wasm_bindgen]
pub struct XlGrid {
    widget: GridWidget<MemoryModel>,
    render_subscription: Option<u64>,
}

fn pointer_position(event: &MouseEvent) -> (f64, f64) {
    (f64::from(event.offset_x()), f64::from(event.offset_y()))
}

#[wasm_bindgen]
impl XlGrid {
    /// `config` is a (possibly partial) `GridConfig` object, or undefined.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config: JsValue) -> Result<XlGrid, JsValue> {
        console_error_panic_hook::set_once();
        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            widget: GridWidget::with_model(MemoryModel::new(), config, width, height),
            render_subscription: None,
        })
    }

    /// Replace the workbook. Undo history and clipboard are dropped.
    pub fn load_json(&mut self, json: &str) -> Result<(), JsValue> {
        let model = MemoryModel::from_json(json)?;
        self.widget.set_model(model);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, JsValue> {
        match self.widget.model() {
            Some(model) => Ok(model.model().to_json()?),
            None => Err(JsValue::from_str("no workbook loaded")),
        }
    }

    /// Register a JS callback to request a render on the next animation frame.
    pub fn set_render_callback(&mut self, callback: Option<Function>) {
        if let Some(id) = self.render_subscription.take() {
            self.widget.unsubscribe(id);
        }
        if let Some(callback) = callback {
            let id = self.widget.subscribe(Box::new(move |_| {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    log::warn!("render callback failed: {e:?}");
                }
            }));
            self.render_subscription = Some(id);
        }
    }

    /// Dispatch a `GridAction` object such as `{ type: "selectCell", cell: { row: 2, column: 3 } }`.
    pub fn dispatch(&mut self, action: JsValue) -> Result<bool, JsValue> {
        let action: GridAction = serde_wasm_bindgen::from_value(action)?;
        Ok(self.widget.dispatch(&action))
    }

    /// Returns true (and cancels the default) when the grid handled the key.
    pub fn on_key_down(&mut self, event: &KeyboardEvent) -> bool {
        let key = KeyEvent {
            key: event.key(),
            ctrl: event.ctrl_key(),
            shift: event.shift_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        };
        let handled = self.widget.key_down(&key);
        if handled {
            event.prevent_default();
        }
        handled
    }

    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> bool {
        let (x, y) = pointer_position(event);
        self.widget.pointer_down(x, y, event.shift_key())
    }

    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        let (x, y) = pointer_position(event);
        self.widget.pointer_move(x, y)
    }

    pub fn on_pointer_up(&mut self) -> bool {
        self.widget.pointer_up()
    }

    pub fn on_double_click(&mut self, event: &MouseEvent) -> bool {
        let (x, y) = pointer_position(event);
        self.widget.double_click(x, y)
    }

    pub fn on_wheel(&mut self, event: &WheelEvent) -> bool {
        let mode = WheelDeltaMode::from_dom(event.delta_mode());
        let changed = self
            .widget
            .wheel(event.delta_x(), event.delta_y(), mode, event.shift_key());
        event.prevent_default();
        changed
    }

    /// Paste text read from the system clipboard.
    pub fn paste_text(&mut self, text: String) -> bool {
        self.widget.dispatch(&GridAction::Paste { text: Some(text) })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.widget.resize(width, height);
    }

    /// Full `GridState` as a JS object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.widget.state())?)
    }

    pub fn visible_window(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.widget.visible_window())?)
    }

    pub fn clipboard_text(&self) -> Option<String> {
        self.widget.clipboard_text().map(str::to_string)
    }

    pub fn last_error(&self) -> Option<String> {
        self.widget.last_error().map(str::to_string)
    }

    pub fn render_request(&self) -> u64 {
        self.widget.render_request()
    }

    pub fn can_undo(&self) -> bool {
        self.widget.model().is_some_and(|m| m.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.widget.model().is_some_and(|m| m.can_redo())
    }
}
