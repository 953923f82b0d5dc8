//! The grid widget: one model, one state, one viewport.
//!
//! `GridWidget` owns everything the reducer needs and turns host input
//! (keys, pointer, wheel, resize) into [`GridAction`]s. After each dispatch
//! subscribers are notified if the state asked for a redraw; the host then
//! reads [`GridWidget::visible_window`] and draws.
//!
//! Pointer drags use capture: a pointer-down that starts a drag takes it,
//! moves without it are ignored, and pointer-up always releases it.

mod events;
mod scroll;

pub use events::{key_action, KeyEvent};
pub use scroll::{wheel_pixels, WheelDeltaMode};

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::editor::clipboard::Clipboard;
use crate::editor::UserModel;
use crate::error::Result;
use crate::layout::{SheetLayout, Viewport};
use crate::model::CalcModel;
use crate::state::{reduce, Context, GridAction, GridState};

/// Called with the new state whenever the grid needs to be redrawn.
pub type Subscriber = Box<dyn FnMut(&GridState)>;

/// Rows and columns to draw for the selected sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleWindow {
    pub sheet: u32,
    pub frozen_rows: u32,
    pub frozen_columns: u32,
    /// Visible scrollable rows, inclusive
    pub rows: (u32, u32),
    /// Visible scrollable columns, inclusive
    pub columns: (u32, u32),
}

pub struct GridWidget<M> {
    model: Option<UserModel<M>>,
    state: GridState,
    viewport: Viewport,
    config: GridConfig,
    clipboard: Option<Clipboard>,
    capture: bool,
    last_error: Option<String>,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber: u64,
}

impl<M> std::fmt::Debug for GridWidget<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridWidget")
            .field("has_model", &self.model.is_some())
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("session", &self.config.session)
            .field("capture", &self.capture)
            .field("last_error", &self.last_error)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<M: CalcModel> GridWidget<M> {
    /// Widget without a model. Every action is ignored until one is set.
    pub fn new(config: GridConfig, width: f64, height: f64) -> Self {
        Self {
            model: None,
            state: GridState::new(1),
            viewport: Viewport::new(width, height).with_headers(config.headers),
            config,
            clipboard: None,
            capture: false,
            last_error: None,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    pub fn with_model(model: M, config: GridConfig, width: f64, height: f64) -> Self {
        let mut widget = Self::new(config, width, height);
        widget.set_model(model);
        widget
    }

    /// Replace the model. State, history and clipboard start over.
    pub fn set_model(&mut self, model: M) {
        let sheets = model.sheet_count();
        self.model = Some(UserModel::new(model, self.config.history));
        let render_request = self.state.render_request;
        self.state = GridState::new(sheets);
        self.state.render_request = render_request;
        self.clipboard = None;
        self.capture = false;
        self.last_error = None;
        self.request_render();
    }

    pub fn model(&self) -> Option<&UserModel<M>> {
        self.model.as_ref()
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn session(&self) -> u64 {
        self.config.session
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Take over a clipboard, possibly captured by another widget. A cut
    /// from a different session pastes as a copy.
    pub fn set_clipboard(&mut self, clipboard: Option<Clipboard>) {
        self.clipboard = clipboard;
        self.request_render();
    }

    /// TSV the host should put on the system clipboard after a copy or cut.
    pub fn clipboard_text(&self) -> Option<&str> {
        self.clipboard.as_ref().map(|c| c.text.as_str())
    }

    /// Message of the last failed action, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn render_request(&self) -> u64 {
        self.state.render_request
    }

    pub fn has_capture(&self) -> bool {
        self.capture
    }

    /// Register `subscriber`; returns an id for [`GridWidget::unsubscribe`].
    pub fn subscribe(&mut self, subscriber: Subscriber) -> u64 {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(i, _)| *i != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(state);
        }
    }

    fn request_render(&mut self) {
        self.state.render_request = self.state.render_request.wrapping_add(1);
        self.notify();
    }

    /// Run one action through the reducer.
    ///
    /// Returns whether a redraw was requested. A failed action leaves the
    /// state as it was and is kept in [`GridWidget::last_error`].
    pub fn dispatch(&mut self, action: &GridAction) -> bool {
        let Some(model) = self.model.as_mut() else {
            log::debug!("no model, ignoring {action:?}");
            return false;
        };
        let mut ctx = Context {
            model,
            viewport: &self.viewport,
            config: &self.config,
            clipboard: &mut self.clipboard,
            session: self.config.session,
        };
        match reduce(&self.state, action, &mut ctx) {
            Ok(next) => {
                self.last_error = None;
                let changed = next.render_request != self.state.render_request;
                self.state = next;
                if changed {
                    self.notify();
                }
                changed
            }
            Err(e) => {
                log::warn!("{action:?} failed: {e}");
                self.last_error = Some(e.to_string());
                if matches!(action, GridAction::PointerUp) && self.state.drag.is_some() {
                    self.state.drag = None;
                    self.state.extend_to_area = None;
                    self.request_render();
                    return true;
                }
                false
            }
        }
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        let editing = self.state.cell_editing.as_ref().map(|e| e.mode);
        match key_action(event, editing) {
            Some(action) => {
                self.dispatch(&action);
                true
            }
            None => false,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool) -> bool {
        let changed = self.dispatch(&GridAction::PointerDown { x, y, shift });
        self.capture = self.state.drag.is_some();
        changed
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        if !self.capture {
            return false;
        }
        self.dispatch(&GridAction::PointerMove { x, y })
    }

    pub fn pointer_up(&mut self) -> bool {
        self.capture = false;
        self.dispatch(&GridAction::PointerUp)
    }

    pub fn double_click(&mut self, x: f64, y: f64) -> bool {
        self.capture = false;
        self.dispatch(&GridAction::DoubleClick { x, y })
    }

    pub fn wheel(&mut self, dx: f64, dy: f64, mode: WheelDeltaMode, shift: bool) -> bool {
        let page = (self.viewport.width, self.viewport.height);
        let (dx, dy) = wheel_pixels(dx, dy, mode, shift, self.config.default_row_height, page);
        self.dispatch(&GridAction::Scroll { dx, dy })
    }

    /// New widget size in pixels. Always redraws.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        let scroll = self.state.view().scroll;
        self.dispatch(&GridAction::SetScroll {
            left: scroll.left,
            top: scroll.top,
        });
        self.request_render();
    }

    fn layout(&self) -> Option<Result<SheetLayout>> {
        let model = self.model.as_ref()?;
        Some(SheetLayout::from_model(
            model.model(),
            self.state.selected_sheet,
            self.config.default_row_height,
            self.config.default_column_width,
        ))
    }

    /// What to draw for the current state.
    pub fn visible_window(&self) -> Option<VisibleWindow> {
        let layout = match self.layout()? {
            Ok(layout) => layout,
            Err(e) => {
                log::warn!("no layout for sheet {}: {e}", self.state.selected_sheet);
                return None;
            }
        };
        let scroll = self.state.view().scroll;
        Some(VisibleWindow {
            sheet: self.state.selected_sheet,
            frozen_rows: layout.frozen_rows(),
            frozen_columns: layout.frozen_cols(),
            rows: self.viewport.visible_rows(&layout, scroll),
            columns: self.viewport.visible_cols(&layout, scroll),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::MemoryModel;
    use crate::types::Cell;
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    #[test]
    fn test_without_model_actions_are_ignored() {
        let mut widget: GridWidget<MemoryModel> = GridWidget::new(GridConfig::default(), 800.0, 600.0);
        assert!(!widget.dispatch(&GridAction::SelectCell { cell: Cell::new(3, 3) }));
        assert_eq!(widget.state().view().selected_cell, Cell::new(1, 1));
        assert!(widget.visible_window().is_none());
    }

    #[test]
    fn test_session_comes_from_config() {
        let config = GridConfig {
            session: 7,
            ..GridConfig::default()
        };
        let widget: GridWidget<MemoryModel> = GridWidget::new(config, 800.0, 600.0);
        assert_eq!(widget.session(), 7);
    }

    #[test]
    fn test_subscribers_see_redraws_only() {
        let mut widget = GridWidget::with_model(MemoryModel::new(), GridConfig::default(), 800.0, 600.0);
        let calls = Rc::new(Counter::new(0));
        let seen = Rc::clone(&calls);
        let id = widget.subscribe(Box::new(move |_| seen.set(seen.get() + 1)));

        assert!(widget.dispatch(&GridAction::SelectCell { cell: Cell::new(2, 2) }));
        assert!(!widget.dispatch(&GridAction::SelectCell { cell: Cell::new(2, 2) }));
        assert_eq!(calls.get(), 1);

        assert!(widget.unsubscribe(id));
        widget.dispatch(&GridAction::SelectCell { cell: Cell::new(3, 3) });
        assert_eq!(calls.get(), 1);
    }
}
