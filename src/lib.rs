//! xlgrid - spreadsheet grid widget core
//!
//! The interaction engine of an embeddable spreadsheet grid:
//! - Viewport geometry with frozen rows/columns and scroll that snaps to whole cells
//! - A selection and editing state machine for keyboard, pointer and fill handle
//! - Undo/redo of every workbook mutation as one transaction
//!
//! Formula evaluation lives behind the [`model::CalcModel`] trait.
//!
//! # Usage (Rust)
//!
//! ```
//! use xlgrid::{GridAction, GridConfig, GridWidget, MemoryModel, Cell, Direction};
//!
//! let mut grid = GridWidget::with_model(MemoryModel::new(), GridConfig::default(), 800.0, 600.0);
//! grid.dispatch(&GridAction::StartEditing { text: Some("4".into()) });
//! grid.dispatch(&GridAction::CommitEditing { direction: Some(Direction::Right) });
//! assert_eq!(grid.state().view().selected_cell, Cell::new(1, 2));
//! ```

pub mod cell_ref;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod layout;
pub mod model;
pub mod state;
pub mod types;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use editor::clipboard::{Clipboard, ClipboardMode};
pub use editor::UserModel;
pub use error::{GridError, Result};
pub use history::{ActionHistory, Command, HistoryConfig, Transaction};
pub use layout::{SheetLayout, Viewport};
pub use model::{CalcModel, MemoryModel};
pub use state::{reduce, GridAction, GridState};
pub use viewer::{GridWidget, KeyEvent, VisibleWindow};

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
