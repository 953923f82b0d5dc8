//! Layout engine for computing cell positions and viewport management.
//!
//! This module handles:
//! - Per-sheet row heights / column widths with sparse overrides
//! - Frozen-band accounting (frozen rows/columns plus separator)
//! - Pixel ⇄ cell mapping for the visible window
//! - Scroll quantization to whole rows/columns

mod sheet_layout;
mod viewport;

pub use sheet_layout::{
    AxisLayout, CellRect, ScrollStop, SheetLayout, DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT,
    FROZEN_SEPARATOR_WIDTH,
};
pub use viewport::{HitTarget, Viewport, FILL_HANDLE_SIZE};
