//! Per-sheet geometry: row heights, column widths and frozen panes.
//!
//! Sizes are stored as a sparse override map on top of a default size, so a
//! sheet with a million rows costs nothing until rows are resized. Offsets are
//! computed from the overrides in O(k) and index lookups binary search over
//! them, keeping every query O(k log n).

use std::collections::BTreeMap;

use crate::model::CalcModel;
use crate::types::{Axis, Cell, LAST_COLUMN, LAST_ROW};

/// Default column width in pixels (Excel default ~64px at 100% zoom)
pub const DEFAULT_COL_WIDTH: f64 = 64.0;

/// Default row height in pixels (Excel default ~20px at 100% zoom)
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Width of the line drawn between the frozen band and the scrollable region.
pub const FROZEN_SEPARATOR_WIDTH: f64 = 3.0;

/// A quantized scroll stop: the first visible non-frozen index and its offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStop {
    pub index: u32,
    pub offset: f64,
}

/// Geometry of one axis (rows or columns).
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    /// Size of every index without an override
    pub default_size: f64,
    /// Per-index size overrides (0 = hidden)
    pub overrides: BTreeMap<u32, f64>,
    /// Number of frozen leading indices (0 = none)
    pub frozen: u32,
    /// Last addressable index (inclusive)
    pub last: u32,
}

impl AxisLayout {
    pub fn new(default_size: f64, last: u32) -> Self {
        Self {
            default_size,
            overrides: BTreeMap::new(),
            frozen: 0,
            last,
        }
    }

    #[must_use]
    pub fn with_frozen(mut self, frozen: u32) -> Self {
        self.frozen = frozen.min(self.last);
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (u32, f64)>) -> Self {
        self.overrides
            .extend(overrides.into_iter().map(|(i, size)| (i, size.max(0.0))));
        self
    }

    /// Size of `index`.
    pub fn size(&self, index: u32) -> f64 {
        self.overrides
            .get(&index)
            .copied()
            .unwrap_or(self.default_size)
    }

    /// Offset of the leading edge of `index`, measured from the leading edge of index 1.
    ///
    /// `start_of(last + 1)` is the total size of the axis.
    pub fn start_of(&self, index: u32) -> f64 {
        let preceding = index.saturating_sub(1);
        let mut offset = f64::from(preceding) * self.default_size;
        for size in self.overrides.range(1..index.max(1)).map(|(_, s)| *s) {
            offset += size - self.default_size;
        }
        offset
    }

    /// Offset of the trailing edge of `index`.
    pub fn end_of(&self, index: u32) -> f64 {
        self.start_of(index) + self.size(index)
    }

    /// First index of the scrollable region.
    pub fn first_scrollable(&self) -> u32 {
        (self.frozen + 1).min(self.last)
    }

    pub fn is_frozen(&self, index: u32) -> bool {
        index <= self.frozen
    }

    /// Total size of the frozen indices (0 if none are frozen).
    pub fn frozen_size(&self) -> f64 {
        if self.frozen == 0 {
            return 0.0;
        }
        self.start_of(self.frozen + 1)
    }

    /// Frozen size plus the separator, or 0 if nothing is frozen.
    pub fn band_size(&self) -> f64 {
        if self.frozen == 0 {
            return 0.0;
        }
        self.frozen_size() + FROZEN_SEPARATOR_WIDTH
    }

    /// Offset of `index` relative to the first scrollable index.
    ///
    /// This is the scroll offset that puts `index` at the top/left of the
    /// scrollable region.
    pub fn scroll_offset_of(&self, index: u32) -> f64 {
        self.start_of(index) - self.start_of(self.first_scrollable())
    }

    /// Total size of the scrollable indices.
    pub fn scrollable_size(&self) -> f64 {
        self.start_of(self.last + 1) - self.start_of(self.first_scrollable())
    }

    /// Largest index in `lo..=hi` whose leading edge is `<= offset`.
    ///
    /// Caller guarantees `start_of(lo) <= offset`.
    fn last_index_starting_at_or_before(&self, offset: f64, lo: u32, hi: u32) -> u32 {
        let (mut lo, mut hi) = (lo, hi);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.start_of(mid) <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    /// Index covering the absolute `offset` (measured from index 1), or `None`
    /// if the offset is negative or past the last index.
    pub fn index_at(&self, offset: f64) -> Option<u32> {
        if offset < 0.0 || offset >= self.start_of(self.last + 1) {
            return None;
        }
        Some(self.last_index_starting_at_or_before(offset, 1, self.last))
    }

    /// Snap a requested scroll offset to a cell boundary.
    ///
    /// Returns the largest scrollable index whose offset is `<= requested`
    /// (ties and fractions round down, never overshooting the request).
    pub fn quantize(&self, requested: f64) -> ScrollStop {
        let first = self.first_scrollable();
        if requested <= 0.0 || requested.is_nan() {
            return ScrollStop {
                index: first,
                offset: 0.0,
            };
        }
        let absolute = requested + self.start_of(first);
        let index = self.last_index_starting_at_or_before(absolute, first, self.last);
        ScrollStop {
            index,
            offset: self.scroll_offset_of(index),
        }
    }

    /// Smallest offset `>= requested` that lies on a cell boundary.
    fn quantize_up(&self, requested: f64) -> ScrollStop {
        let stop = self.quantize(requested);
        if stop.offset >= requested || stop.index >= self.last {
            return stop;
        }
        let index = stop.index + 1;
        ScrollStop {
            index,
            offset: self.scroll_offset_of(index),
        }
    }

    /// Minimal scroll change that makes `target` fully visible in a
    /// scrollable window of `extent` pixels currently scrolled to `current`.
    ///
    /// Frozen targets never need scrolling. A target larger than the window is
    /// aligned to its leading edge.
    pub fn minimal_scroll_to_reveal(&self, target: u32, current: f64, extent: f64) -> f64 {
        if self.is_frozen(target) {
            return current;
        }
        let start = self.scroll_offset_of(target);
        let end = start + self.size(target);
        if start < current {
            return start;
        }
        if end <= current + extent {
            return current;
        }
        let needed = self.quantize_up(end - extent).offset;
        needed.min(start)
    }

    /// Inclusive range of scrollable indices intersecting a window of
    /// `extent` pixels scrolled to `scroll`.
    pub fn visible_range(&self, scroll: f64, extent: f64) -> (u32, u32) {
        let first = self.quantize(scroll).index;
        if extent <= 0.0 {
            return (first, first);
        }
        let origin = self.start_of(self.first_scrollable());
        let end_offset = origin + scroll + extent;
        let last = if end_offset >= self.start_of(self.last + 1) {
            self.last
        } else {
            let idx = self.last_index_starting_at_or_before(end_offset, first, self.last);
            // an index starting exactly on the edge is not visible
            if idx > first && self.start_of(idx) >= end_offset {
                idx - 1
            } else {
                idx
            }
        };
        (first, last)
    }
}

/// Geometry for one sheet: both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub rows: AxisLayout,
    pub columns: AxisLayout,
}

/// Rectangle representing a cell's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    /// Width of the cell
    pub width: f64,
    /// Height of the cell
    pub height: f64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT, DEFAULT_COL_WIDTH)
    }
}

impl SheetLayout {
    /// Layout with uniform sizes and nothing frozen.
    pub fn new(default_row_height: f64, default_column_width: f64) -> Self {
        Self {
            rows: AxisLayout::new(default_row_height, LAST_ROW),
            columns: AxisLayout::new(default_column_width, LAST_COLUMN),
        }
    }

    /// Read the geometry of `sheet` from the calculation model.
    pub fn from_model<M: CalcModel + ?Sized>(
        model: &M,
        sheet: u32,
        default_row_height: f64,
        default_column_width: f64,
    ) -> crate::error::Result<Self> {
        let rows = AxisLayout::new(default_row_height, LAST_ROW)
            .with_overrides(model.row_height_overrides(sheet)?)
            .with_frozen(model.frozen_rows(sheet)?);
        let columns = AxisLayout::new(default_column_width, LAST_COLUMN)
            .with_overrides(model.column_width_overrides(sheet)?)
            .with_frozen(model.frozen_columns(sheet)?);
        Ok(Self { rows, columns })
    }

    #[must_use]
    pub fn with_frozen(mut self, frozen_rows: u32, frozen_cols: u32) -> Self {
        self.rows = self.rows.with_frozen(frozen_rows);
        self.columns = self.columns.with_frozen(frozen_cols);
        self
    }

    pub fn axis(&self, axis: Axis) -> &AxisLayout {
        match axis {
            Axis::Rows => &self.rows,
            Axis::Columns => &self.columns,
        }
    }

    /// Get cell bounds in sheet coordinates (no scroll, no frozen band)
    pub fn cell_rect(&self, cell: Cell) -> CellRect {
        CellRect {
            x: self.columns.start_of(cell.column),
            y: self.rows.start_of(cell.row),
            width: self.columns.size(cell.column),
            height: self.rows.size(cell.row),
        }
    }

    /// Get row height at index
    pub fn row_height(&self, row: u32) -> f64 {
        self.rows.size(row)
    }

    /// Get column width at index
    pub fn col_width(&self, col: u32) -> f64 {
        self.columns.size(col)
    }

    /// Number of frozen rows (0 = no frozen rows)
    pub fn frozen_rows(&self) -> u32 {
        self.rows.frozen
    }

    /// Number of frozen columns (0 = no frozen columns)
    pub fn frozen_cols(&self) -> u32 {
        self.columns.frozen
    }

    /// Get the total height of frozen rows (returns 0 if no frozen rows)
    pub fn frozen_rows_height(&self) -> f64 {
        self.rows.frozen_size()
    }

    /// Get the total width of frozen columns (returns 0 if no frozen columns)
    pub fn frozen_cols_width(&self) -> f64 {
        self.columns.frozen_size()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn rows(default: f64, overrides: &[(u32, f64)]) -> AxisLayout {
        AxisLayout::new(default, LAST_ROW).with_overrides(overrides.iter().copied())
    }

    #[test]
    fn test_basic_layout() {
        let layout = SheetLayout::default();
        let rect = layout.cell_rect(Cell::new(1, 1));
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, DEFAULT_COL_WIDTH);
        assert_eq!(rect.height, DEFAULT_ROW_HEIGHT);

        let rect = layout.cell_rect(Cell::new(2, 3));
        assert_eq!(rect.x, DEFAULT_COL_WIDTH * 2.0);
        assert_eq!(rect.y, DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn test_start_of_with_overrides() {
        let axis = rows(20.0, &[(2, 50.0), (4, 0.0)]);
        assert_eq!(axis.start_of(1), 0.0);
        assert_eq!(axis.start_of(2), 20.0);
        assert_eq!(axis.start_of(3), 70.0);
        assert_eq!(axis.start_of(4), 90.0);
        assert_eq!(axis.start_of(5), 90.0);
        assert_eq!(axis.start_of(6), 110.0);
    }

    #[test]
    fn test_index_at() {
        let axis = rows(20.0, &[(2, 50.0)]);
        assert_eq!(axis.index_at(0.0), Some(1));
        assert_eq!(axis.index_at(19.9), Some(1));
        assert_eq!(axis.index_at(20.0), Some(2));
        assert_eq!(axis.index_at(69.0), Some(2));
        assert_eq!(axis.index_at(70.0), Some(3));
        assert_eq!(axis.index_at(-1.0), None);
    }

    #[test]
    fn test_index_at_skips_hidden_rows() {
        let axis = rows(20.0, &[(3, 0.0)]);
        // row 3 has zero height, its edge coincides with row 4
        assert_eq!(axis.index_at(40.0), Some(4));
    }

    #[test]
    fn test_index_past_last() {
        let axis = AxisLayout::new(10.0, 5);
        assert_eq!(axis.index_at(49.0), Some(5));
        assert_eq!(axis.index_at(50.0), None);
    }

    #[test]
    fn test_quantize_rounds_down() {
        let axis = rows(20.0, &[]);
        assert_eq!(axis.quantize(37.0), ScrollStop { index: 2, offset: 20.0 });
        assert_eq!(axis.quantize(40.0), ScrollStop { index: 3, offset: 40.0 });
        assert_eq!(axis.quantize(-5.0), ScrollStop { index: 1, offset: 0.0 });
    }

    #[test]
    fn test_quantize_with_frozen() {
        let axis = rows(20.0, &[]).with_frozen(2);
        let stop = axis.quantize(0.0);
        assert_eq!(stop.index, 3);
        let stop = axis.quantize(45.0);
        assert_eq!(stop, ScrollStop { index: 5, offset: 40.0 });
    }

    #[test]
    fn test_quantize_clamps_to_last() {
        let axis = AxisLayout::new(10.0, 5);
        let stop = axis.quantize(1_000.0);
        assert_eq!(stop, ScrollStop { index: 5, offset: 40.0 });
    }

    #[test]
    fn test_frozen_band() {
        let layout = SheetLayout::default().with_frozen(2, 1);
        assert_eq!(layout.frozen_rows_height(), 40.0);
        assert_eq!(layout.frozen_cols_width(), DEFAULT_COL_WIDTH);
        assert_eq!(layout.rows.band_size(), 40.0 + FROZEN_SEPARATOR_WIDTH);
        assert_eq!(SheetLayout::default().rows.band_size(), 0.0);
    }

    #[test]
    fn test_minimal_scroll_to_reveal() {
        let axis = rows(20.0, &[]);
        // window shows 5 rows
        assert_eq!(axis.minimal_scroll_to_reveal(3, 0.0, 100.0), 0.0);
        // row 6 ends at 120: scroll by one row
        assert_eq!(axis.minimal_scroll_to_reveal(6, 0.0, 100.0), 20.0);
        // partial window rounds up to the next boundary
        assert_eq!(axis.minimal_scroll_to_reveal(6, 0.0, 90.0), 40.0);
        // target above the window aligns to its start
        assert_eq!(axis.minimal_scroll_to_reveal(2, 60.0, 100.0), 20.0);
    }

    #[test]
    fn test_reveal_oversized_target() {
        let axis = rows(20.0, &[(4, 500.0)]);
        assert_eq!(axis.minimal_scroll_to_reveal(4, 0.0, 100.0), 60.0);
    }

    #[test]
    fn test_visible_range() {
        let axis = rows(20.0, &[]);
        assert_eq!(axis.visible_range(0.0, 100.0), (1, 5));
        assert_eq!(axis.visible_range(20.0, 110.0), (2, 7));
    }
}
