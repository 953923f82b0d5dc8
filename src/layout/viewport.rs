//! Viewport geometry: mapping between cells and screen pixels.
//!
//! Screen coordinates are relative to the widget's top-left corner. The row
//! and column headers come first, then the frozen band (if any) followed by
//! the separator, then the scrollable region.

use serde::{Deserialize, Serialize};

use super::{AxisLayout, CellRect, ScrollStop, SheetLayout};
use crate::types::{Area, Axis, Cell, HeaderConfig, ScrollPosition};

/// Side length of the fill handle square drawn at the selection's
/// bottom-right corner.
pub const FILL_HANDLE_SIZE: f64 = 6.0;

/// What a screen point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Cell(Cell),
    RowHeader(u32),
    ColumnHeader(u32),
    /// Top-left corner where the headers meet
    CornerHeader,
    /// Frozen separator or past the last row/column
    None,
}

/// Viewport state - the visible window of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewport {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// Row/column header sizes
    pub headers: HeaderConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            headers: HeaderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderConfig) -> Self {
        self.headers = headers;
        self
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn header_size(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Rows => self.headers.height(),
            Axis::Columns => self.headers.width(),
        }
    }

    fn total_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Rows => self.height,
            Axis::Columns => self.width,
        }
    }

    /// Pixels available to the scrollable region along `axis`.
    pub fn scrollable_extent(&self, layout: &SheetLayout, axis: Axis) -> f64 {
        (self.total_extent(axis) - self.header_size(axis) - layout.axis(axis).band_size()).max(0.0)
    }

    /// Screen coordinate of the leading edge of `index` along one axis.
    fn screen_start(&self, axis_layout: &AxisLayout, header: f64, index: u32, scroll: f64) -> f64 {
        if axis_layout.is_frozen(index) {
            header + axis_layout.start_of(index)
        } else {
            header + axis_layout.band_size() + axis_layout.scroll_offset_of(index) - scroll
        }
    }

    /// Screen position `(x, y)` of the top-left corner of `cell`.
    ///
    /// Cells in frozen rows/columns are positioned independent of scroll;
    /// the rest are offset by the frozen band and the current scroll.
    pub fn cell_to_pixel(&self, layout: &SheetLayout, scroll: ScrollPosition, cell: Cell) -> (f64, f64) {
        let x = self.screen_start(&layout.columns, self.headers.width(), cell.column, scroll.left);
        let y = self.screen_start(&layout.rows, self.headers.height(), cell.row, scroll.top);
        (x, y)
    }

    /// Screen rectangle of `cell`.
    pub fn cell_rect(&self, layout: &SheetLayout, scroll: ScrollPosition, cell: Cell) -> CellRect {
        let (x, y) = self.cell_to_pixel(layout, scroll, cell);
        CellRect {
            x,
            y,
            width: layout.col_width(cell.column),
            height: layout.row_height(cell.row),
        }
    }

    /// Index under the screen coordinate `pixel` along one axis.
    fn index_at_pixel(&self, axis_layout: &AxisLayout, header: f64, pixel: f64, scroll: f64) -> Option<u32> {
        let local = pixel - header;
        if local < 0.0 {
            return None;
        }
        if axis_layout.frozen > 0 {
            if local < axis_layout.frozen_size() {
                return axis_layout.index_at(local);
            }
            if local < axis_layout.band_size() {
                // on the separator
                return None;
            }
        }
        let offset = local - axis_layout.band_size() + scroll + axis_layout.start_of(axis_layout.first_scrollable());
        axis_layout.index_at(offset)
    }

    /// Cell under the screen point, or `None` for headers, the frozen
    /// separator and points past the last row/column.
    pub fn pixel_to_cell(&self, layout: &SheetLayout, scroll: ScrollPosition, x: f64, y: f64) -> Option<Cell> {
        let column = self.index_at_pixel(&layout.columns, self.headers.width(), x, scroll.left)?;
        let row = self.index_at_pixel(&layout.rows, self.headers.height(), y, scroll.top)?;
        Some(Cell::new(row, column))
    }

    /// Classify a screen point: a cell, a header, the corner, or nothing.
    pub fn hit_test(&self, layout: &SheetLayout, scroll: ScrollPosition, x: f64, y: f64) -> HitTarget {
        let in_row_header = x >= 0.0 && x < self.headers.width();
        let in_col_header = y >= 0.0 && y < self.headers.height();
        match (in_row_header, in_col_header) {
            (true, true) => HitTarget::CornerHeader,
            (true, false) => self
                .row_at_pixel(layout, scroll, y)
                .map_or(HitTarget::None, HitTarget::RowHeader),
            (false, true) => self
                .column_at_pixel(layout, scroll, x)
                .map_or(HitTarget::None, HitTarget::ColumnHeader),
            (false, false) => self
                .pixel_to_cell(layout, scroll, x, y)
                .map_or(HitTarget::None, HitTarget::Cell),
        }
    }

    /// Nearest cell to a screen point, for drags that leave the grid.
    ///
    /// Points on the headers or before the grid snap to the first visible
    /// index, points past the window to the last visible one.
    pub fn clamped_cell_at(&self, layout: &SheetLayout, scroll: ScrollPosition, x: f64, y: f64) -> Cell {
        let column = self.clamped_index(layout, Axis::Columns, scroll.left, x);
        let row = self.clamped_index(layout, Axis::Rows, scroll.top, y);
        Cell::new(row, column)
    }

    fn clamped_index(&self, layout: &SheetLayout, axis: Axis, scroll: f64, pixel: f64) -> u32 {
        let axis_layout = layout.axis(axis);
        let header = self.header_size(axis);
        let (first, last) = axis_layout.visible_range(scroll, self.scrollable_extent(layout, axis));
        let leading = if axis_layout.frozen > 0 { 1 } else { first };
        if pixel < header {
            return leading;
        }
        let far = (self.total_extent(axis) - 1.0).max(header);
        if pixel > far {
            return last;
        }
        self.index_at_pixel(axis_layout, header, pixel, scroll)
            .unwrap_or(first)
    }

    /// Whether a screen point grabs the fill handle of `area`.
    pub fn hits_fill_handle(&self, layout: &SheetLayout, scroll: ScrollPosition, area: &Area, x: f64, y: f64) -> bool {
        let a = area.normalized();
        let rect = self.cell_rect(layout, scroll, Cell::new(a.row_end, a.column_end));
        let (cx, cy) = (rect.x + rect.width, rect.y + rect.height);
        let half = FILL_HANDLE_SIZE / 2.0;
        (x - cx).abs() <= half && (y - cy).abs() <= half
    }

    /// Row under a screen `y` (ignores the column).
    pub fn row_at_pixel(&self, layout: &SheetLayout, scroll: ScrollPosition, y: f64) -> Option<u32> {
        self.index_at_pixel(&layout.rows, self.headers.height(), y, scroll.top)
    }

    /// Column under a screen `x` (ignores the row).
    pub fn column_at_pixel(&self, layout: &SheetLayout, scroll: ScrollPosition, x: f64) -> Option<u32> {
        self.index_at_pixel(&layout.columns, self.headers.width(), x, scroll.left)
    }

    /// Snap a requested scroll offset on `axis` to a cell boundary.
    pub fn quantize_scroll(&self, layout: &SheetLayout, axis: Axis, requested: f64) -> ScrollStop {
        layout.axis(axis).quantize(requested)
    }

    /// Quantize both axes of a scroll position.
    pub fn quantize_position(&self, layout: &SheetLayout, scroll: ScrollPosition) -> ScrollPosition {
        ScrollPosition::new(
            layout.columns.quantize(scroll.left).offset,
            layout.rows.quantize(scroll.top).offset,
        )
    }

    /// Scroll offset on `axis` needed to bring `target` fully into view.
    pub fn minimal_scroll_to_reveal(&self, layout: &SheetLayout, axis: Axis, target: u32, current: f64) -> f64 {
        let extent = self.scrollable_extent(layout, axis);
        layout.axis(axis).minimal_scroll_to_reveal(target, current, extent)
    }

    /// Scroll position that reveals `cell` on both axes.
    pub fn reveal(&self, layout: &SheetLayout, scroll: ScrollPosition, cell: Cell) -> ScrollPosition {
        ScrollPosition::new(
            self.minimal_scroll_to_reveal(layout, Axis::Columns, cell.column, scroll.left),
            self.minimal_scroll_to_reveal(layout, Axis::Rows, cell.row, scroll.top),
        )
    }

    /// Get visible scrollable row range (inclusive) based on the scroll position.
    pub fn visible_rows(&self, layout: &SheetLayout, scroll: ScrollPosition) -> (u32, u32) {
        layout
            .rows
            .visible_range(scroll.top, self.scrollable_extent(layout, Axis::Rows))
    }

    /// Get visible scrollable column range (inclusive) based on the scroll position.
    pub fn visible_cols(&self, layout: &SheetLayout, scroll: ScrollPosition) -> (u32, u32) {
        layout
            .columns
            .visible_range(scroll.left, self.scrollable_extent(layout, Axis::Columns))
    }

    /// Number of scrollable rows (or columns) fully visible at `scroll`, at least 1.
    pub fn page_size(&self, layout: &SheetLayout, axis: Axis, scroll: ScrollPosition) -> u32 {
        let axis_layout = layout.axis(axis);
        let offset = scroll.get(axis);
        let extent = self.scrollable_extent(layout, axis);
        let (first, last) = axis_layout.visible_range(offset, extent);
        let fully = if axis_layout.scroll_offset_of(last) + axis_layout.size(last) > offset + extent {
            last.saturating_sub(1)
        } else {
            last
        };
        fully.saturating_sub(first).saturating_add(1).max(1)
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
    use crate::layout::FROZEN_SEPARATOR_WIDTH;

    fn bare_viewport() -> Viewport {
        Viewport::new(800.0, 600.0).with_headers(HeaderConfig {
            visible: false,
            ..HeaderConfig::default()
        })
    }

    #[test]
    fn test_cell_to_pixel_no_frozen() {
        let layout = SheetLayout::new(20.0, 100.0);
        let vp = bare_viewport();
        let scroll = ScrollPosition::new(100.0, 40.0);
        assert_eq!(vp.cell_to_pixel(&layout, scroll, Cell::new(3, 2)), (0.0, 0.0));
        assert_eq!(vp.cell_to_pixel(&layout, scroll, Cell::new(5, 4)), (200.0, 40.0));
    }

    #[test]
    fn test_cell_to_pixel_frozen_ignores_scroll() {
        let layout = SheetLayout::new(20.0, 100.0).with_frozen(2, 1);
        let vp = bare_viewport();
        let scroll = ScrollPosition::new(300.0, 200.0);
        assert_eq!(vp.cell_to_pixel(&layout, scroll, Cell::new(2, 1)), (0.0, 20.0));
        // first scrollable row sits after the band when scroll is zero
        let (_, y) = vp.cell_to_pixel(&layout, ScrollPosition::default(), Cell::new(3, 1));
        assert_eq!(y, 40.0 + FROZEN_SEPARATOR_WIDTH);
    }

    #[test]
    fn test_pixel_to_cell_inverse() {
        let layout = SheetLayout::new(20.0, 100.0).with_frozen(1, 1);
        let vp = Viewport::new(800.0, 600.0);
        let scroll = ScrollPosition::new(200.0, 60.0);
        // rows 2-4 and columns 2-3 are scrolled under the frozen bands
        for cell in [Cell::new(1, 1), Cell::new(1, 5), Cell::new(6, 1), Cell::new(9, 7)] {
            let (x, y) = vp.cell_to_pixel(&layout, scroll, cell);
            assert_eq!(vp.pixel_to_cell(&layout, scroll, x + 1.0, y + 1.0), Some(cell));
        }
    }

    #[test]
    fn test_pixel_on_headers_and_separator() {
        let layout = SheetLayout::new(20.0, 100.0).with_frozen(1, 0);
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.pixel_to_cell(&layout, ScrollPosition::default(), 10.0, 100.0), None);
        assert_eq!(vp.pixel_to_cell(&layout, ScrollPosition::default(), 100.0, 5.0), None);
        // header 20 + frozen row 20 = separator at 40..43
        assert_eq!(vp.pixel_to_cell(&layout, ScrollPosition::default(), 100.0, 41.0), None);
    }

    #[test]
    fn test_scrollable_extent() {
        let layout = SheetLayout::new(20.0, 100.0).with_frozen(2, 0);
        let vp = Viewport::new(800.0, 600.0);
        let expected = 600.0 - 20.0 - 40.0 - FROZEN_SEPARATOR_WIDTH;
        assert_eq!(vp.scrollable_extent(&layout, Axis::Rows), expected);
    }

    #[test]
    fn test_page_size() {
        let layout = SheetLayout::new(20.0, 100.0);
        let vp = bare_viewport();
        assert_eq!(vp.page_size(&layout, Axis::Rows, ScrollPosition::default()), 30);
        assert_eq!(vp.page_size(&layout, Axis::Columns, ScrollPosition::default()), 8);
    }

    #[test]
    fn test_hit_test_regions() {
        let layout = SheetLayout::new(20.0, 100.0);
        let vp = Viewport::new(800.0, 600.0);
        let scroll = ScrollPosition::default();
        assert_eq!(vp.hit_test(&layout, scroll, 5.0, 5.0), HitTarget::CornerHeader);
        assert_eq!(vp.hit_test(&layout, scroll, 5.0, 45.0), HitTarget::RowHeader(2));
        assert_eq!(vp.hit_test(&layout, scroll, 150.0, 5.0), HitTarget::ColumnHeader(2));
        assert_eq!(vp.hit_test(&layout, scroll, 150.0, 45.0), HitTarget::Cell(Cell::new(2, 2)));
    }

    #[test]
    fn test_clamped_cell_outside_window() {
        let layout = SheetLayout::new(20.0, 100.0);
        let vp = bare_viewport();
        let scroll = ScrollPosition::new(0.0, 100.0);
        assert_eq!(vp.clamped_cell_at(&layout, scroll, -50.0, -50.0), Cell::new(6, 1));
        assert_eq!(vp.clamped_cell_at(&layout, scroll, 5000.0, 5000.0), Cell::new(35, 8));
    }

    #[test]
    fn test_fill_handle_hit() {
        let layout = SheetLayout::new(20.0, 100.0);
        let vp = bare_viewport();
        let area = Area::new(1, 2, 1, 1);
        assert!(vp.hits_fill_handle(&layout, ScrollPosition::default(), &area, 100.0, 40.0));
        assert!(!vp.hits_fill_handle(&layout, ScrollPosition::default(), &area, 50.0, 40.0));
    }
}
