use serde::{Deserialize, Serialize};

/// Last addressable row (1-based, inclusive).
pub const LAST_ROW: u32 = 1_048_576;

/// Last addressable column (1-based, inclusive).
pub const LAST_COLUMN: u32 = 16_384;

/// A cell address. Both coordinates are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
}

impl Cell {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Move by a signed delta, clamping the result into `[1, LAST_ROW] × [1, LAST_COLUMN]`.
    #[must_use]
    pub fn offset_clamped(self, delta_row: i64, delta_column: i64) -> Self {
        Self {
            row: clamp_index(i64::from(self.row) + delta_row, LAST_ROW),
            column: clamp_index(i64::from(self.column) + delta_column, LAST_COLUMN),
        }
    }

    /// Move by a signed delta, or `None` if the result leaves the grid.
    #[must_use]
    pub fn offset(self, delta_row: i64, delta_column: i64) -> Option<Self> {
        let row = i64::from(self.row) + delta_row;
        let column = i64::from(self.column) + delta_column;
        if row < 1 || column < 1 || row > i64::from(LAST_ROW) || column > i64::from(LAST_COLUMN) {
            return None;
        }
        Some(Self {
            row: u32::try_from(row).ok()?,
            column: u32::try_from(column).ok()?,
        })
    }
}

/// Clamp a signed index into `[1, last]`.
pub fn clamp_index(value: i64, last: u32) -> u32 {
    u32::try_from(value.clamp(1, i64::from(last))).unwrap_or(1)
}

/// A rectangular block of cells.
///
/// May be stored unnormalized (`start > end`) while a drag is in progress;
/// call [`Area::normalized`] before any geometric query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub row_start: u32,
    pub row_end: u32,
    pub column_start: u32,
    pub column_end: u32,
}

impl Area {
    pub const fn new(row_start: u32, row_end: u32, column_start: u32, column_end: u32) -> Self {
        Self {
            row_start,
            row_end,
            column_start,
            column_end,
        }
    }

    /// Single-cell area.
    pub const fn from_cell(cell: Cell) -> Self {
        Self::new(cell.row, cell.row, cell.column, cell.column)
    }

    /// Area spanned by two corner cells, in any order (stored unnormalized).
    pub const fn from_corners(anchor: Cell, target: Cell) -> Self {
        Self::new(anchor.row, target.row, anchor.column, target.column)
    }

    /// Get normalized bounds (`start <= end` on both axes).
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            row_start: self.row_start.min(self.row_end),
            row_end: self.row_start.max(self.row_end),
            column_start: self.column_start.min(self.column_end),
            column_end: self.column_start.max(self.column_end),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let a = self.normalized();
        a.row_start <= cell.row
            && cell.row <= a.row_end
            && a.column_start <= cell.column
            && cell.column <= a.column_end
    }

    pub fn row_count(&self) -> u32 {
        let a = self.normalized();
        a.row_end - a.row_start + 1
    }

    pub fn column_count(&self) -> u32 {
        let a = self.normalized();
        a.column_end - a.column_start + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_count() == 1 && self.column_count() == 1
    }

    /// Top-left cell of the normalized area.
    pub fn top_left(&self) -> Cell {
        let a = self.normalized();
        Cell::new(a.row_start, a.column_start)
    }

    /// Smallest area covering both.
    #[must_use]
    pub fn union(&self, other: &Area) -> Self {
        let a = self.normalized();
        let b = other.normalized();
        Self {
            row_start: a.row_start.min(b.row_start),
            row_end: a.row_end.max(b.row_end),
            column_start: a.column_start.min(b.column_start),
            column_end: a.column_end.max(b.column_end),
        }
    }

    pub fn intersects(&self, other: &Area) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.row_start <= b.row_end
            && b.row_start <= a.row_end
            && a.column_start <= b.column_end
            && b.column_start <= a.column_end
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let a = self.normalized();
        (a.row_start..=a.row_end)
            .flat_map(move |row| (a.column_start..=a.column_end).map(move |col| Cell::new(row, col)))
    }
}

/// One edge of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Left,
    Right,
    Top,
    Bottom,
}

impl Border {
    /// Axis the border moves along when dragged.
    pub fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Rows,
            Self::Left | Self::Right => Axis::Columns,
        }
    }
}

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(delta_row, delta_column)` for one step.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Rows,
            Self::Left | Self::Right => Axis::Columns,
        }
    }
}

/// Grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Rows,
    Columns,
}

/// Scroll offset in pixels of the scrollable (non-frozen) region.
///
/// Always the offset of the top-left corner of a real non-frozen cell,
/// measured from the first non-frozen cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub left: f64,
    pub top: f64,
}

impl ScrollPosition {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Rows => self.top,
            Axis::Columns => self.left,
        }
    }

    #[must_use]
    pub fn with(self, axis: Axis, offset: f64) -> Self {
        match axis {
            Axis::Rows => Self { top: offset, ..self },
            Axis::Columns => Self {
                left: offset,
                ..self
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_bounds() {
        let area = Area::new(5, 2, 7, 3);
        let n = area.normalized();
        assert_eq!(n, Area::new(2, 5, 3, 7));
        assert!(area.contains(Cell::new(3, 4)));
        assert!(!area.contains(Cell::new(1, 4)));
    }

    #[test]
    fn test_offset_clamped() {
        let c = Cell::new(1, 1).offset_clamped(-5, 3);
        assert_eq!(c, Cell::new(1, 4));
        let c = Cell::new(LAST_ROW, 2).offset_clamped(10, 0);
        assert_eq!(c.row, LAST_ROW);
        assert_eq!(Cell::new(1, 1).offset(-1, 0), None);
    }

    #[test]
    fn test_union_and_intersects() {
        let a = Area::new(1, 2, 1, 2);
        let b = Area::new(4, 4, 3, 3);
        assert!(!a.intersects(&b));
        assert_eq!(a.union(&b), Area::new(1, 4, 1, 3));
        assert_eq!(a.cells().count(), 4);
    }
}
