//! The calculation model seam.
//!
//! The grid never evaluates formulas itself. Everything it knows about cell
//! contents, styles, sheet structure and reference rewriting comes through
//! [`CalcModel`]. [`MemoryModel`] is a small non-evaluating implementation
//! used by the wasm bindings, the replay CLI and the tests.

pub mod lexer;
mod memory;

pub use memory::MemoryModel;

use crate::error::Result;
use crate::types::{Area, Cell, Direction, StyleSnapshot, Token};

/// Narrow interface onto an external spreadsheet engine.
///
/// Sheets are addressed by position (`0..sheet_count`). Rows and columns are
/// 1-based. Every fallible call reports a [`crate::error::GridError`]; an
/// index that no longer exists is `StaleSheet`.
pub trait CalcModel {
    // ---- sheets ----

    fn sheet_names(&self) -> Vec<String>;

    fn sheet_count(&self) -> u32 {
        u32::try_from(self.sheet_names().len()).unwrap_or(u32::MAX)
    }

    /// First `SheetN` name not already taken (case-insensitive).
    fn new_sheet_name(&self) -> String {
        let names = self.sheet_names();
        (1u32..)
            .map(|n| format!("Sheet{n}"))
            .find(|candidate| !names.iter().any(|n| n.eq_ignore_ascii_case(candidate)))
            .unwrap_or_else(|| "Sheet".to_string())
    }

    /// Append a sheet and return its index.
    fn add_sheet(&mut self, name: &str) -> Result<u32>;

    /// Insert an empty sheet so that it ends up at `index`.
    fn insert_sheet(&mut self, index: u32, name: &str) -> Result<()>;

    fn rename_sheet(&mut self, sheet: u32, name: &str) -> Result<()>;

    fn delete_sheet(&mut self, sheet: u32) -> Result<()>;

    // ---- values ----

    /// Display value of a cell (empty string for empty cells).
    fn get_value(&self, sheet: u32, row: u32, column: u32) -> Result<String>;

    /// Formula text including the leading `=`, if the cell holds one.
    fn get_formula(&self, sheet: u32, row: u32, column: u32) -> Result<Option<String>>;

    /// Whether the cell was entered with a leading `'` (forced text).
    fn is_quote_prefix(&self, sheet: u32, row: u32, column: u32) -> Result<bool>;

    /// Set the user input of a cell. Empty text clears the contents but keeps the style.
    fn set_input(&mut self, sheet: u32, row: u32, column: u32, text: &str) -> Result<()>;

    /// The text a user would have typed to produce the cell: the formula if
    /// there is one, otherwise the value with its quote prefix restored.
    fn get_input(&self, sheet: u32, row: u32, column: u32) -> Result<String> {
        if let Some(formula) = self.get_formula(sheet, row, column)? {
            return Ok(formula);
        }
        let value = self.get_value(sheet, row, column)?;
        if self.is_quote_prefix(sheet, row, column)? {
            Ok(format!("'{value}"))
        } else {
            Ok(value)
        }
    }

    fn get_style(&self, sheet: u32, row: u32, column: u32) -> Result<StyleSnapshot>;

    fn set_style(&mut self, sheet: u32, row: u32, column: u32, style: &StyleSnapshot)
        -> Result<()>;

    // ---- structure ----

    fn insert_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()>;
    fn delete_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()>;
    fn insert_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()>;
    fn delete_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()>;

    /// Explicit height of a row, `None` when it uses the default.
    fn row_height(&self, sheet: u32, row: u32) -> Result<Option<f64>>;
    /// Set (`Some`) or reset (`None`) the height of a row.
    fn set_row_height(&mut self, sheet: u32, row: u32, height: Option<f64>) -> Result<()>;
    fn column_width(&self, sheet: u32, column: u32) -> Result<Option<f64>>;
    fn set_column_width(&mut self, sheet: u32, column: u32, width: Option<f64>) -> Result<()>;

    /// All explicit row heights, ascending by row.
    fn row_height_overrides(&self, sheet: u32) -> Result<Vec<(u32, f64)>>;
    /// All explicit column widths, ascending by column.
    fn column_width_overrides(&self, sheet: u32) -> Result<Vec<(u32, f64)>>;

    fn frozen_rows(&self, sheet: u32) -> Result<u32>;
    fn set_frozen_rows(&mut self, sheet: u32, count: u32) -> Result<()>;
    fn frozen_columns(&self, sheet: u32) -> Result<u32>;
    fn set_frozen_columns(&mut self, sheet: u32, count: u32) -> Result<()>;

    /// Columns of `row` that hold input or a non-default style.
    fn row_cells(&self, sheet: u32, row: u32) -> Result<Vec<u32>>;
    /// Rows of `column` that hold input or a non-default style.
    fn column_cells(&self, sheet: u32, column: u32) -> Result<Vec<u32>>;
    /// Every cell that holds input or a non-default style, row-major.
    fn sheet_cells(&self, sheet: u32) -> Result<Vec<Cell>>;

    /// Bounding box of the used cells (`A1` for an empty sheet).
    fn dimension(&self, sheet: u32) -> Result<Area> {
        let cells = self.sheet_cells(sheet)?;
        let mut iter = cells.into_iter();
        let Some(first) = iter.next() else {
            return Ok(Area::from_cell(Cell::new(1, 1)));
        };
        Ok(iter.fold(Area::from_cell(first), |acc, cell| {
            acc.union(&Area::from_cell(cell))
        }))
    }

    // ---- engine services ----

    /// Split formula text into tokens with byte offsets.
    fn tokenize(&self, formula: &str) -> Vec<Token>;

    /// Ctrl+Arrow target: the edge of the current data block in `direction`.
    fn navigate_to_edge(&self, sheet: u32, cell: Cell, direction: Direction) -> Result<Cell>;

    /// Input of `source` as it reads when auto-filled into `target`.
    fn extended_value(&self, sheet: u32, source: Cell, target: Cell) -> Result<String>;

    /// `value` copied from `source` and pasted at `target`, relative references shifted.
    fn copied_value_extended(&self, value: &str, source: Cell, target: Cell) -> Result<String>;

    /// `value` after the block `source` on `sheet` was cut and pasted so that
    /// its top-left corner lands on `target`. References into the block move with it.
    fn cut_moved_value(&self, value: &str, sheet: u32, source: &Area, target: Cell)
        -> Result<String>;

    // ---- persistence ----

    fn to_json(&self) -> Result<String>;
    fn load_json(&mut self, json: &str) -> Result<()>;
}
