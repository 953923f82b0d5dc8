//! In-memory, non-evaluating [`CalcModel`].
//!
//! Stores user input and opaque styles per cell, plus per-sheet sizes and
//! frozen counts. Formulas are kept as text: a formula cell's value is its
//! formula. Input is still validated (balanced parentheses, known sheet
//! names) so that failure paths can be exercised.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lexer;
use super::CalcModel;
use crate::error::{GridError, Result};
use crate::types::{
    Area, Cell, Direction, StyleSnapshot, Token, TokenKind, LAST_COLUMN, LAST_ROW,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct MemoryCell {
    #[serde(skip_serializing_if = "String::is_empty")]
    input: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    quote_prefix: bool,
    #[serde(skip_serializing_if = "StyleSnapshot::is_default")]
    style: StyleSnapshot,
}

impl MemoryCell {
    fn is_empty(&self) -> bool {
        self.input.is_empty() && self.style.is_default()
    }

    fn has_input(&self) -> bool {
        !self.input.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MemorySheet {
    name: String,
    /// row → column → cell
    rows: BTreeMap<u32, BTreeMap<u32, MemoryCell>>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u32, f64>,
    frozen_rows: u32,
    frozen_columns: u32,
}

impl MemorySheet {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn cell(&self, row: u32, column: u32) -> Option<&MemoryCell> {
        self.rows.get(&row).and_then(|r| r.get(&column))
    }

    fn has_input(&self, row: u32, column: u32) -> bool {
        self.cell(row, column).is_some_and(MemoryCell::has_input)
    }

    /// Apply `update` to the cell, dropping it (and its row) once empty.
    fn update_cell(&mut self, row: u32, column: u32, update: impl FnOnce(&mut MemoryCell)) {
        let cells = self.rows.entry(row).or_default();
        let cell = cells.entry(column).or_default();
        update(cell);
        if cell.is_empty() {
            cells.remove(&column);
        }
        if cells.is_empty() {
            self.rows.remove(&row);
        }
    }
}

/// Shift the keys `>= from` of a map by `delta`. Keys landing in the
/// deleted span `[from, from - delta)` (for negative deltas) are dropped.
fn shift_keys<V>(map: &mut BTreeMap<u32, V>, from: u32, delta: i64) {
    let moved = map.split_off(&from);
    for (key, value) in moved {
        let target = i64::from(key) + delta;
        if target >= i64::from(from) {
            if let Ok(target) = u32::try_from(target) {
                map.insert(target, value);
            }
        }
    }
}

/// Would inserting `count` entries at `from` push a key past `last`?
fn overflows<V>(map: &BTreeMap<u32, V>, from: u32, count: u32, last: u32) -> bool {
    map.range(from..)
        .next_back()
        .is_some_and(|(k, _)| u64::from(*k) + u64::from(count) > u64::from(last))
}

fn validate_span(start: u32, count: u32, last: u32, what: &str) -> Result<()> {
    if start == 0 || count == 0 || u64::from(start) + u64::from(count) - 1 > u64::from(last) {
        return Err(GridError::InvalidReference(format!(
            "{what} {start} (+{count}) outside the sheet"
        )));
    }
    Ok(())
}

fn validate_cell(row: u32, column: u32) -> Result<()> {
    if row == 0 || column == 0 || row > LAST_ROW || column > LAST_COLUMN {
        return Err(GridError::InvalidReference(format!(
            "row {row}, column {column}"
        )));
    }
    Ok(())
}

fn validate_size(size: Option<f64>) -> Result<()> {
    match size {
        Some(s) if !s.is_finite() || s < 0.0 => {
            Err(GridError::Model(format!("invalid size {s}")))
        }
        _ => Ok(()),
    }
}

/// A workbook held entirely in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryModel {
    sheets: Vec<MemorySheet>,
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModel {
    /// A workbook with one empty sheet called `Sheet1`.
    pub fn new() -> Self {
        Self {
            sheets: vec![MemorySheet::named("Sheet1")],
        }
    }

    /// Parse a workbook previously produced by [`CalcModel::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        if model.sheets.is_empty() {
            return Err(GridError::Model("workbook has no sheets".into()));
        }
        Ok(model)
    }

    fn sheet(&self, sheet: u32) -> Result<&MemorySheet> {
        usize::try_from(sheet)
            .ok()
            .and_then(|i| self.sheets.get(i))
            .ok_or(GridError::StaleSheet(sheet))
    }

    fn sheet_mut(&mut self, sheet: u32) -> Result<&mut MemorySheet> {
        usize::try_from(sheet)
            .ok()
            .and_then(|i| self.sheets.get_mut(i))
            .ok_or(GridError::StaleSheet(sheet))
    }

    fn sheet_index_by_name(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn validate_sheet_name(&self, name: &str, except: Option<usize>) -> Result<()> {
        if name.trim().is_empty()
            || name.chars().count() > 31
            || name.contains(['[', ']', ':', '*', '?', '/', '\\'])
        {
            return Err(GridError::InvalidReference(format!(
                "invalid sheet name '{name}'"
            )));
        }
        match self.sheet_index_by_name(name) {
            Some(i) if Some(i) != except => Err(GridError::DuplicateSheetName(name.to_string())),
            _ => Ok(()),
        }
    }

    /// Reject formulas the engine could not parse.
    fn validate_formula(&self, text: &str) -> Result<()> {
        let tokens = lexer::tokenize(text);
        if !lexer::parens_balanced(&tokens) {
            return Err(GridError::Model(format!("unbalanced parentheses in {text}")));
        }
        for token in &tokens {
            let sheet = match &token.kind {
                TokenKind::Reference { sheet, .. } | TokenKind::Range { sheet, .. } => sheet,
                _ => continue,
            };
            if let Some(name) = sheet {
                if self.sheet_index_by_name(name).is_none() {
                    return Err(GridError::InvalidReference(format!("unknown sheet '{name}'")));
                }
            }
        }
        Ok(())
    }

    fn edge_along(occupied: &[u32], from: u32, forward: bool, last: u32) -> u32 {
        let has = |i: u32| occupied.binary_search(&i).is_ok();
        let step = |i: u32| if forward { i.checked_add(1) } else { i.checked_sub(1) };
        let in_grid = |i: u32| (1..=last).contains(&i);
        let next = step(from).filter(|i| in_grid(*i));
        let Some(next) = next else {
            return from;
        };
        if has(from) && has(next) {
            // walk to the end of the current block
            let mut at = next;
            while let Some(n) = step(at).filter(|i| in_grid(*i) && has(*i)) {
                at = n;
            }
            return at;
        }
        // jump to the start of the next block, or the grid edge
        let found = if forward {
            occupied.iter().copied().find(|i| *i > from)
        } else {
            occupied.iter().rev().copied().find(|i| *i < from)
        };
        found.unwrap_or(if forward { last } else { 1 })
    }
}

impl CalcModel for MemoryModel {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn add_sheet(&mut self, name: &str) -> Result<u32> {
        self.validate_sheet_name(name, None)?;
        self.sheets.push(MemorySheet::named(name));
        u32::try_from(self.sheets.len() - 1)
            .map_err(|_| GridError::Invariant("too many sheets".into()))
    }

    fn insert_sheet(&mut self, index: u32, name: &str) -> Result<()> {
        self.validate_sheet_name(name, None)?;
        let at = usize::try_from(index).map_err(|_| GridError::StaleSheet(index))?;
        if at > self.sheets.len() {
            return Err(GridError::StaleSheet(index));
        }
        self.sheets.insert(at, MemorySheet::named(name));
        Ok(())
    }

    fn rename_sheet(&mut self, sheet: u32, name: &str) -> Result<()> {
        let index = usize::try_from(sheet).map_err(|_| GridError::StaleSheet(sheet))?;
        self.validate_sheet_name(name, Some(index))?;
        self.sheet_mut(sheet)?.name = name.to_string();
        Ok(())
    }

    fn delete_sheet(&mut self, sheet: u32) -> Result<()> {
        self.sheet(sheet)?;
        if self.sheets.len() == 1 {
            return Err(GridError::Model("cannot delete the only sheet".into()));
        }
        let index = usize::try_from(sheet).map_err(|_| GridError::StaleSheet(sheet))?;
        self.sheets.remove(index);
        Ok(())
    }

    fn get_value(&self, sheet: u32, row: u32, column: u32) -> Result<String> {
        Ok(self
            .sheet(sheet)?
            .cell(row, column)
            .map(|c| c.input.clone())
            .unwrap_or_default())
    }

    fn get_formula(&self, sheet: u32, row: u32, column: u32) -> Result<Option<String>> {
        Ok(self
            .sheet(sheet)?
            .cell(row, column)
            .filter(|c| !c.quote_prefix && c.input.starts_with('='))
            .map(|c| c.input.clone()))
    }

    fn is_quote_prefix(&self, sheet: u32, row: u32, column: u32) -> Result<bool> {
        Ok(self
            .sheet(sheet)?
            .cell(row, column)
            .is_some_and(|c| c.quote_prefix))
    }

    fn set_input(&mut self, sheet: u32, row: u32, column: u32, text: &str) -> Result<()> {
        validate_cell(row, column)?;
        self.sheet(sheet)?;
        let (input, quote_prefix) = match text.strip_prefix('\'') {
            Some(rest) => (rest.to_string(), true),
            None => (text.to_string(), false),
        };
        if !quote_prefix && input.starts_with('=') {
            self.validate_formula(&input)?;
        }
        self.sheet_mut(sheet)?.update_cell(row, column, |cell| {
            cell.input = input;
            cell.quote_prefix = quote_prefix && !cell.input.is_empty();
        });
        Ok(())
    }

    fn get_style(&self, sheet: u32, row: u32, column: u32) -> Result<StyleSnapshot> {
        Ok(self
            .sheet(sheet)?
            .cell(row, column)
            .map(|c| c.style.clone())
            .unwrap_or_default())
    }

    fn set_style(
        &mut self,
        sheet: u32,
        row: u32,
        column: u32,
        style: &StyleSnapshot,
    ) -> Result<()> {
        validate_cell(row, column)?;
        self.sheet_mut(sheet)?
            .update_cell(row, column, |cell| cell.style = style.clone());
        Ok(())
    }

    fn insert_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()> {
        validate_span(row, count, LAST_ROW, "row")?;
        let s = self.sheet_mut(sheet)?;
        if overflows(&s.rows, row, count, LAST_ROW) || overflows(&s.row_heights, row, count, LAST_ROW)
        {
            return Err(GridError::Model("insert would push data off the sheet".into()));
        }
        shift_keys(&mut s.rows, row, i64::from(count));
        shift_keys(&mut s.row_heights, row, i64::from(count));
        Ok(())
    }

    fn delete_rows(&mut self, sheet: u32, row: u32, count: u32) -> Result<()> {
        validate_span(row, count, LAST_ROW, "row")?;
        let s = self.sheet_mut(sheet)?;
        shift_keys(&mut s.rows, row, -i64::from(count));
        shift_keys(&mut s.row_heights, row, -i64::from(count));
        Ok(())
    }

    fn insert_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()> {
        validate_span(column, count, LAST_COLUMN, "column")?;
        let s = self.sheet_mut(sheet)?;
        let pushed_off = s
            .rows
            .values()
            .any(|cells| overflows(cells, column, count, LAST_COLUMN));
        if pushed_off || overflows(&s.column_widths, column, count, LAST_COLUMN) {
            return Err(GridError::Model("insert would push data off the sheet".into()));
        }
        for cells in s.rows.values_mut() {
            shift_keys(cells, column, i64::from(count));
        }
        shift_keys(&mut s.column_widths, column, i64::from(count));
        Ok(())
    }

    fn delete_columns(&mut self, sheet: u32, column: u32, count: u32) -> Result<()> {
        validate_span(column, count, LAST_COLUMN, "column")?;
        let s = self.sheet_mut(sheet)?;
        for cells in s.rows.values_mut() {
            shift_keys(cells, column, -i64::from(count));
        }
        s.rows.retain(|_, cells| !cells.is_empty());
        shift_keys(&mut s.column_widths, column, -i64::from(count));
        Ok(())
    }

    fn row_height(&self, sheet: u32, row: u32) -> Result<Option<f64>> {
        Ok(self.sheet(sheet)?.row_heights.get(&row).copied())
    }

    fn set_row_height(&mut self, sheet: u32, row: u32, height: Option<f64>) -> Result<()> {
        validate_cell(row, 1)?;
        validate_size(height)?;
        let s = self.sheet_mut(sheet)?;
        match height {
            Some(h) => s.row_heights.insert(row, h),
            None => s.row_heights.remove(&row),
        };
        Ok(())
    }

    fn column_width(&self, sheet: u32, column: u32) -> Result<Option<f64>> {
        Ok(self.sheet(sheet)?.column_widths.get(&column).copied())
    }

    fn set_column_width(&mut self, sheet: u32, column: u32, width: Option<f64>) -> Result<()> {
        validate_cell(1, column)?;
        validate_size(width)?;
        let s = self.sheet_mut(sheet)?;
        match width {
            Some(w) => s.column_widths.insert(column, w),
            None => s.column_widths.remove(&column),
        };
        Ok(())
    }

    fn row_height_overrides(&self, sheet: u32) -> Result<Vec<(u32, f64)>> {
        Ok(self
            .sheet(sheet)?
            .row_heights
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect())
    }

    fn column_width_overrides(&self, sheet: u32) -> Result<Vec<(u32, f64)>> {
        Ok(self
            .sheet(sheet)?
            .column_widths
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect())
    }

    fn frozen_rows(&self, sheet: u32) -> Result<u32> {
        Ok(self.sheet(sheet)?.frozen_rows)
    }

    fn set_frozen_rows(&mut self, sheet: u32, count: u32) -> Result<()> {
        if count >= LAST_ROW {
            return Err(GridError::Model(format!("cannot freeze {count} rows")));
        }
        self.sheet_mut(sheet)?.frozen_rows = count;
        Ok(())
    }

    fn frozen_columns(&self, sheet: u32) -> Result<u32> {
        Ok(self.sheet(sheet)?.frozen_columns)
    }

    fn set_frozen_columns(&mut self, sheet: u32, count: u32) -> Result<()> {
        if count >= LAST_COLUMN {
            return Err(GridError::Model(format!("cannot freeze {count} columns")));
        }
        self.sheet_mut(sheet)?.frozen_columns = count;
        Ok(())
    }

    fn row_cells(&self, sheet: u32, row: u32) -> Result<Vec<u32>> {
        Ok(self
            .sheet(sheet)?
            .rows
            .get(&row)
            .map(|cells| cells.keys().copied().collect())
            .unwrap_or_default())
    }

    fn column_cells(&self, sheet: u32, column: u32) -> Result<Vec<u32>> {
        Ok(self
            .sheet(sheet)?
            .rows
            .iter()
            .filter(|(_, cells)| cells.contains_key(&column))
            .map(|(row, _)| *row)
            .collect())
    }

    fn sheet_cells(&self, sheet: u32) -> Result<Vec<Cell>> {
        Ok(self
            .sheet(sheet)?
            .rows
            .iter()
            .flat_map(|(row, cells)| cells.keys().map(move |col| Cell::new(*row, *col)))
            .collect())
    }

    fn tokenize(&self, formula: &str) -> Vec<Token> {
        lexer::tokenize(formula)
    }

    fn navigate_to_edge(&self, sheet: u32, cell: Cell, direction: Direction) -> Result<Cell> {
        let s = self.sheet(sheet)?;
        let cell = match direction {
            Direction::Left | Direction::Right => {
                let occupied: Vec<u32> = s
                    .rows
                    .get(&cell.row)
                    .map(|cells| {
                        cells
                            .iter()
                            .filter(|(_, c)| c.has_input())
                            .map(|(col, _)| *col)
                            .collect()
                    })
                    .unwrap_or_default();
                let forward = direction == Direction::Right;
                Cell::new(
                    cell.row,
                    Self::edge_along(&occupied, cell.column, forward, LAST_COLUMN),
                )
            }
            Direction::Up | Direction::Down => {
                let occupied: Vec<u32> = s
                    .rows
                    .keys()
                    .copied()
                    .filter(|row| s.has_input(*row, cell.column))
                    .collect();
                let forward = direction == Direction::Down;
                Cell::new(
                    Self::edge_along(&occupied, cell.row, forward, LAST_ROW),
                    cell.column,
                )
            }
        };
        Ok(cell)
    }

    fn extended_value(&self, sheet: u32, source: Cell, target: Cell) -> Result<String> {
        let input = self.get_input(sheet, source.row, source.column)?;
        self.copied_value_extended(&input, source, target)
    }

    fn copied_value_extended(&self, value: &str, source: Cell, target: Cell) -> Result<String> {
        let delta_row = i64::from(target.row) - i64::from(source.row);
        let delta_column = i64::from(target.column) - i64::from(source.column);
        Ok(lexer::shift_references(value, delta_row, delta_column))
    }

    fn cut_moved_value(
        &self,
        value: &str,
        sheet: u32,
        source: &Area,
        target: Cell,
    ) -> Result<String> {
        let name = self.sheet(sheet)?.name.clone();
        let origin = source.top_left();
        let delta_row = i64::from(target.row) - i64::from(origin.row);
        let delta_column = i64::from(target.column) - i64::from(origin.column);
        Ok(lexer::move_references(
            value,
            &source.normalized(),
            delta_row,
            delta_column,
            |qualifier| qualifier.map_or(true, |q| q.eq_ignore_ascii_case(&name)),
        ))
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn load_json(&mut self, json: &str) -> Result<()> {
        *self = Self::from_json(json)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get_input() {
        let mut m = MemoryModel::new();
        m.set_input(0, 1, 1, "42").unwrap();
        m.set_input(0, 1, 2, "=A1*2").unwrap();
        m.set_input(0, 1, 3, "'007").unwrap();
        assert_eq!(m.get_value(0, 1, 1).unwrap(), "42");
        assert_eq!(m.get_formula(0, 1, 2).unwrap().as_deref(), Some("=A1*2"));
        assert_eq!(m.get_value(0, 1, 3).unwrap(), "007");
        assert!(m.is_quote_prefix(0, 1, 3).unwrap());
        assert_eq!(m.get_input(0, 1, 3).unwrap(), "'007");
    }

    #[test]
    fn test_clear_keeps_style() {
        let mut m = MemoryModel::new();
        let style = StyleSnapshot::from(json!({"bold": true}));
        m.set_input(0, 2, 2, "x").unwrap();
        m.set_style(0, 2, 2, &style).unwrap();
        m.set_input(0, 2, 2, "").unwrap();
        assert_eq!(m.get_value(0, 2, 2).unwrap(), "");
        assert_eq!(m.get_style(0, 2, 2).unwrap(), style);
        m.set_style(0, 2, 2, &StyleSnapshot::default()).unwrap();
        assert!(m.sheet_cells(0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_formula_rejected() {
        let mut m = MemoryModel::new();
        assert!(m.set_input(0, 1, 1, "=SUM(A1").is_err());
        let err = m.set_input(0, 1, 1, "=Nope!A1").unwrap_err();
        assert!(matches!(err, GridError::InvalidReference(_)));
        assert_eq!(m.get_value(0, 1, 1).unwrap(), "");
    }

    #[test]
    fn test_delete_and_insert_rows_shift() {
        let mut m = MemoryModel::new();
        m.set_input(0, 2, 1, "two").unwrap();
        m.set_input(0, 3, 1, "three").unwrap();
        m.set_input(0, 4, 1, "four").unwrap();
        m.set_row_height(0, 4, Some(30.0)).unwrap();
        m.delete_rows(0, 3, 1).unwrap();
        assert_eq!(m.get_value(0, 3, 1).unwrap(), "four");
        assert_eq!(m.row_height(0, 3).unwrap(), Some(30.0));
        m.insert_rows(0, 2, 2).unwrap();
        assert_eq!(m.get_value(0, 4, 1).unwrap(), "two");
        assert_eq!(m.get_value(0, 5, 1).unwrap(), "four");
        assert_eq!(m.row_height(0, 5).unwrap(), Some(30.0));
    }

    #[test]
    fn test_columns_shift() {
        let mut m = MemoryModel::new();
        m.set_input(0, 1, 3, "c").unwrap();
        m.insert_columns(0, 1, 1).unwrap();
        assert_eq!(m.get_value(0, 1, 4).unwrap(), "c");
        m.delete_columns(0, 2, 3).unwrap();
        assert!(m.sheet_cells(0).unwrap().is_empty());
    }

    #[test]
    fn test_sheet_names() {
        let mut m = MemoryModel::new();
        assert_eq!(m.add_sheet("Data").unwrap(), 1);
        assert!(matches!(
            m.add_sheet("data"),
            Err(GridError::DuplicateSheetName(_))
        ));
        m.rename_sheet(1, "Data").unwrap();
        assert_eq!(m.new_sheet_name(), "Sheet2");
        m.delete_sheet(0).unwrap();
        assert!(m.delete_sheet(0).is_err());
        assert!(matches!(m.get_value(3, 1, 1), Err(GridError::StaleSheet(3))));
    }

    #[test]
    fn test_navigate_to_edge() {
        let mut m = MemoryModel::new();
        for col in [3, 4, 5, 9] {
            m.set_input(0, 1, col, "v").unwrap();
        }
        let right = |m: &MemoryModel, col| {
            m.navigate_to_edge(0, Cell::new(1, col), Direction::Right)
                .unwrap()
                .column
        };
        assert_eq!(right(&m, 1), 3);
        assert_eq!(right(&m, 3), 5);
        assert_eq!(right(&m, 5), 9);
        assert_eq!(right(&m, 9), LAST_COLUMN);
        let up = m
            .navigate_to_edge(0, Cell::new(10, 4), Direction::Up)
            .unwrap();
        assert_eq!(up, Cell::new(1, 4));
    }

    #[test]
    fn test_extended_value_shifts_refs() {
        let mut m = MemoryModel::new();
        m.set_input(0, 1, 2, "=A1+1").unwrap();
        let v = m.extended_value(0, Cell::new(1, 2), Cell::new(3, 2)).unwrap();
        assert_eq!(v, "=A3+1");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut m = MemoryModel::new();
        m.set_input(0, 5, 5, "=E4").unwrap();
        m.set_frozen_rows(0, 2).unwrap();
        let json = m.to_json().unwrap();
        let mut other = MemoryModel::new();
        other.load_json(&json).unwrap();
        assert_eq!(other, m);
    }
}
