//! Copy, cut and paste.
//!
//! A copy captures the inputs and styles of the selected block together with
//! a TSV rendering of the display values for the system clipboard. Paste
//! writes the captured block back through the recording model, repeating it
//! over the target when the target is a whole multiple of the block.

use serde::{Deserialize, Serialize};

use super::{mutation, UserModel};
use crate::error::Result;
use crate::history::snapshot::capture_cell;
use crate::model::CalcModel;
use crate::types::{Area, Cell, CellSnapshot, StyleSnapshot, LAST_COLUMN, LAST_ROW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Contents of the widget clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clipboard {
    /// Widget session that produced the clipboard.
    pub session: u64,
    pub mode: ClipboardMode,
    pub sheet: u32,
    /// Copied block, normalized and trimmed to used cells.
    pub area: Area,
    /// Row-major cell contents of `area`.
    pub cells: Vec<Vec<CellSnapshot>>,
    /// Display values as TSV.
    pub text: String,
}

impl Clipboard {
    /// Capture `area` of `sheet`.
    ///
    /// Trailing empty rows and columns are trimmed off like a spreadsheet
    /// does, so copying whole columns stays cheap.
    pub fn capture<M: CalcModel + ?Sized>(
        model: &M,
        session: u64,
        sheet: u32,
        area: &Area,
        mode: ClipboardMode,
    ) -> Result<Self> {
        let a = area.normalized();
        let mut row_end = a.row_start;
        let mut column_end = a.column_start;
        for cell in model.sheet_cells(sheet)? {
            if a.contains(cell) {
                row_end = row_end.max(cell.row);
                column_end = column_end.max(cell.column);
            }
        }
        let area = Area::new(a.row_start, row_end, a.column_start, column_end);

        let mut cells = Vec::new();
        let mut lines = Vec::new();
        for row in area.row_start..=area.row_end {
            let mut snapshots = Vec::new();
            let mut values = Vec::new();
            for column in area.column_start..=area.column_end {
                snapshots.push(capture_cell(model, sheet, Cell::new(row, column))?);
                values.push(model.get_value(sheet, row, column)?);
            }
            cells.push(snapshots);
            lines.push(values);
        }
        Ok(Self {
            session,
            mode,
            sheet,
            area,
            cells,
            text: to_tsv(&lines),
        })
    }

    /// Snapshot of the source cell at block offset `(dr, dc)`.
    fn cell_at(&self, dr: u32, dc: u32) -> Option<&CellSnapshot> {
        let row = usize::try_from(dr).ok()?;
        let column = usize::try_from(dc).ok()?;
        self.cells.get(row)?.get(column)
    }
}

/// Escape a cell value for TSV/clipboard format.
///
/// Values containing tabs, newlines or quotes are wrapped in quotes with
/// internal quotes doubled.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains('\t')
        || value.contains('\n')
        || value.contains('\r')
        || value.contains('"');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Render rows of values as TSV (no trailing newline).
pub fn to_tsv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|v| escape_cell_value(v))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse TSV text as produced by spreadsheets: quoted fields may contain
/// tabs, newlines and doubled quotes. A single trailing newline is ignored.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut at_field_start = true;
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        if quoted {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            '"' if at_field_start => {
                quoted = true;
                at_field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            _ => {
                field.push(ch);
                at_field_start = false;
            }
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

/// Block that a paste of a `rows × columns` source covers when the user
/// selected `target`.
///
/// The whole target is used when it is a multiple of the source on both
/// axes; otherwise one copy of the block lands at the target's top-left.
/// Whole rows, whole columns and the whole sheet never tile.
pub fn paste_area(target: &Area, rows: u32, columns: u32) -> Area {
    let t = target.normalized();
    let rows = rows.max(1);
    let columns = columns.max(1);
    let unbounded = t.row_end == LAST_ROW || t.column_end == LAST_COLUMN;
    if !unbounded && t.row_count() % rows == 0 && t.column_count() % columns == 0 {
        return t;
    }
    Area::new(
        t.row_start,
        t.row_start.saturating_add(rows - 1).min(LAST_ROW),
        t.column_start,
        t.column_start.saturating_add(columns - 1).min(LAST_COLUMN),
    )
}

impl<M: CalcModel> UserModel<M> {
    /// Paste the clipboard onto `target` of `sheet` as one transaction.
    ///
    /// A cut moves the block: the source is cleared and references into it
    /// follow. Returns the area written.
    pub fn paste(&mut self, sheet: u32, target: &Area, clipboard: &Clipboard) -> Result<Area> {
        let rows = clipboard.area.row_count();
        let columns = clipboard.area.column_count();
        match clipboard.mode {
            ClipboardMode::Copy => {
                let area = paste_area(target, rows, columns);
                let mut transaction = Vec::new();
                for cell in area.cells() {
                    let dr = (cell.row - area.row_start) % rows;
                    let dc = (cell.column - area.column_start) % columns;
                    let Some(source) = clipboard.cell_at(dr, dc) else {
                        continue;
                    };
                    let origin = Cell::new(clipboard.area.row_start + dr, clipboard.area.column_start + dc);
                    let value = self.model.copied_value_extended(&source.input, origin, cell)?;
                    transaction.extend(mutation::copy_cell(&self.model, sheet, cell, value, &source.style)?);
                }
                self.apply(transaction)?;
                Ok(area)
            }
            ClipboardMode::Cut => self.paste_cut(sheet, target.top_left(), clipboard),
        }
    }

    fn paste_cut(&mut self, sheet: u32, anchor: Cell, clipboard: &Clipboard) -> Result<Area> {
        let rows = clipboard.area.row_count();
        let columns = clipboard.area.column_count();
        let area = paste_area(&Area::from_cell(anchor), rows, columns);
        let mut transaction = Vec::new();

        // vacate the source first, except where the block lands again
        let default_style = StyleSnapshot::default();
        for cell in clipboard.area.cells() {
            if sheet == clipboard.sheet && area.contains(cell) {
                continue;
            }
            let target = clipboard.sheet;
            if !self.model.get_input(target, cell.row, cell.column)?.is_empty() {
                transaction.push(mutation::value_change(&self.model, target, cell, String::new())?);
            }
            transaction.extend(mutation::style_change(&self.model, target, cell, &default_style)?);
        }

        for cell in area.cells() {
            let dr = cell.row - area.row_start;
            let dc = cell.column - area.column_start;
            let Some(source) = clipboard.cell_at(dr, dc) else {
                continue;
            };
            let value = self
                .model
                .cut_moved_value(&source.input, clipboard.sheet, &clipboard.area, anchor)?;
            transaction.extend(mutation::copy_cell(&self.model, sheet, cell, value, &source.style)?);
        }

        // formulas elsewhere on the source sheet follow the moved block
        for cell in self.model.sheet_cells(clipboard.sheet)? {
            if clipboard.area.contains(cell) || (sheet == clipboard.sheet && area.contains(cell)) {
                continue;
            }
            let Some(formula) = self.model.get_formula(clipboard.sheet, cell.row, cell.column)? else {
                continue;
            };
            let moved = self
                .model
                .cut_moved_value(&formula, clipboard.sheet, &clipboard.area, anchor)?;
            if moved != formula {
                transaction.push(mutation::value_change(&self.model, clipboard.sheet, cell, moved)?);
            }
        }
        self.apply(transaction)?;
        Ok(area)
    }

    /// Paste plain TSV text (from outside the widget) at `anchor`.
    pub fn paste_text(&mut self, sheet: u32, anchor: Cell, text: &str) -> Result<Area> {
        let rows = parse_tsv(text);
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX).max(1);
        let width = rows
            .iter()
            .map(|r| u32::try_from(r.len()).unwrap_or(u32::MAX))
            .max()
            .unwrap_or(1)
            .max(1);
        let area = paste_area(&Area::from_cell(anchor), height, width);
        let mut transaction = Vec::new();
        for (row, values) in (area.row_start..=area.row_end).zip(&rows) {
            for (column, value) in (area.column_start..=area.column_end).zip(values) {
                let cell = Cell::new(row, column);
                if self.model.get_input(sheet, row, column)? != *value {
                    transaction.push(mutation::value_change(&self.model, sheet, cell, value.clone())?);
                }
            }
        }
        self.apply(transaction)?;
        Ok(area)
    }
}
