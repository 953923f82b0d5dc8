//! Snapshots captured before destructive structural edits.
//!
//! The calculation model forgets deleted rows, columns and sheets, so the
//! history keeps everything needed to put them back: cell input (quote
//! prefix included), style, sizes and frozen counts.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::CalcModel;
use crate::types::{Cell, CellSnapshot};

/// One stored cell: where it was and what it held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCell {
    pub cell: Cell,
    #[serde(flatten)]
    pub contents: CellSnapshot,
}

/// Contents of a block of deleted rows or columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinesSnapshot {
    pub cells: Vec<SavedCell>,
    /// `(index, size)` of every explicitly sized line in the block.
    pub sizes: Vec<(u32, f64)>,
}

/// Everything a deleted sheet held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSnapshot {
    pub name: String,
    pub cells: Vec<SavedCell>,
    pub row_heights: Vec<(u32, f64)>,
    pub column_widths: Vec<(u32, f64)>,
    pub frozen_rows: u32,
    pub frozen_columns: u32,
}

/// Read one cell's input and style.
pub fn capture_cell<M: CalcModel + ?Sized>(model: &M, sheet: u32, cell: Cell) -> Result<CellSnapshot> {
    Ok(CellSnapshot {
        input: model.get_input(sheet, cell.row, cell.column)?,
        style: model.get_style(sheet, cell.row, cell.column)?,
    })
}

fn capture_cells<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    cells: impl IntoIterator<Item = Cell>,
) -> Result<Vec<SavedCell>> {
    cells
        .into_iter()
        .map(|cell| {
            Ok(SavedCell {
                cell,
                contents: capture_cell(model, sheet, cell)?,
            })
        })
        .collect()
}

/// Snapshot rows `row..row + count` of `sheet`.
pub fn capture_rows<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    row: u32,
    count: u32,
) -> Result<LinesSnapshot> {
    let span = row..row.saturating_add(count);
    let mut cells = Vec::new();
    for r in span.clone() {
        let columns = model.row_cells(sheet, r)?;
        cells.extend(capture_cells(
            model,
            sheet,
            columns.into_iter().map(|c| Cell::new(r, c)),
        )?);
    }
    let sizes = model
        .row_height_overrides(sheet)?
        .into_iter()
        .filter(|(r, _)| span.contains(r))
        .collect();
    Ok(LinesSnapshot { cells, sizes })
}

/// Snapshot columns `column..column + count` of `sheet`.
pub fn capture_columns<M: CalcModel + ?Sized>(
    model: &M,
    sheet: u32,
    column: u32,
    count: u32,
) -> Result<LinesSnapshot> {
    let span = column..column.saturating_add(count);
    let mut cells = Vec::new();
    for c in span.clone() {
        let rows = model.column_cells(sheet, c)?;
        cells.extend(capture_cells(
            model,
            sheet,
            rows.into_iter().map(|r| Cell::new(r, c)),
        )?);
    }
    let sizes = model
        .column_width_overrides(sheet)?
        .into_iter()
        .filter(|(c, _)| span.contains(c))
        .collect();
    Ok(LinesSnapshot { cells, sizes })
}

/// Snapshot a whole sheet.
pub fn capture_sheet<M: CalcModel + ?Sized>(model: &M, sheet: u32) -> Result<SheetSnapshot> {
    let names = model.sheet_names();
    let name = usize::try_from(sheet)
        .ok()
        .and_then(|i| names.get(i))
        .cloned()
        .ok_or(crate::error::GridError::StaleSheet(sheet))?;
    Ok(SheetSnapshot {
        name,
        cells: capture_cells(model, sheet, model.sheet_cells(sheet)?)?,
        row_heights: model.row_height_overrides(sheet)?,
        column_widths: model.column_width_overrides(sheet)?,
        frozen_rows: model.frozen_rows(sheet)?,
        frozen_columns: model.frozen_columns(sheet)?,
    })
}

/// Write stored cells back, input first so the style survives.
pub fn restore_cells<M: CalcModel + ?Sized>(model: &mut M, sheet: u32, cells: &[SavedCell]) -> Result<()> {
    for saved in cells {
        let Cell { row, column } = saved.cell;
        model.set_input(sheet, row, column, &saved.contents.input)?;
        model.set_style(sheet, row, column, &saved.contents.style)?;
    }
    Ok(())
}

/// Re-create a deleted sheet at `index` from its snapshot.
pub fn restore_sheet<M: CalcModel + ?Sized>(model: &mut M, index: u32, snapshot: &SheetSnapshot) -> Result<()> {
    model.insert_sheet(index, &snapshot.name)?;
    for (row, height) in &snapshot.row_heights {
        model.set_row_height(index, *row, Some(*height))?;
    }
    for (column, width) in &snapshot.column_widths {
        model.set_column_width(index, *column, Some(*width))?;
    }
    model.set_frozen_rows(index, snapshot.frozen_rows)?;
    model.set_frozen_columns(index, snapshot.frozen_columns)?;
    restore_cells(model, index, &snapshot.cells)
}
