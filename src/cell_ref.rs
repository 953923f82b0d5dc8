//! Utilities for Excel-style cell references: column letters, `A1`/`$A$1`
//! addresses and sheet-qualified names. Rows and columns are 1-based.

use crate::types::{Area, Cell, RefPart, LAST_COLUMN, LAST_ROW};

/// Convert a 1-based column index to letters (1 → A, 27 → AA).
pub fn column_to_letters(column: u32) -> String {
    let mut result = Vec::new();
    let mut n = column;
    while n > 0 {
        n -= 1;
        // n % 26 < 26, always fits
        let digit = u8::try_from(n % 26).unwrap_or(0);
        result.push(char::from(b'A' + digit));
        n /= 26;
    }
    result.iter().rev().collect()
}

/// Convert column letters to a 1-based index. Case-insensitive.
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let upper = ch.to_ascii_uppercase();
        col = col
            .checked_mul(26)?
            .checked_add(u32::from(upper) - u32::from('A') + 1)?;
    }
    (col <= LAST_COLUMN).then_some(col)
}

/// Parse a reference like `B3`, `$B$3` or `b$3` into its parts.
pub fn parse_ref_part(text: &str) -> Option<RefPart> {
    let mut rest = text.trim();
    let absolute_column = rest.starts_with('$');
    if absolute_column {
        rest = rest.get(1..)?;
    }
    let letters_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let column = letters_to_column(rest.get(..letters_end)?)?;
    rest = rest.get(letters_end..)?;
    let absolute_row = rest.starts_with('$');
    if absolute_row {
        rest = rest.get(1..)?;
    }
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: u32 = rest.parse().ok()?;
    if row == 0 || row > LAST_ROW {
        return None;
    }
    Some(RefPart {
        row,
        column,
        absolute_row,
        absolute_column,
    })
}

/// Parse a plain cell reference like `A1` into a [`Cell`]. `$` markers are ignored.
pub fn parse_cell_ref(cell_ref: &str) -> Option<Cell> {
    parse_ref_part(cell_ref).map(|p| Cell::new(p.row, p.column))
}

/// Parse a range like `A1:B10` or a single `A1` into an [`Area`].
pub fn parse_cell_range(range: &str) -> Option<Area> {
    if let Some((start, end)) = range.split_once(':') {
        let start = parse_cell_ref(start)?;
        let end = parse_cell_ref(end)?;
        Some(Area::from_corners(start, end))
    } else {
        parse_cell_ref(range).map(Area::from_cell)
    }
}

/// Format a reference part with its `$` markers.
pub fn format_ref_part(part: &RefPart) -> String {
    format!(
        "{}{}{}{}",
        if part.absolute_column { "$" } else { "" },
        column_to_letters(part.column),
        if part.absolute_row { "$" } else { "" },
        part.row
    )
}

/// Relative `A1`-style address of a cell.
pub fn cell_address(cell: Cell) -> String {
    format!("{}{}", column_to_letters(cell.column), cell.row)
}

/// Relative address of an area (`A1` for a single cell, `A1:C4` otherwise).
pub fn area_address(area: &Area) -> String {
    let area = area.normalized();
    let start = Cell::new(area.row_start, area.column_start);
    let end = Cell::new(area.row_end, area.column_end);
    if start == end {
        cell_address(start)
    } else {
        format!("{}:{}", cell_address(start), cell_address(end))
    }
}

/// Quote a sheet name for use as a reference prefix when needed.
///
/// `Sheet1` stays bare, `My Sheet` becomes `'My Sheet'` and embedded quotes are doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let needs_quotes = name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        || parse_ref_part(name).is_some();
    if needs_quotes {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

/// Prefix `reference` with the quoted sheet name: `Sheet2!A1`.
pub fn qualify(sheet_name: &str, reference: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet_name), reference)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, "A")]
    #[test_case(26, "Z")]
    #[test_case(27, "AA")]
    #[test_case(52, "AZ")]
    #[test_case(703, "AAA")]
    #[test_case(16_384, "XFD")]
    fn test_column_letters(column: u32, letters: &str) {
        assert_eq!(column_to_letters(column), letters);
        assert_eq!(letters_to_column(letters), Some(column));
    }

    #[test]
    fn test_letters_out_of_range() {
        assert_eq!(letters_to_column("XFE"), None);
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
    }

    #[test]
    fn test_parse_ref_part_flags() {
        let p = parse_ref_part("$B3").unwrap();
        assert!(p.absolute_column);
        assert!(!p.absolute_row);
        assert_eq!((p.row, p.column), (3, 2));

        let p = parse_ref_part("c$10").unwrap();
        assert!(!p.absolute_column);
        assert!(p.absolute_row);
        assert_eq!((p.row, p.column), (10, 3));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_ref_part("A0").is_none());
        assert!(parse_ref_part("1A").is_none());
        assert!(parse_ref_part("A1B").is_none());
        assert!(parse_ref_part("A1048577").is_none());
    }

    #[test]
    fn test_area_address() {
        let area = parse_cell_range("C4:A1").unwrap();
        assert_eq!(area_address(&area), "A1:C4");
        assert_eq!(area_address(&Area::from_cell(Cell::new(2, 2))), "B2");
    }

    #[test]
    fn test_quote_sheet_name() {
        assert_eq!(quote_sheet_name("Sheet1"), "Sheet1");
        assert_eq!(quote_sheet_name("My Sheet"), "'My Sheet'");
        assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
        assert_eq!(quote_sheet_name("A1"), "'A1'");
        assert_eq!(qualify("Data 2", "B7"), "'Data 2'!B7");
    }
}
