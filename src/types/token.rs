use serde::{Deserialize, Serialize};

/// One end of a cell reference, with its absolute (`$`) flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefPart {
    pub row: u32,
    pub column: u32,
    pub absolute_row: bool,
    pub absolute_column: bool,
}

impl RefPart {
    /// Advance the absolute flags one step through
    /// `A1 → $A$1 → A$1 → $A1 → A1`.
    #[must_use]
    pub fn cycle_absolute(self) -> Self {
        let (absolute_column, absolute_row) = match (self.absolute_column, self.absolute_row) {
            (false, false) => (true, true),
            (true, true) => (false, true),
            (false, true) => (true, false),
            (true, false) => (false, false),
        };
        Self {
            absolute_row,
            absolute_column,
            ..self
        }
    }
}

/// Token kinds produced by the calculation model's formula tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TokenKind {
    Reference {
        sheet: Option<String>,
        cell: RefPart,
    },
    Range {
        sheet: Option<String>,
        start: RefPart,
        end: RefPart,
    },
    Operator,
    OpenParen,
    CloseParen,
    /// Argument separator (`,` or `;`).
    Separator,
    Number,
    Text,
    Ident,
    Whitespace,
    Error,
}

/// A formula token spanning `start..end` (byte offsets into the formula text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(flatten)]
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_reference(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Reference { .. } | TokenKind::Range { .. }
        )
    }

    /// Does the token overlap the byte range `start..=end`?
    ///
    /// A collapsed caret touching either end of the token counts.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start <= end && start <= self.end
    }
}
