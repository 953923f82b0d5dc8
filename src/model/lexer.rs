//! Minimal formula tokenizer and reference rewriting.
//!
//! Only what the grid needs: references and ranges (optionally
//! sheet-qualified) with exact byte spans, plus enough of the surrounding
//! syntax to tell where a reference may be inserted. Nothing is evaluated.

use crate::cell_ref::{format_ref_part, parse_ref_part};
use crate::types::{Area, Cell, RefPart, Token, TokenKind, LAST_COLUMN, LAST_ROW};

/// Text spliced in for references that fall off the grid.
pub const REF_ERROR: &str = "#REF!";

struct Lexer<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    /// Byte offset of the current position.
    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.text.len(), |(b, _)| *b)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or("")
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.offset();
            let kind = self.next_kind(c);
            tokens.push(Token {
                kind,
                start,
                end: self.offset(),
            });
        }
        tokens
    }

    fn next_kind(&mut self, c: char) -> TokenKind {
        match c {
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            '"' => {
                self.string_literal();
                TokenKind::Text
            }
            '(' => {
                self.pos += 1;
                TokenKind::OpenParen
            }
            ')' => {
                self.pos += 1;
                TokenKind::CloseParen
            }
            ',' | ';' => {
                self.pos += 1;
                TokenKind::Separator
            }
            '<' | '>' => {
                self.pos += 1;
                if matches!(self.peek(), Some('=' | '>')) {
                    self.pos += 1;
                }
                TokenKind::Operator
            }
            '+' | '-' | '*' | '/' | '^' | '&' | '=' | '%' | ':' => {
                self.pos += 1;
                TokenKind::Operator
            }
            '#' => {
                self.pos += 1;
                self.eat_while(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '!' | '?'));
                TokenKind::Error
            }
            '\'' => self.quoted_sheet_reference(),
            c if c.is_ascii_digit() || c == '.' => self.number(),
            _ => self.word(),
        }
    }

    fn string_literal(&mut self) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '"' {
                if self.peek() == Some('"') {
                    self.pos += 1;
                } else {
                    return;
                }
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        self.eat_while(|c| c.is_ascii_digit() || c == '.');
        if matches!(self.peek(), Some('e' | 'E'))
            && self
                .peek_at(1)
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_digit());
        }
        TokenKind::Number
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '$' | '.')
    }

    /// `'My Sheet'!A1` (or a stray quote, tokenized as an error).
    fn quoted_sheet_reference(&mut self) -> TokenKind {
        self.pos += 1;
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return TokenKind::Error,
                Some('\'') if self.peek_at(1) == Some('\'') => {
                    name.push('\'');
                    self.pos += 2;
                }
                Some('\'') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    name.push(c);
                    self.pos += 1;
                }
            }
        }
        if self.peek() != Some('!') {
            return TokenKind::Error;
        }
        self.pos += 1;
        self.reference_after_sheet(Some(name))
    }

    fn word(&mut self) -> TokenKind {
        let start = self.offset();
        self.eat_while(Self::is_word_char);
        if self.offset() == start {
            // unknown punctuation
            self.pos += 1;
            return TokenKind::Operator;
        }
        let word = self.slice(start, self.offset());
        if self.peek() == Some('!') {
            self.pos += 1;
            return self.reference_after_sheet(Some(word.to_string()));
        }
        if self.peek() == Some('(') {
            return TokenKind::Ident;
        }
        match parse_ref_part(word) {
            Some(part) => self.maybe_range(None, part),
            None => TokenKind::Ident,
        }
    }

    fn reference_after_sheet(&mut self, sheet: Option<String>) -> TokenKind {
        let start = self.offset();
        self.eat_while(Self::is_word_char);
        match parse_ref_part(self.slice(start, self.offset())) {
            Some(part) => self.maybe_range(sheet, part),
            None => TokenKind::Error,
        }
    }

    /// Having read `start`, consume `:end` if it follows.
    fn maybe_range(&mut self, sheet: Option<String>, start: RefPart) -> TokenKind {
        if self.peek() == Some(':') {
            let save = self.pos;
            self.pos += 1;
            let from = self.offset();
            self.eat_while(Self::is_word_char);
            if let Some(end) = parse_ref_part(self.slice(from, self.offset())) {
                return TokenKind::Range { sheet, start, end };
            }
            self.pos = save;
        }
        TokenKind::Reference { sheet, cell: start }
    }
}

/// Tokenize formula text. A leading `=` comes out as an operator.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).tokens()
}

/// Parentheses outside string literals are balanced.
pub fn parens_balanced(tokens: &[Token]) -> bool {
    let mut depth: i64 = 0;
    for token in tokens {
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// The `Sheet!` / `'My Sheet'!` prefix of a reference token's text, if any.
pub fn sheet_prefix(token_text: &str) -> &str {
    match token_text.rfind('!') {
        Some(i) => token_text.get(..=i).unwrap_or(""),
        None => "",
    }
}

/// Render a reference token's kind back to text behind `prefix`.
pub fn render_reference(prefix: &str, kind: &TokenKind) -> Option<String> {
    match kind {
        TokenKind::Reference { cell, .. } => Some(format!("{prefix}{}", format_ref_part(cell))),
        TokenKind::Range { start, end, .. } => Some(format!(
            "{prefix}{}:{}",
            format_ref_part(start),
            format_ref_part(end)
        )),
        _ => None,
    }
}

fn shifted(value: u32, delta: i64, last: u32) -> Option<u32> {
    let moved = i64::from(value) + delta;
    if moved < 1 || moved > i64::from(last) {
        return None;
    }
    u32::try_from(moved).ok()
}

/// Shift the relative components of a reference part.
fn shift_part(part: RefPart, delta_row: i64, delta_column: i64) -> Option<RefPart> {
    let row = if part.absolute_row {
        part.row
    } else {
        shifted(part.row, delta_row, LAST_ROW)?
    };
    let column = if part.absolute_column {
        part.column
    } else {
        shifted(part.column, delta_column, LAST_COLUMN)?
    };
    Some(RefPart { row, column, ..part })
}

/// Move a reference part, absolute components included.
fn move_part(part: RefPart, delta_row: i64, delta_column: i64) -> Option<RefPart> {
    Some(RefPart {
        row: shifted(part.row, delta_row, LAST_ROW)?,
        column: shifted(part.column, delta_column, LAST_COLUMN)?,
        ..part
    })
}

/// Rewrite every reference token of `text` with `rewrite`; `None` from the
/// closure becomes `#REF!`. Non-formula text is returned unchanged.
fn rewrite_references(
    text: &str,
    mut rewrite: impl FnMut(&TokenKind) -> Option<Option<TokenKind>>,
) -> String {
    if !text.starts_with('=') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in tokenize(text) {
        if !token.is_reference() {
            continue;
        }
        // None: leave the token alone
        let Some(replacement) = rewrite(&token.kind) else {
            continue;
        };
        let original = text.get(token.start..token.end).unwrap_or("");
        out.push_str(text.get(last..token.start).unwrap_or(""));
        let prefix = sheet_prefix(original);
        match replacement.and_then(|kind| render_reference(prefix, &kind)) {
            Some(new_text) => out.push_str(&new_text),
            None => {
                out.push_str(prefix);
                out.push_str(REF_ERROR);
            }
        }
        last = token.end;
    }
    out.push_str(text.get(last..).unwrap_or(""));
    out
}

/// Shift the relative references of a formula by `(delta_row, delta_column)`,
/// as when copying or filling it from one cell to another.
pub fn shift_references(text: &str, delta_row: i64, delta_column: i64) -> String {
    rewrite_references(text, |kind| match kind {
        TokenKind::Reference { sheet, cell } => Some(
            shift_part(*cell, delta_row, delta_column).map(|cell| TokenKind::Reference {
                sheet: sheet.clone(),
                cell,
            }),
        ),
        TokenKind::Range { sheet, start, end } => Some(
            shift_part(*start, delta_row, delta_column)
                .zip(shift_part(*end, delta_row, delta_column))
                .map(|(start, end)| TokenKind::Range {
                    sheet: sheet.clone(),
                    start,
                    end,
                }),
        ),
        _ => None,
    })
}

/// Move references that point into `area` by `(delta_row, delta_column)`.
///
/// `applies` decides whether a reference's sheet qualifier names the sheet
/// the block was cut from. Ranges move only when both ends lie in the block.
pub fn move_references(
    text: &str,
    area: &Area,
    delta_row: i64,
    delta_column: i64,
    applies: impl Fn(Option<&str>) -> bool,
) -> String {
    let inside = |part: &RefPart| area.contains(Cell::new(part.row, part.column));
    rewrite_references(text, |kind| match kind {
        TokenKind::Reference { sheet, cell } if applies(sheet.as_deref()) && inside(cell) => Some(
            move_part(*cell, delta_row, delta_column).map(|cell| TokenKind::Reference {
                sheet: sheet.clone(),
                cell,
            }),
        ),
        TokenKind::Range { sheet, start, end }
            if applies(sheet.as_deref()) && inside(start) && inside(end) =>
        {
            Some(
                move_part(*start, delta_row, delta_column)
                    .zip(move_part(*end, delta_row, delta_column))
                    .map(|(start, end)| TokenKind::Range {
                        sheet: sheet.clone(),
                        start,
                        end,
                    }),
            )
        }
        _ => None,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_simple_formula() {
        let tokens = tokenize("=A1+$B$2");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].kind, TokenKind::Operator);
        assert!(tokens[1].is_reference());
        assert_eq!((tokens[1].start, tokens[1].end), (1, 3));
        assert_eq!((tokens[3].start, tokens[3].end), (4, 8));
    }

    #[test]
    fn test_tokenize_function_and_range() {
        let k = kinds("=SUM(A1:B3, 4)");
        assert_eq!(k[1], TokenKind::Ident);
        assert_eq!(k[2], TokenKind::OpenParen);
        assert!(matches!(k[3], TokenKind::Range { .. }));
        assert_eq!(k[4], TokenKind::Separator);
        assert_eq!(k[6], TokenKind::Number);
        assert_eq!(k[7], TokenKind::CloseParen);
    }

    #[test]
    fn test_function_name_that_looks_like_ref() {
        let k = kinds("=LOG10(100)");
        assert_eq!(k[1], TokenKind::Ident);
    }

    #[test]
    fn test_sheet_qualified_refs() {
        let tokens = tokenize("='My Sheet'!C3+Data!A1:A4");
        match &tokens[1].kind {
            TokenKind::Reference { sheet, cell } => {
                assert_eq!(sheet.as_deref(), Some("My Sheet"));
                assert_eq!((cell.row, cell.column), (3, 3));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(tokens[1].start, 1);
        assert_eq!(tokens[1].end, 14);
        assert!(matches!(
            &tokens[3].kind,
            TokenKind::Range { sheet: Some(s), .. } if s == "Data"
        ));
    }

    #[test]
    fn test_string_literal_hides_refs() {
        let k = kinds("=\"A1\"&B2");
        assert_eq!(k[1], TokenKind::Text);
        assert!(matches!(k[3], TokenKind::Reference { .. }));
    }

    #[test]
    fn test_parens_balanced() {
        assert!(parens_balanced(&tokenize("=SUM((A1))")));
        assert!(!parens_balanced(&tokenize("=SUM(A1")));
        assert!(!parens_balanced(&tokenize("=)A1(")));
        assert!(parens_balanced(&tokenize("=\"(\"")));
    }

    #[test_case("=A1+B2", 1, 1, "=B2+C3")]
    #[test_case("=$A$1+A$1", 2, 2, "=$A$1+C$1")]
    #[test_case("=SUM(A1:A3)", 3, 0, "=SUM(A4:A6)")]
    #[test_case("=A1", -1, 0, "=#REF!")]
    #[test_case("=Data!B2", 0, -1, "=Data!A2")]
    #[test_case("plain A1", 5, 5, "plain A1")]
    fn test_shift_references(text: &str, dr: i64, dc: i64, expected: &str) {
        assert_eq!(shift_references(text, dr, dc), expected);
    }

    #[test]
    fn test_move_references_only_inside_block() {
        let area = Area::new(1, 2, 1, 1);
        let moved = move_references("=A1+A5+$A$2", &area, 0, 2, |s| s.is_none());
        assert_eq!(moved, "=C1+A5+$C$2");
    }
}
