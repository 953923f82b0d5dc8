//! Keyboard event translation for `GridWidget`.
//!
//! Keys are matched on the DOM `KeyboardEvent.key` value so the same table
//! serves the browser binding and native hosts.

use serde::{Deserialize, Serialize};

use crate::state::{EditMode, GridAction};
use crate::types::Direction;

/// A key press with its modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Cmd on macOS, treated like Ctrl
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// A single printable character typed without Ctrl/Cmd.
    fn typed_char(&self) -> Option<&str> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() && !self.command() => Some(self.key.as_str()),
            _ => None,
        }
    }
}

fn arrow(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    }
}

fn enter_direction(event: &KeyEvent) -> Direction {
    if event.shift {
        Direction::Up
    } else {
        Direction::Down
    }
}

fn tab_direction(event: &KeyEvent) -> Direction {
    if event.shift {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// Action for a key press, given the editor mode (`None` when not editing).
///
/// Returns `None` for keys the grid does not handle; while editing those
/// belong to the host's text input.
pub fn key_action(event: &KeyEvent, editing: Option<EditMode>) -> Option<GridAction> {
    match editing {
        Some(mode) => editing_key(event, mode),
        None => grid_key(event),
    }
}

fn editing_key(event: &KeyEvent, mode: EditMode) -> Option<GridAction> {
    let key = event.key.as_str();
    if let Some(direction) = arrow(key) {
        return (!event.shift && !event.command()).then_some(GridAction::Navigate {
            direction,
            to_edge: false,
        });
    }
    match key {
        "Enter" if !event.alt => Some(GridAction::CommitEditing {
            direction: Some(enter_direction(event)),
        }),
        "Tab" => Some(GridAction::CommitEditing {
            direction: Some(tab_direction(event)),
        }),
        "Escape" => Some(GridAction::CancelEditing),
        "F4" => Some(GridAction::CycleReference),
        "F2" if mode == EditMode::Init => Some(GridAction::StartEditing { text: None }),
        _ => None,
    }
}

fn grid_key(event: &KeyEvent) -> Option<GridAction> {
    let key = event.key.as_str();
    if let Some(direction) = arrow(key) {
        let to_edge = event.command();
        return Some(if event.shift {
            GridAction::Extend { direction, to_edge }
        } else {
            GridAction::Navigate { direction, to_edge }
        });
    }

    if event.command() {
        let action = match key.to_ascii_lowercase().as_str() {
            "c" => GridAction::Copy,
            "x" => GridAction::Cut,
            "v" => GridAction::Paste { text: None },
            "a" => GridAction::SelectAll,
            "z" if event.shift => GridAction::Redo,
            "z" => GridAction::Undo,
            "y" => GridAction::Redo,
            "home" => GridAction::SheetStart,
            "end" => GridAction::SheetEnd,
            _ => return None,
        };
        return Some(action);
    }

    let action = match key {
        "PageUp" if event.alt => GridAction::Page {
            direction: Direction::Left,
        },
        "PageDown" if event.alt => GridAction::Page {
            direction: Direction::Right,
        },
        "PageUp" => GridAction::Page {
            direction: Direction::Up,
        },
        "PageDown" => GridAction::Page {
            direction: Direction::Down,
        },
        "Home" => GridAction::Home,
        "Enter" => GridAction::Navigate {
            direction: enter_direction(event),
            to_edge: false,
        },
        "Tab" => GridAction::Navigate {
            direction: tab_direction(event),
            to_edge: false,
        },
        "F2" => GridAction::StartEditing { text: None },
        "Delete" => GridAction::DeleteContents,
        "Backspace" => GridAction::StartEditing {
            text: Some(String::new()),
        },
        "Escape" => GridAction::CancelEditing,
        _ => GridAction::StartEditing {
            text: Some(event.typed_char()?.to_string()),
        },
    };
    Some(action)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(KeyEvent::new("ArrowDown"), GridAction::Navigate { direction: Direction::Down, to_edge: false } ; "arrow")]
    #[test_case(KeyEvent::new("ArrowLeft").with_ctrl(), GridAction::Navigate { direction: Direction::Left, to_edge: true } ; "ctrl arrow")]
    #[test_case(KeyEvent::new("ArrowRight").with_shift(), GridAction::Extend { direction: Direction::Right, to_edge: false } ; "shift arrow")]
    #[test_case(KeyEvent::new("PageDown").with_alt(), GridAction::Page { direction: Direction::Right } ; "alt page down")]
    #[test_case(KeyEvent::new("Home").with_ctrl(), GridAction::SheetStart ; "ctrl home")]
    #[test_case(KeyEvent::new("Z").with_ctrl().with_shift(), GridAction::Redo ; "ctrl shift z")]
    #[test_case(KeyEvent::new("Tab").with_shift(), GridAction::Navigate { direction: Direction::Left, to_edge: false } ; "shift tab")]
    #[test_case(KeyEvent::new("7"), GridAction::StartEditing { text: Some("7".into()) } ; "typed digit")]
    fn test_grid_keys(event: KeyEvent, expected: GridAction) {
        assert_eq!(key_action(&event, None), Some(expected));
    }

    #[test_case(KeyEvent::new("Enter"), Some(GridAction::CommitEditing { direction: Some(Direction::Down) }) ; "enter commits down")]
    #[test_case(KeyEvent::new("Tab").with_shift(), Some(GridAction::CommitEditing { direction: Some(Direction::Left) }) ; "shift tab commits left")]
    #[test_case(KeyEvent::new("F4"), Some(GridAction::CycleReference) ; "f4")]
    #[test_case(KeyEvent::new("a"), None ; "text goes to the input")]
    #[test_case(KeyEvent::new("ArrowLeft").with_shift(), None ; "shift arrow selects text")]
    fn test_editing_keys(event: KeyEvent, expected: Option<GridAction>) {
        assert_eq!(key_action(&event, Some(EditMode::Edit)), expected);
    }

    #[test]
    fn test_control_keys_do_not_start_editing() {
        assert_eq!(key_action(&KeyEvent::new("Shift"), None), None);
        assert_eq!(key_action(&KeyEvent::new("q").with_ctrl(), None), None);
    }
}
