use serde::{Deserialize, Serialize};

/// Opaque style snapshot handed out by the calculation model.
///
/// The grid never looks inside: it only captures a snapshot before a mutation
/// and hands it back on undo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSnapshot(pub serde_json::Value);

impl StyleSnapshot {
    /// The model's default (unstyled) snapshot.
    pub fn is_default(&self) -> bool {
        self.0.is_null()
    }
}

impl From<serde_json::Value> for StyleSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Everything needed to restore one cell: its input text and its style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Formula or value, with a leading `'` when the cell carried a quote prefix.
    pub input: String,
    pub style: StyleSnapshot,
}

impl CellSnapshot {
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.style.is_default()
    }
}
