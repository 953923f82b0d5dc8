//! Structured error types for xlgrid.
//!
//! User-facing failures (bad references, stale sheets, rejected input) come
//! from the calculation model and are shown to the user by the widget.
//! `Invariant` marks programming errors and aborts the operation.

/// All errors that can occur while driving the grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Malformed cell, range or sheet reference.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Operation on a sheet that no longer exists.
    #[error("Sheet {0} does not exist")]
    StaleSheet(u32),

    /// A sheet with this name already exists.
    #[error("Duplicate sheet name: {0}")]
    DuplicateSheetName(String),

    /// Input rejected by the calculation model.
    #[error("Model error: {0}")]
    Model(String),

    /// Internal invariant violated (programming error, not user error).
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    /// True for errors caused by user input rather than by the widget itself.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Invariant(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
