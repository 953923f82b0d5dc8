//! Widget configuration.
//!
//! Hosts usually pass this as JSON; every field has a default so a partial
//! object (or `{}`) is enough.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::HistoryConfig;
use crate::layout::{DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::types::HeaderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Height of rows without an explicit height, in pixels
    pub default_row_height: f64,
    /// Width of columns without an explicit width, in pixels
    pub default_column_width: f64,
    pub headers: HeaderConfig,
    pub history: HistoryConfig,
    /// Tags the widget's clipboard. Hosts that hand a clipboard from one
    /// widget to another give each widget its own value.
    pub session: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_column_width: DEFAULT_COL_WIDTH,
            headers: HeaderConfig::default(),
            history: HistoryConfig::default(),
            session: 0,
        }
    }
}

impl GridConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
