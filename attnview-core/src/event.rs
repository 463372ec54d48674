//! Interaction events a viewer reacts to.
//!
//! These mirror what the host page delivers: the filter selector's change
//! event, clicks on thumbnails, and hover / leave on left-column tokens.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    /// The filter `<select>` changed to `value`.
    FilterChange { value: String },
    /// Click on the thumbnail at (layer, head).
    Click { layer: usize, head: usize },
    /// Click at a canvas position; resolved to a thumbnail by hit-testing.
    ClickAt { x: f64, y: f64 },
    /// Pointer entered left-token row `index` of the detail overlay.
    Hover { index: usize },
    /// Pointer left the hovered token row.
    Leave,
}

impl ViewerEvent {
    /// Parse a JSON array of events, as recorded from a session.
    pub fn parse_list(json: &str) -> Result<Vec<ViewerEvent>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerEvent::FilterChange { .. } => "filter_change",
            ViewerEvent::Click { .. } => "click",
            ViewerEvent::ClickAt { .. } => "click_at",
            ViewerEvent::Hover { .. } => "hover",
            ViewerEvent::Leave => "leave",
        }
    }
}
