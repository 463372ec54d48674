//! # attnview Core
//!
//! Core library for the attnview attention visualizer.
//! Turns a `[layer][head][source][target]` attention tensor into a grid of
//! per-head thumbnails with a click-to-open detail overlay and hover
//! highlighting, drawn through a pluggable [`Renderer`].

pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod palette;
pub mod params;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod viewer;

// Re-export commonly used types at the crate root.
pub use config::{LayoutSettings, OutputFormat, ViewerSettings, load_config};
pub use error::{Result, ViewerError};
pub use event::ViewerEvent;
pub use layout::{DetailPlacement, LayoutConfig};
pub use palette::{DisplayMode, LAYER_COLORS, Palette, layer_color};
pub use params::{AttentionData, AttentionTensor, ViewerParams};
pub use registry::ViewerRegistry;
pub use scene::{Renderer, Scene, Tag};
pub use selection::{Selection, Transition};
pub use viewer::Viewer;
