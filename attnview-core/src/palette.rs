//! Display-mode palettes and per-layer stroke colors.

use serde::{Deserialize, Serialize};

/// The d3 `schemeCategory10` palette, cycled by layer index.
pub const LAYER_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Light or dark rendering, chosen once when the viewer is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn palette(self) -> Palette {
        match self {
            DisplayMode::Light => Palette {
                text: "black",
                background: "white",
                highlight: "#F5F5F5",
            },
            DisplayMode::Dark => Palette {
                text: "#bbb",
                background: "black",
                highlight: "#222",
            },
        }
    }

    pub fn text_color(self) -> &'static str {
        self.palette().text
    }

    pub fn background_color(self) -> &'static str {
        self.palette().background
    }

    pub fn highlight_color(self) -> &'static str {
        self.palette().highlight
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Light => write!(f, "light"),
            DisplayMode::Dark => write!(f, "dark"),
        }
    }
}

/// Text, background, and highlight colors for one display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: &'static str,
    pub background: &'static str,
    pub highlight: &'static str,
}

/// Stroke color for a layer, shared by its thumbnails and detail overlay.
pub fn layer_color(layer: usize) -> &'static str {
    LAYER_COLORS[layer % LAYER_COLORS.len()]
}
