//! Configuration system for attnview.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/attnview/config.toml` and/or `.attnview/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level configuration for attnview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub layout: LayoutSettings,
    pub output: OutputSettings,
}

impl ViewerSettings {
    /// Check that every size is usable for drawing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()
    }
}

/// Layout constants for thumbnails and the detail overlay, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Canvas width; thumbnails split it evenly across `total_heads`.
    pub div_width: f64,
    pub thumbnail_padding: f64,
    /// Thumbnail row height is `thumbnail_box_base * (reference_heads / total_heads)`.
    pub thumbnail_box_base: f64,
    pub reference_heads: f64,
    /// Horizontal gap trimmed from the right end of thumbnail lines.
    pub thumbnail_line_inset: f64,
    pub line_stroke_width: f64,
    pub detail_width: f64,
    pub detail_attention_width: f64,
    pub detail_box_width: f64,
    pub detail_box_height: f64,
    pub detail_padding: f64,
    pub attn_padding: f64,
    pub detail_heading_height: f64,
    pub detail_heading_text_size: f64,
    /// Heading offset below the last token row.
    pub detail_heading_offset: f64,
    pub text_size: f64,
    /// Fraction of a thumbnail width the detail panel is shifted right by.
    pub detail_x_offset_ratio: f64,
    pub detail_y_offset: f64,
    /// Extra shift applied when the panel flips to the left of its thumbnail.
    pub detail_flip_nudge: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            div_width: 970.0,
            thumbnail_padding: 5.0,
            thumbnail_box_base: 7.0,
            reference_heads: 12.0,
            thumbnail_line_inset: 14.0,
            line_stroke_width: 2.2,
            detail_width: 300.0,
            detail_attention_width: 140.0,
            detail_box_width: 80.0,
            detail_box_height: 18.0,
            detail_padding: 28.0,
            attn_padding: 0.0,
            detail_heading_height: 25.0,
            detail_heading_text_size: 15.0,
            detail_heading_offset: 40.0,
            text_size: 13.0,
            detail_x_offset_ratio: 0.8,
            detail_y_offset: 20.0,
            detail_flip_nudge: 8.0,
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("div_width", self.div_width),
            ("thumbnail_box_base", self.thumbnail_box_base),
            ("reference_heads", self.reference_heads),
            ("detail_width", self.detail_width),
            ("detail_attention_width", self.detail_attention_width),
            ("detail_box_width", self.detail_box_width),
            ("detail_box_height", self.detail_box_height),
            ("text_size", self.text_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!("layout.{name} must be positive, got {value}"),
                });
            }
        }
        if self.detail_width > self.div_width {
            return Err(ConfigError::Invalid {
                message: format!(
                    "layout.detail_width ({}) exceeds layout.div_width ({})",
                    self.detail_width, self.div_width
                ),
            });
        }
        Ok(())
    }
}

/// Output format written by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Html,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Svg => write!(f, "svg"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `ATTNVIEW_`)
/// 3. Explicit config file
/// 4. Workspace-local config (`.attnview/config.toml`)
/// 5. User config (`~/.config/attnview/config.toml`)
/// 6. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: Option<&ViewerSettings>,
) -> Result<ViewerSettings, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ViewerSettings::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    // ATTNVIEW_LAYOUT__DIV_WIDTH, ATTNVIEW_OUTPUT__FORMAT, etc.
    figment = figment.merge(Env::prefixed("ATTNVIEW_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// `~/.config/attnview/config.toml` or the platform equivalent.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "attnview", "attnview")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".attnview").join("config.toml")
}

/// Write the given settings to `<workspace>/.attnview/config.toml`.
///
/// Returns the path written, or `None` if a file already exists there.
pub fn init_workspace_config(
    workspace: &Path,
    settings: &ViewerSettings,
) -> Result<Option<PathBuf>, ConfigError> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Ok(None);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let toml_str = toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize {
        message: e.to_string(),
    })?;
    std::fs::write(&path, toml_str).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(Some(path))
}
