//! Shape specifications and element tags.

use serde::{Deserialize, Serialize};

/// Labels attached to drawn elements. Styling and removal select elements
/// carrying every tag in a selector, like a CSS class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tag {
    /// Every element belonging to the thumbnail for (layer, head).
    Thumbnail { layer: usize, head: usize },
    /// The bordered rectangle behind a thumbnail's lines.
    ThumbnailBackground,
    /// The transparent rectangle that receives clicks.
    ClickRegion,
    /// Every element of the detail overlay.
    Detail,
    /// Detail lines leaving one source token.
    AttnLineGroup { source: usize },
    /// Row background behind a left-column token in the detail overlay.
    TokenHighlight { row: usize },
    LeftToken,
    RightToken,
    DetailHeading,
    DetailFrame,
}

impl Tag {
    /// CSS class used when serializing, where one exists.
    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            Tag::ThumbnailBackground => Some("attn_background"),
            Tag::Detail => Some("detail"),
            Tag::AttnLineGroup { .. } => Some("attn-line-group"),
            Tag::TokenHighlight { .. } => Some("highlight"),
            Tag::LeftToken | Tag::RightToken => Some("token"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `None` inherits the canvas background fill.
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub opacity: f64,
}

impl RectSpec {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            stroke_opacity: 1.0,
            opacity: 1.0,
        }
    }

    pub fn fill(mut self, color: &str) -> Self {
        self.fill = Some(color.to_string());
        self
    }

    pub fn stroke(mut self, color: &str, width: f64, opacity: f64) -> Self {
        self.stroke = Some(color.to_string());
        self.stroke_width = width;
        self.stroke_opacity = opacity;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// An attention line between a source row and a target row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub source: usize,
    pub target: usize,
    pub stroke: String,
    pub stroke_width: f64,
    /// The attention weight.
    pub stroke_opacity: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub fill: String,
    pub anchor: TextAnchor,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Rect(RectSpec),
    Line(LineSpec),
    Text(TextSpec),
}

impl Shape {
    pub fn opacity(&self) -> f64 {
        match self {
            Shape::Rect(r) => r.opacity,
            Shape::Line(l) => l.opacity,
            Shape::Text(_) => 1.0,
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        match self {
            Shape::Rect(r) => r.opacity = opacity,
            Shape::Line(l) => l.opacity = opacity,
            Shape::Text(_) => {}
        }
    }

    pub fn set_fill(&mut self, color: &str) {
        match self {
            Shape::Rect(r) => r.fill = Some(color.to_string()),
            Shape::Text(t) => t.fill = color.to_string(),
            Shape::Line(_) => {}
        }
    }

    pub fn set_stroke_opacity(&mut self, opacity: f64) {
        match self {
            Shape::Rect(r) => r.stroke_opacity = opacity,
            Shape::Line(l) => l.stroke_opacity = opacity,
            Shape::Text(_) => {}
        }
    }

    pub fn as_rect(&self) -> Option<&RectSpec> {
        match self {
            Shape::Rect(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineSpec> {
        match self {
            Shape::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextSpec> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_builder() {
        let rect = RectSpec::new(1.0, 2.0, 30.0, 40.0)
            .fill("white")
            .stroke("#1f77b4", 2.0, 0.0);
        assert_eq!(rect.fill.as_deref(), Some("white"));
        assert_eq!(rect.stroke.as_deref(), Some("#1f77b4"));
        assert_eq!(rect.stroke_width, 2.0);
        assert_eq!(rect.stroke_opacity, 0.0);
        assert_eq!(rect.opacity, 1.0);
    }

    #[test]
    fn test_shape_setters() {
        let mut shape = Shape::Rect(RectSpec::new(0.0, 0.0, 1.0, 1.0));
        shape.set_fill("#222");
        shape.set_opacity(0.0);
        shape.set_stroke_opacity(0.8);
        let rect = shape.as_rect().unwrap();
        assert_eq!(rect.fill.as_deref(), Some("#222"));
        assert_eq!(rect.opacity, 0.0);
        assert_eq!(rect.stroke_opacity, 0.8);
    }

    #[test]
    fn test_text_ignores_opacity() {
        let mut shape = Shape::Text(TextSpec {
            x: 0.0,
            y: 0.0,
            content: "cat".into(),
            font_size: 13.0,
            fill: "black".into(),
            anchor: TextAnchor::End,
            dx: 78.0,
            dy: 13.0,
        });
        shape.set_opacity(0.0);
        assert_eq!(shape.opacity(), 1.0);
        assert!(shape.as_line().is_none());
    }

    #[test]
    fn test_tag_class_names() {
        assert_eq!(Tag::ThumbnailBackground.class_name(), Some("attn_background"));
        assert_eq!(
            Tag::AttnLineGroup { source: 3 }.class_name(),
            Some("attn-line-group")
        );
        assert_eq!(Tag::Thumbnail { layer: 0, head: 0 }.class_name(), None);
    }

    #[test]
    fn test_tag_serialization() {
        let json = serde_json::to_string(&Tag::Thumbnail { layer: 1, head: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"thumbnail","layer":1,"head":2}"#);
    }
}
