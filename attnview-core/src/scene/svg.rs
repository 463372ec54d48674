//! SVG serializer for a [`Scene`].
//!
//! Emits one SVG element per scene element, in drawing order, with the class
//! names the notebook stylesheet expects (`attn_background`, `detail`,
//! `attn-line-group`, `highlight`, `token`).

use std::fmt::Write as _;

use super::shapes::{LineSpec, RectSpec, Shape, Tag, TextSpec};
use super::{Element, Scene};

/// Render a scene to a standalone `<svg>` document fragment.
pub fn render_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" fill=\"{}\">",
        num(scene.width()),
        num(scene.height()),
        escape_html(scene.background())
    );
    for element in scene.elements() {
        out.push_str("  ");
        write_element(&mut out, element);
        out.push('\n');
    }
    out.push_str("</svg>");
    out
}

fn write_element(out: &mut String, element: &Element) {
    let class = class_attr(&element.tags);
    match &element.shape {
        Shape::Rect(rect) => write_rect(out, rect, &class, &element.tags),
        Shape::Line(line) => write_line(out, line, &class),
        Shape::Text(text) => write_text(out, text, &class),
    }
}

fn write_rect(out: &mut String, rect: &RectSpec, class: &str, tags: &[Tag]) {
    let _ = write!(
        out,
        "<rect{} x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        class,
        num(rect.x),
        num(rect.y),
        num(rect.width),
        num(rect.height)
    );
    if let Some(id) = thumbnail_background_id(tags) {
        let _ = write!(out, " id=\"{}\"", id);
    }
    if let Some(fill) = &rect.fill {
        let _ = write!(out, " fill=\"{}\"", escape_html(fill));
    }
    if let Some(stroke) = &rect.stroke {
        let _ = write!(
            out,
            " stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\"",
            escape_html(stroke),
            num(rect.stroke_width),
            num(rect.stroke_opacity)
        );
    }
    if tags.contains(&Tag::ClickRegion) {
        out.push_str(" cursor=\"pointer\"");
    }
    let _ = write!(out, " style=\"opacity: {}\"/>", num(rect.opacity));
}

fn write_line(out: &mut String, line: &LineSpec, class: &str) {
    let _ = write!(
        out,
        "<line{} source-index=\"{}\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" style=\"opacity: {}\"/>",
        class,
        line.source,
        num(line.x1),
        num(line.y1),
        num(line.x2),
        num(line.y2),
        escape_html(&line.stroke),
        num(line.stroke_width),
        num(line.stroke_opacity),
        num(line.opacity)
    );
}

fn write_text(out: &mut String, text: &TextSpec, class: &str) {
    let _ = write!(
        out,
        "<text{} x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}px\" fill=\"{}\" text-anchor=\"{}\" style=\"cursor: default; user-select: none\">{}</text>",
        class,
        num(text.x),
        num(text.y),
        num(text.dx),
        num(text.dy),
        num(text.font_size),
        escape_html(&text.fill),
        text.anchor.as_str(),
        escape_html(&text.content)
    );
}

fn class_attr(tags: &[Tag]) -> String {
    let mut classes: Vec<&str> = Vec::new();
    for class in tags.iter().filter_map(Tag::class_name) {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    if classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", classes.join(" "))
    }
}

fn thumbnail_background_id(tags: &[Tag]) -> Option<String> {
    if !tags.contains(&Tag::ThumbnailBackground) {
        return None;
    }
    tags.iter().find_map(|tag| match tag {
        Tag::Thumbnail { layer, head } => Some(format!("attn_background_{layer}_{head}")),
        _ => None,
    })
}

/// Shortest decimal form; whole numbers drop the fraction.
fn num(value: f64) -> String {
    format!("{}", value)
}

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
