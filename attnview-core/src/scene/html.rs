//! Notebook HTML wrapper around the rendered SVG.
//!
//! The container markup matches what the notebook host expects: the root div
//! carries the instance id, `#filter` is the selector whose change event picks
//! the active filter, and `#vis` holds the drawing.

use super::Scene;
use super::svg::{escape_html, render_svg};

/// Render the container div for one viewer instance.
pub fn render_notebook_html<'a>(
    root_div_id: &str,
    filter_keys: impl IntoIterator<Item = &'a str>,
    active_filter: &str,
    scene: &Scene,
) -> String {
    let mut html = format!(
        "<div id=\"{}\" style=\"font-family:'Helvetica Neue', Helvetica, Arial, sans-serif;\">\n",
        escape_html(root_div_id)
    );
    html.push_str("  <span style=\"user-select:none\">\n    Attention: <select id=\"filter\">\n");
    for key in filter_keys {
        let selected = if key == active_filter { " selected" } else { "" };
        html.push_str(&format!(
            "      <option value=\"{}\"{}>{}</option>\n",
            escape_html(key),
            selected,
            escape_html(key)
        ));
    }
    html.push_str("    </select>\n  </span>\n");
    html.push_str(&format!(
        "  <div id=\"vis\" height=\"{}\">\n",
        scene.height()
    ));
    html.push_str(&render_svg(scene));
    html.push_str("\n  </div>\n</div>");
    html
}
