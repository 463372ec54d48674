//! Layout metrics derived from the active filter.
//!
//! Recomputed on every render pass. All positions are canvas pixels with the
//! origin at the top-left corner.

use serde::Serialize;

use crate::config::LayoutSettings;
use crate::params::AttentionData;

const MIN_X: f64 = 0.0;
const MIN_Y: f64 = 0.0;

/// Sizes of the thumbnail grid and the detail overlay for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub num_layers: usize,
    pub num_heads: usize,
    pub total_heads: usize,
    pub left_tokens: usize,
    pub right_tokens: usize,
    pub thumbnail_box_height: f64,
    pub thumbnail_height: f64,
    pub thumbnail_width: f64,
    pub detail_height: f64,
    pub canvas_width: f64,
    /// At least `max(num_layers * thumbnail_height, detail_height)`.
    pub canvas_height: f64,
    #[serde(skip)]
    settings: LayoutSettings,
}

/// Where the detail overlay for one (layer, head) goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetailPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub left_text_x: f64,
    pub attention_x: f64,
    pub right_text_x: f64,
    /// Top of the first token row.
    pub body_y: f64,
    /// Top of the heading text box.
    pub heading_y: f64,
    /// True when the panel was moved to the left of its thumbnail.
    pub flipped: bool,
}

impl LayoutConfig {
    pub fn compute(settings: &LayoutSettings, data: &AttentionData, total_heads: usize) -> Self {
        Self::from_dimensions(
            settings,
            data.left_text.len(),
            data.right_text.len(),
            data.attn.num_layers(),
            data.attn.num_heads(),
            total_heads,
        )
    }

    pub fn from_dimensions(
        settings: &LayoutSettings,
        left_tokens: usize,
        right_tokens: usize,
        num_layers: usize,
        num_heads: usize,
        total_heads: usize,
    ) -> Self {
        let heads = total_heads.max(1) as f64;
        let max_tokens = left_tokens.max(right_tokens) as f64;

        let thumbnail_box_height = settings.thumbnail_box_base * (settings.reference_heads / heads);
        let thumbnail_height =
            max_tokens * thumbnail_box_height + 2.0 * settings.thumbnail_padding;
        let thumbnail_width = settings.div_width / heads;
        let detail_height = max_tokens * settings.detail_box_height
            + 2.0 * settings.detail_padding
            + settings.detail_heading_height;
        let canvas_height = (num_layers as f64 * thumbnail_height).max(detail_height);

        Self {
            num_layers,
            num_heads,
            total_heads,
            left_tokens,
            right_tokens,
            thumbnail_box_height,
            thumbnail_height,
            thumbnail_width,
            detail_height,
            canvas_width: settings.div_width,
            canvas_height,
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn max_tokens(&self) -> usize {
        self.left_tokens.max(self.right_tokens)
    }

    pub fn thumbnail_count(&self) -> usize {
        self.num_layers * self.num_heads
    }

    pub fn contains(&self, layer: usize, head: usize) -> bool {
        layer < self.num_layers && head < self.num_heads
    }

    /// Top-left corner of the thumbnail for (layer, head).
    pub fn thumbnail_origin(&self, layer: usize, head: usize) -> (f64, f64) {
        (
            head as f64 * self.thumbnail_width,
            layer as f64 * self.thumbnail_height,
        )
    }

    /// Vertical center of a token row inside a thumbnail whose top is `y`.
    pub fn thumbnail_row_y(&self, y: f64, index: usize) -> f64 {
        y + self.settings.thumbnail_padding + (index as f64 + 0.5) * self.thumbnail_box_height
    }

    /// Vertical center of a token row inside the detail body starting at `body_y`.
    pub fn detail_row_y(&self, body_y: f64, index: usize) -> f64 {
        body_y + (index as f64 + 0.5) * self.settings.detail_box_height
    }

    /// Hit-test a canvas position against the thumbnail grid.
    pub fn thumbnail_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !(x >= MIN_X && y >= MIN_Y) || self.thumbnail_width <= 0.0 || self.thumbnail_height <= 0.0
        {
            return None;
        }
        let head = (x / self.thumbnail_width).floor() as usize;
        let layer = (y / self.thumbnail_height).floor() as usize;
        self.contains(layer, head).then_some((layer, head))
    }

    /// Place the detail panel to the right of its thumbnail, flipping left when
    /// it would cross the right edge and clamping to the canvas vertically.
    pub fn detail_placement(&self, layer: usize, head: usize) -> DetailPlacement {
        let s = &self.settings;
        let left_pos = (head as f64 / self.total_heads.max(1) as f64) * s.div_width;

        let mut flipped = false;
        let mut x = left_pos + s.thumbnail_padding + s.detail_x_offset_ratio * self.thumbnail_width;
        if x < MIN_X {
            x = MIN_X;
        } else if x + s.detail_width > s.div_width {
            x = (left_pos + s.thumbnail_padding - s.detail_width + s.detail_flip_nudge).max(MIN_X);
            flipped = true;
        }

        let mut y =
            layer as f64 * self.thumbnail_height + s.thumbnail_padding + s.detail_y_offset;
        if y < MIN_Y {
            y = MIN_Y;
        } else if y + self.detail_height > self.canvas_height {
            y = (self.canvas_height - self.detail_height).max(MIN_Y);
        }

        let left_text_x = x;
        let attention_x = left_text_x + s.detail_box_width;
        let right_text_x = attention_x + s.detail_attention_width;
        DetailPlacement {
            x,
            y,
            width: s.detail_width,
            height: self.detail_height,
            left_text_x,
            attention_x,
            right_text_x,
            body_y: y + s.detail_padding,
            heading_y: y
                + self.max_tokens() as f64 * s.detail_box_height
                + s.detail_heading_offset,
            flipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(tokens: usize, layers: usize, heads: usize, total: usize) -> LayoutConfig {
        LayoutConfig::from_dimensions(&LayoutSettings::default(), tokens, tokens, layers, heads, total)
    }

    #[test]
    fn test_twelve_head_metrics() {
        let l = layout(10, 12, 12, 12);
        assert_eq!(l.thumbnail_box_height, 7.0);
        assert_eq!(l.thumbnail_height, 80.0);
        assert!((l.thumbnail_width - 970.0 / 12.0).abs() < 1e-9);
        assert_eq!(l.detail_height, 10.0 * 18.0 + 56.0 + 25.0);
        assert_eq!(l.canvas_height, 960.0);
        assert_eq!(l.thumbnail_count(), 144);
    }

    #[test]
    fn test_box_height_scales_with_total_heads() {
        let l = layout(4, 1, 6, 6);
        assert_eq!(l.thumbnail_box_height, 14.0);
        let l = layout(4, 1, 16, 16);
        assert!((l.thumbnail_box_height - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_height_fits_detail_for_single_layer() {
        let l = layout(3, 1, 12, 12);
        assert_eq!(l.detail_height, 3.0 * 18.0 + 81.0);
        assert_eq!(l.canvas_height, l.detail_height);
    }

    #[test]
    fn test_uneven_token_columns_use_longest() {
        let l = LayoutConfig::from_dimensions(&LayoutSettings::default(), 2, 9, 1, 1, 12);
        assert_eq!(l.max_tokens(), 9);
        assert_eq!(l.thumbnail_height, 9.0 * 7.0 + 10.0);
    }

    #[test]
    fn test_thumbnail_origin_grid() {
        let l = layout(5, 3, 4, 4);
        assert_eq!(l.thumbnail_origin(0, 0), (0.0, 0.0));
        assert_eq!(l.thumbnail_origin(2, 3), (3.0 * 242.5, 2.0 * l.thumbnail_height));
    }

    #[test]
    fn test_thumbnail_at() {
        let l = layout(5, 2, 12, 12);
        assert_eq!(l.thumbnail_at(1.0, 1.0), Some((0, 0)));
        let (x, y) = l.thumbnail_origin(1, 7);
        assert_eq!(l.thumbnail_at(x + 2.0, y + 2.0), Some((1, 7)));
        assert_eq!(l.thumbnail_at(-1.0, 5.0), None);
        assert_eq!(l.thumbnail_at(5.0, l.canvas_height + 100.0), None);
    }

    #[test]
    fn test_thumbnail_at_ignores_columns_without_heads() {
        // Two heads shown out of twelve: the rest of the row is empty canvas.
        let l = layout(5, 1, 2, 12);
        assert_eq!(l.thumbnail_at(l.thumbnail_width * 1.5, 3.0), Some((0, 1)));
        assert_eq!(l.thumbnail_at(l.thumbnail_width * 5.5, 3.0), None);
    }

    #[test]
    fn test_detail_placed_right_of_thumbnail() {
        let l = layout(5, 12, 12, 12);
        let p = l.detail_placement(0, 0);
        assert!(!p.flipped);
        assert!((p.x - (5.0 + 0.8 * l.thumbnail_width)).abs() < 1e-9);
        assert_eq!(p.y, 25.0);
        assert_eq!(p.attention_x, p.x + 80.0);
        assert_eq!(p.right_text_x, p.x + 220.0);
        assert_eq!(p.body_y, p.y + 28.0);
        assert_eq!(p.heading_y, p.y + 5.0 * 18.0 + 40.0);
    }

    #[test]
    fn test_detail_flips_at_right_edge() {
        let l = layout(5, 4, 12, 12);
        let p = l.detail_placement(0, 11);
        assert!(p.flipped);
        let left_pos = 11.0 / 12.0 * 970.0;
        assert!((p.x - (left_pos + 5.0 - 300.0 + 8.0)).abs() < 1e-9);
        assert!(p.x + p.width <= l.canvas_width);
    }

    #[test]
    fn test_detail_clamped_to_bottom() {
        let l = layout(5, 4, 12, 12);
        let p = l.detail_placement(3, 0);
        assert_eq!(p.y, l.canvas_height - l.detail_height);
        assert!(p.y + p.height <= l.canvas_height);
    }

    #[test]
    fn test_detail_always_inside_canvas() {
        for total in [1usize, 2, 6, 12, 16, 25] {
            let l = layout(7, 6, total, total);
            for layer in 0..l.num_layers {
                for head in 0..l.num_heads {
                    let p = l.detail_placement(layer, head);
                    assert!(p.x >= 0.0, "x underflow at total={total} head={head}");
                    assert!(p.x + p.width <= l.canvas_width + 1e-9);
                    assert!(p.y >= 0.0);
                    assert!(p.y + p.height <= l.canvas_height + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_row_centers() {
        let l = layout(4, 1, 12, 12);
        assert_eq!(l.thumbnail_row_y(0.0, 0), 5.0 + 3.5);
        assert_eq!(l.thumbnail_row_y(10.0, 2), 10.0 + 5.0 + 2.5 * 7.0);
        assert_eq!(l.detail_row_y(100.0, 1), 100.0 + 27.0);
    }

    #[test]
    fn test_layout_serializes_metrics() {
        let l = layout(4, 2, 12, 12);
        let json = serde_json::to_value(&l).unwrap();
        assert_eq!(json["num_layers"], 2);
        assert_eq!(json["canvas_width"], 970.0);
        assert!(json.get("settings").is_none());
    }
}
