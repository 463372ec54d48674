//! The attention viewer: thumbnail grid, detail overlay, and interaction handling.
//!
//! A [`Viewer`] owns everything for one container: the parameters supplied by
//! the attention producer, the active filter, the derived layout, the
//! selection state, and the renderer it draws through. Nothing is shared
//! between instances.

use tracing::{debug, info, warn};

use crate::config::{LayoutSettings, ViewerSettings};
use crate::error::{ParamsError, Result, SelectionError};
use crate::event::ViewerEvent;
use crate::layout::LayoutConfig;
use crate::palette::{DisplayMode, layer_color};
use crate::params::{AttentionData, ViewerParams};
use crate::scene::{
    LineSpec, RectSpec, Renderer, Scene, Tag, TextAnchor, TextSpec, render_notebook_html,
    render_svg,
};
use crate::selection::{Selection, Transition};

const THUMBNAIL_STROKE_WIDTH: f64 = 2.0;
const SELECTED_STROKE_OPACITY: f64 = 0.8;
const DETAIL_FRAME_STROKE_WIDTH: f64 = 1.5;
const DETAIL_FRAME_STROKE_OPACITY: f64 = 0.7;
/// Gap between right-aligned left tokens and the attention lines.
const TOKEN_TEXT_GAP: f64 = 2.0;

#[derive(Debug)]
pub struct Viewer<R> {
    params: ViewerParams,
    settings: LayoutSettings,
    filter: String,
    layout: LayoutConfig,
    selection: Selection,
    hovered: Option<usize>,
    /// Set by the first [`Viewer::render`]; interaction needs drawn thumbnails.
    rendered: bool,
    renderer: R,
}

impl<R: Renderer> Viewer<R> {
    /// Validate the parameters and settings and set up an instance on the
    /// default filter. Nothing is drawn until [`Viewer::render`].
    pub fn initialize(params: ViewerParams, settings: &ViewerSettings, renderer: R) -> Result<Self> {
        settings.validate()?;
        params.validate()?;

        let filter = params.default_filter.clone();
        let layout = LayoutConfig::compute(
            &settings.layout,
            params.filter(&filter)?,
            params.total_heads,
        );
        info!(
            root_div_id = %params.root_div_id,
            filter = %filter,
            mode = %params.display_mode,
            "Viewer initialized"
        );
        Ok(Self {
            params,
            settings: settings.layout.clone(),
            filter,
            layout,
            selection: Selection::NoDetail,
            hovered: None,
            rendered: false,
            renderer,
        })
    }

    /// Initialize and draw the thumbnail grid.
    pub fn open(params: ViewerParams, settings: &ViewerSettings, renderer: R) -> Result<Self> {
        let mut viewer = Self::initialize(params, settings, renderer)?;
        viewer.render()?;
        Ok(viewer)
    }

    pub fn root_div_id(&self) -> &str {
        &self.params.root_div_id
    }

    pub fn params(&self) -> &ViewerParams {
        &self.params
    }

    pub fn active_filter(&self) -> &str {
        &self.filter
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.params.display_mode
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Recompute the layout for the active filter, reset the surface, and draw
    /// one thumbnail per (layer, head). Any open detail overlay is discarded.
    pub fn render(&mut self) -> Result<()> {
        let data = self.params.filter(&self.filter)?;
        let layout = LayoutConfig::compute(&self.settings, data, self.params.total_heads);
        let mode = self.params.display_mode;

        self.renderer
            .reset(layout.canvas_width, layout.canvas_height, mode.background_color());
        for layer in 0..layout.num_layers {
            for head in 0..layout.num_heads {
                if let Some(weights) = data.attn.head(layer, head) {
                    draw_thumbnail(&mut self.renderer, &layout, mode, weights, layer, head);
                }
            }
        }

        debug!(
            root_div_id = %self.params.root_div_id,
            filter = %self.filter,
            layers = layout.num_layers,
            heads = layout.num_heads,
            canvas_height = layout.canvas_height,
            "Rendered thumbnails"
        );
        self.layout = layout;
        self.selection = Selection::NoDetail;
        self.hovered = None;
        self.rendered = true;
        Ok(())
    }

    fn ensure_rendered(&self) -> Result<()> {
        if self.rendered {
            Ok(())
        } else {
            Err(SelectionError::NotRendered {
                root_div_id: self.params.root_div_id.clone(),
            }
            .into())
        }
    }

    /// Switch to another filter key and redraw from scratch.
    pub fn set_filter(&mut self, key: &str) -> Result<()> {
        if !self.params.attention.contains_key(key) {
            return Err(ParamsError::UnknownFilter {
                key: key.to_string(),
            }
            .into());
        }
        info!(
            root_div_id = %self.params.root_div_id,
            from = %self.filter,
            to = %key,
            "Filter changed"
        );
        self.filter = key.to_string();
        self.render()
    }

    /// Toggle the detail overlay for thumbnail (layer, head).
    pub fn click_thumbnail(&mut self, layer: usize, head: usize) -> Result<Transition> {
        self.ensure_rendered()?;
        if !self.layout.contains(layer, head) {
            return Err(SelectionError::OutOfRange {
                layer,
                head,
                num_layers: self.layout.num_layers,
                num_heads: self.layout.num_heads,
            }
            .into());
        }
        let mode = self.params.display_mode;
        let data = self.params.filter(&self.filter)?;

        self.renderer
            .set_fill(&[Tag::ThumbnailBackground], mode.background_color());
        self.renderer
            .set_stroke_opacity(&[Tag::ThumbnailBackground], 0.0);
        let removed = self.renderer.remove_by_tag(&[Tag::Detail]);
        self.hovered = None;

        let (next, transition) = self.selection.toggle(layer, head);
        if let Some((shown_layer, shown_head)) = transition.shown() {
            if let Some(weights) = data.attn.head(shown_layer, shown_head) {
                let heading = format!(
                    "Layer {}, Head {}",
                    self.params.layer_label(shown_layer),
                    self.params.head_label(shown_head)
                );
                draw_detail(
                    &mut self.renderer,
                    &self.layout,
                    mode,
                    data,
                    weights,
                    shown_layer,
                    shown_head,
                    &heading,
                );
            }
            let selected = [
                Tag::ThumbnailBackground,
                Tag::Thumbnail {
                    layer: shown_layer,
                    head: shown_head,
                },
            ];
            self.renderer.set_fill(&selected, mode.highlight_color());
            self.renderer
                .set_stroke_opacity(&selected, SELECTED_STROKE_OPACITY);
        }

        debug!(
            root_div_id = %self.params.root_div_id,
            layer,
            head,
            removed,
            selection = %next,
            "Thumbnail clicked"
        );
        self.selection = next;
        Ok(transition)
    }

    /// Click at a canvas position.
    pub fn click_at(&mut self, x: f64, y: f64) -> Result<Transition> {
        let (layer, head) = self
            .layout
            .thumbnail_at(x, y)
            .ok_or(SelectionError::NoThumbnailAt { x, y })?;
        self.click_thumbnail(layer, head)
    }

    /// Highlight left-token row `index` and show only the lines leaving it.
    /// Does nothing while no detail overlay is open.
    pub fn hover_token(&mut self, index: usize) -> Result<()> {
        self.ensure_rendered()?;
        if self.selection == Selection::NoDetail {
            debug!(index, "Hover ignored, no detail overlay open");
            return Ok(());
        }
        let len = self.layout.left_tokens;
        if index >= len {
            return Err(SelectionError::TokenOutOfRange { index, len }.into());
        }
        for row in 0..len {
            let opacity = if row == index { 1.0 } else { 0.0 };
            self.renderer
                .set_opacity(&[Tag::Detail, Tag::TokenHighlight { row }], opacity);
            self.renderer
                .set_opacity(&[Tag::Detail, Tag::AttnLineGroup { source: row }], opacity);
        }
        self.hovered = Some(index);
        Ok(())
    }

    /// Clear the row highlight and show every line group again.
    pub fn leave_token(&mut self) {
        for row in 0..self.layout.left_tokens {
            self.renderer
                .set_opacity(&[Tag::Detail, Tag::TokenHighlight { row }], 0.0);
            self.renderer
                .set_opacity(&[Tag::Detail, Tag::AttnLineGroup { source: row }], 1.0);
        }
        self.hovered = None;
    }

    /// Apply one interaction event.
    pub fn dispatch(&mut self, event: &ViewerEvent) -> Result<()> {
        let result = match event {
            ViewerEvent::FilterChange { value } => self.set_filter(value),
            ViewerEvent::Click { layer, head } => self.click_thumbnail(*layer, *head).map(|_| ()),
            ViewerEvent::ClickAt { x, y } => self.click_at(*x, *y).map(|_| ()),
            ViewerEvent::Hover { index } => self.hover_token(*index),
            ViewerEvent::Leave => {
                self.leave_token();
                Ok(())
            }
        };
        if let Err(e) = &result {
            warn!(
                root_div_id = %self.params.root_div_id,
                event = event.kind(),
                error = %e,
                "Event rejected"
            );
        }
        result
    }
}

impl Viewer<Scene> {
    pub fn to_svg(&self) -> String {
        render_svg(&self.renderer)
    }

    /// The container markup with the filter selector and the drawing.
    pub fn to_html(&self) -> String {
        render_notebook_html(
            &self.params.root_div_id,
            self.params.filter_keys(),
            &self.filter,
            &self.renderer,
        )
    }
}

fn draw_thumbnail<R: Renderer>(
    renderer: &mut R,
    layout: &LayoutConfig,
    mode: DisplayMode,
    weights: &[Vec<f64>],
    layer: usize,
    head: usize,
) {
    let s = layout.settings();
    let color = layer_color(layer);
    let (x, y) = layout.thumbnail_origin(layer, head);
    let thumbnail = Tag::Thumbnail { layer, head };

    renderer.draw_rect(
        RectSpec::new(x, y, layout.thumbnail_width, layout.thumbnail_height)
            .fill(mode.background_color())
            .stroke(color, THUMBNAIL_STROKE_WIDTH, 0.0),
        &[thumbnail, Tag::ThumbnailBackground],
    );

    let x1 = x + s.thumbnail_padding;
    let x2 = x1 + layout.thumbnail_width - s.thumbnail_line_inset;
    for (source, row) in weights.iter().enumerate() {
        for (target, &weight) in row.iter().enumerate() {
            renderer.draw_line(
                LineSpec {
                    x1,
                    y1: layout.thumbnail_row_y(y, source),
                    x2,
                    y2: layout.thumbnail_row_y(y, target),
                    source,
                    target,
                    stroke: color.to_string(),
                    stroke_width: s.line_stroke_width,
                    stroke_opacity: weight,
                    opacity: 1.0,
                },
                &[thumbnail],
            );
        }
    }

    renderer.draw_rect(
        RectSpec::new(x, y, layout.thumbnail_width, layout.thumbnail_height).opacity(0.0),
        &[thumbnail, Tag::ClickRegion],
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_detail<R: Renderer>(
    renderer: &mut R,
    layout: &LayoutConfig,
    mode: DisplayMode,
    data: &AttentionData,
    weights: &[Vec<f64>],
    layer: usize,
    head: usize,
    heading: &str,
) {
    let s = layout.settings();
    let color = layer_color(layer);
    let text_color = mode.text_color();
    let p = layout.detail_placement(layer, head);

    renderer.draw_rect(
        RectSpec::new(p.x, p.y, p.width, p.height).stroke(
            color,
            DETAIL_FRAME_STROKE_WIDTH,
            DETAIL_FRAME_STROKE_OPACITY,
        ),
        &[Tag::Detail, Tag::DetailFrame],
    );

    renderer.draw_text(
        TextSpec {
            x: p.x + s.detail_width / 2.0,
            y: p.heading_y,
            content: heading.to_string(),
            font_size: s.detail_heading_text_size,
            fill: text_color.to_string(),
            anchor: TextAnchor::Middle,
            dx: 0.0,
            dy: s.detail_heading_text_size,
        },
        &[Tag::Detail, Tag::DetailHeading],
    );

    for (row, token) in data.left_text.iter().enumerate() {
        let y = p.body_y + row as f64 * s.detail_box_height;
        renderer.draw_rect(
            RectSpec::new(p.left_text_x, y, s.detail_box_width, s.detail_box_height)
                .fill(text_color)
                .opacity(0.0),
            &[Tag::Detail, Tag::TokenHighlight { row }],
        );
        renderer.draw_text(
            TextSpec {
                x: p.left_text_x,
                y,
                content: token.clone(),
                font_size: s.text_size,
                fill: text_color.to_string(),
                anchor: TextAnchor::End,
                dx: s.detail_box_width - TOKEN_TEXT_GAP,
                dy: s.text_size,
            },
            &[Tag::Detail, Tag::LeftToken],
        );
    }

    let x1 = p.attention_x + s.attn_padding;
    let x2 = p.attention_x + s.detail_attention_width - s.attn_padding;
    for (source, row) in weights.iter().enumerate() {
        for (target, &weight) in row.iter().enumerate() {
            renderer.draw_line(
                LineSpec {
                    x1,
                    y1: layout.detail_row_y(p.body_y, source),
                    x2,
                    y2: layout.detail_row_y(p.body_y, target),
                    source,
                    target,
                    stroke: color.to_string(),
                    stroke_width: s.line_stroke_width,
                    stroke_opacity: weight,
                    opacity: 1.0,
                },
                &[Tag::Detail, Tag::AttnLineGroup { source }],
            );
        }
    }

    for (row, token) in data.right_text.iter().enumerate() {
        renderer.draw_text(
            TextSpec {
                x: p.right_text_x,
                y: p.body_y + row as f64 * s.detail_box_height,
                content: token.clone(),
                font_size: s.text_size,
                fill: text_color.to_string(),
                anchor: TextAnchor::Start,
                dx: 0.0,
                dy: s.text_size,
            },
            &[Tag::Detail, Tag::RightToken],
        );
    }
}
