//! # Scene
//!
//! The drawing capability the viewer renders through, plus a headless
//! retained-mode implementation.
//!
//! The viewer only talks to the [`Renderer`] trait: draw a rectangle, line or
//! text element with a set of tags, restyle everything matching a tag
//! selector, or remove everything matching one. [`Scene`] keeps the drawn
//! elements in memory so they can be inspected by tests and serialized to SVG
//! or notebook HTML.

pub mod html;
pub mod shapes;
pub mod svg;

pub use html::render_notebook_html;
pub use shapes::{LineSpec, RectSpec, Shape, Tag, TextAnchor, TextSpec};
pub use svg::render_svg;

use serde::Serialize;

/// Identifier of a drawn element, unique within one surface.
pub type ElementId = u64;

/// Drawing operations the viewer needs from its host.
///
/// A selector is a slice of tags; an element matches when it carries all of
/// them. An empty selector matches nothing.
pub trait Renderer {
    /// Discard every element and size the surface.
    fn reset(&mut self, width: f64, height: f64, background: &str);

    fn draw_rect(&mut self, rect: RectSpec, tags: &[Tag]) -> ElementId;

    fn draw_line(&mut self, line: LineSpec, tags: &[Tag]) -> ElementId;

    fn draw_text(&mut self, text: TextSpec, tags: &[Tag]) -> ElementId;

    /// Set the fill of matching elements. Returns how many matched.
    fn set_fill(&mut self, selector: &[Tag], color: &str) -> usize;

    fn set_stroke_opacity(&mut self, selector: &[Tag], opacity: f64) -> usize;

    fn set_opacity(&mut self, selector: &[Tag], opacity: f64) -> usize;

    /// Remove matching elements. Returns how many were removed.
    fn remove_by_tag(&mut self, selector: &[Tag]) -> usize;
}

/// A drawn element and its tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: ElementId,
    pub shape: Shape,
    pub tags: Vec<Tag>,
}

impl Element {
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn matches(&self, selector: &[Tag]) -> bool {
        !selector.is_empty() && selector.iter().all(|tag| self.has_tag(tag))
    }
}

/// Headless, in-memory drawing surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    width: f64,
    height: f64,
    background: String,
    elements: Vec<Element>,
    next_id: ElementId,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    /// Elements in drawing order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Elements carrying every tag in `selector`.
    pub fn select<'a>(&'a self, selector: &'a [Tag]) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.matches(selector))
    }

    pub fn count(&self, selector: &[Tag]) -> usize {
        self.select(selector).count()
    }

    fn push(&mut self, shape: Shape, tags: &[Tag]) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(Element {
            id,
            shape,
            tags: tags.to_vec(),
        });
        id
    }

    fn update(&mut self, selector: &[Tag], mut apply: impl FnMut(&mut Shape)) -> usize {
        let mut matched = 0;
        for element in self.elements.iter_mut().filter(|e| e.matches(selector)) {
            apply(&mut element.shape);
            matched += 1;
        }
        matched
    }
}

impl Renderer for Scene {
    fn reset(&mut self, width: f64, height: f64, background: &str) {
        self.width = width;
        self.height = height;
        self.background = background.to_string();
        self.elements.clear();
    }

    fn draw_rect(&mut self, rect: RectSpec, tags: &[Tag]) -> ElementId {
        self.push(Shape::Rect(rect), tags)
    }

    fn draw_line(&mut self, line: LineSpec, tags: &[Tag]) -> ElementId {
        self.push(Shape::Line(line), tags)
    }

    fn draw_text(&mut self, text: TextSpec, tags: &[Tag]) -> ElementId {
        self.push(Shape::Text(text), tags)
    }

    fn set_fill(&mut self, selector: &[Tag], color: &str) -> usize {
        self.update(selector, |shape| shape.set_fill(color))
    }

    fn set_stroke_opacity(&mut self, selector: &[Tag], opacity: f64) -> usize {
        self.update(selector, |shape| shape.set_stroke_opacity(opacity))
    }

    fn set_opacity(&mut self, selector: &[Tag], opacity: f64) -> usize {
        self.update(selector, |shape| shape.set_opacity(opacity))
    }

    fn remove_by_tag(&mut self, selector: &[Tag]) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !e.matches(selector));
        before - self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(source: usize, target: usize) -> LineSpec {
        LineSpec {
            x1: 0.0,
            y1: source as f64,
            x2: 10.0,
            y2: target as f64,
            source,
            target,
            stroke: "#1f77b4".into(),
            stroke_width: 2.2,
            stroke_opacity: 0.5,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_scene_draw_and_select() {
        let mut scene = Scene::new();
        scene.reset(970.0, 200.0, "white");
        let a = scene.draw_line(line(0, 0), &[Tag::Detail, Tag::AttnLineGroup { source: 0 }]);
        let b = scene.draw_line(line(1, 0), &[Tag::Detail, Tag::AttnLineGroup { source: 1 }]);
        scene.draw_rect(
            RectSpec::new(0.0, 0.0, 5.0, 5.0),
            &[Tag::Thumbnail { layer: 0, head: 0 }],
        );

        assert_ne!(a, b);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.count(&[Tag::Detail]), 2);
        assert_eq!(
            scene.count(&[Tag::Detail, Tag::AttnLineGroup { source: 1 }]),
            1
        );
        assert_eq!(scene.get(b).unwrap().shape.as_line().unwrap().source, 1);
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        let mut scene = Scene::new();
        scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0), &[Tag::Detail]);
        assert_eq!(scene.count(&[]), 0);
        assert_eq!(scene.remove_by_tag(&[]), 0);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_set_opacity_by_tag() {
        let mut scene = Scene::new();
        scene.draw_line(line(0, 0), &[Tag::AttnLineGroup { source: 0 }]);
        scene.draw_line(line(0, 1), &[Tag::AttnLineGroup { source: 0 }]);
        scene.draw_line(line(1, 0), &[Tag::AttnLineGroup { source: 1 }]);

        let changed = scene.set_opacity(&[Tag::AttnLineGroup { source: 0 }], 0.0);
        assert_eq!(changed, 2);
        let opacities: Vec<f64> = scene.elements().iter().map(|e| e.shape.opacity()).collect();
        assert_eq!(opacities, vec![0.0, 0.0, 1.0]);
        // Stroke opacity carries the weight and is untouched by group opacity.
        assert!(
            scene
                .elements()
                .iter()
                .all(|e| e.shape.as_line().unwrap().stroke_opacity == 0.5)
        );
    }

    #[test]
    fn test_remove_by_tag() {
        let mut scene = Scene::new();
        scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0), &[Tag::Detail]);
        scene.draw_line(line(0, 0), &[Tag::Detail]);
        scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0), &[Tag::ThumbnailBackground]);

        assert_eq!(scene.remove_by_tag(&[Tag::Detail]), 2);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.remove_by_tag(&[Tag::Detail]), 0);
    }

    #[test]
    fn test_reset_clears_elements_and_keeps_ids_unique() {
        let mut scene = Scene::new();
        let first = scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0), &[Tag::Detail]);
        scene.reset(100.0, 50.0, "black");
        assert!(scene.is_empty());
        assert_eq!(scene.width(), 100.0);
        assert_eq!(scene.height(), 50.0);
        assert_eq!(scene.background(), "black");
        let second = scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0), &[Tag::Detail]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_set_fill_and_stroke_opacity() {
        let mut scene = Scene::new();
        let sel = [Tag::ThumbnailBackground, Tag::Thumbnail { layer: 1, head: 2 }];
        scene.draw_rect(RectSpec::new(0.0, 0.0, 1.0, 1.0).fill("white"), &sel);
        scene.draw_rect(
            RectSpec::new(0.0, 0.0, 1.0, 1.0).fill("white"),
            &[Tag::ThumbnailBackground, Tag::Thumbnail { layer: 0, head: 0 }],
        );

        assert_eq!(scene.set_fill(&sel, "#F5F5F5"), 1);
        assert_eq!(scene.set_stroke_opacity(&sel, 0.8), 1);
        let rect = scene.select(&sel).next().unwrap().shape.as_rect().unwrap();
        assert_eq!(rect.fill.as_deref(), Some("#F5F5F5"));
        assert_eq!(rect.stroke_opacity, 0.8);
        let other = &scene.elements()[1];
        assert_eq!(other.shape.as_rect().unwrap().fill.as_deref(), Some("white"));
    }
}
