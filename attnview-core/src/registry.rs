//! Several viewers on one page, keyed by container id.
//!
//! Each notebook cell gets its own root div; events addressed to one
//! container never touch another container's state.

use std::collections::HashMap;

use tracing::info;

use crate::config::ViewerSettings;
use crate::error::{RegistryError, Result};
use crate::event::ViewerEvent;
use crate::params::ViewerParams;
use crate::scene::Renderer;
use crate::viewer::Viewer;

#[derive(Debug)]
pub struct ViewerRegistry<R> {
    viewers: HashMap<String, Viewer<R>>,
}

impl<R> Default for ViewerRegistry<R> {
    fn default() -> Self {
        Self {
            viewers: HashMap::new(),
        }
    }
}

impl<R: Renderer> ViewerRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize, render, and register a viewer for `params.root_div_id`.
    pub fn open(
        &mut self,
        params: ViewerParams,
        settings: &ViewerSettings,
        renderer: R,
    ) -> Result<&mut Viewer<R>> {
        if self.viewers.contains_key(&params.root_div_id) {
            return Err(RegistryError::DuplicateInstance {
                root_div_id: params.root_div_id,
            }
            .into());
        }
        let viewer = Viewer::open(params, settings, renderer)?;
        self.attach(viewer)
    }

    /// Register an already-built viewer under its container id.
    pub fn attach(&mut self, viewer: Viewer<R>) -> Result<&mut Viewer<R>> {
        let id = viewer.root_div_id().to_string();
        if self.viewers.contains_key(&id) {
            return Err(RegistryError::DuplicateInstance { root_div_id: id }.into());
        }
        info!(root_div_id = %id, "Viewer attached");
        Ok(self.viewers.entry(id).or_insert(viewer))
    }

    /// Remove and return the viewer for a container.
    pub fn detach(&mut self, root_div_id: &str) -> Option<Viewer<R>> {
        self.viewers.remove(root_div_id)
    }

    pub fn get(&self, root_div_id: &str) -> Option<&Viewer<R>> {
        self.viewers.get(root_div_id)
    }

    pub fn get_mut(&mut self, root_div_id: &str) -> Option<&mut Viewer<R>> {
        self.viewers.get_mut(root_div_id)
    }

    /// Route an event to the viewer attached to `root_div_id`.
    pub fn dispatch(&mut self, root_div_id: &str, event: &ViewerEvent) -> Result<()> {
        let viewer =
            self.viewers
                .get_mut(root_div_id)
                .ok_or_else(|| RegistryError::UnknownInstance {
                    root_div_id: root_div_id.to_string(),
                })?;
        viewer.dispatch(event)
    }

    /// Container ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.viewers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewerError;
    use crate::params::{AttentionData, AttentionTensor};
    use crate::scene::{Scene, Tag};
    use crate::selection::Selection;
    use std::collections::BTreeMap;

    fn params(root: &str) -> ViewerParams {
        let mut attention = BTreeMap::new();
        attention.insert(
            "all".to_string(),
            AttentionData {
                left_text: vec!["a".into(), "b".into()],
                right_text: vec!["a".into(), "b".into()],
                attn: AttentionTensor::new(vec![vec![
                    vec![vec![0.9, 0.1], vec![0.2, 0.8]],
                    vec![vec![0.5, 0.5], vec![1.0, 0.0]],
                ]]),
            },
        );
        ViewerParams {
            attention,
            default_filter: "all".into(),
            display_mode: Default::default(),
            include_layers: vec!["0".into()],
            include_heads: vec!["0".into(), "1".into()],
            total_heads: 2,
            root_div_id: root.into(),
        }
    }

    #[test]
    fn test_open_multiple_instances() {
        let mut registry = ViewerRegistry::new();
        registry
            .open(params("cell-1"), &ViewerSettings::default(), Scene::new())
            .unwrap();
        registry
            .open(params("cell-2"), &ViewerSettings::default(), Scene::new())
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["cell-1", "cell-2"]);
    }

    #[test]
    fn test_duplicate_container_rejected() {
        let mut registry = ViewerRegistry::new();
        registry
            .open(params("cell-1"), &ViewerSettings::default(), Scene::new())
            .unwrap();
        let err = registry
            .open(params("cell-1"), &ViewerSettings::default(), Scene::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Registry(RegistryError::DuplicateInstance { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_events_are_isolated_per_instance() {
        let mut registry = ViewerRegistry::new();
        registry
            .open(params("cell-1"), &ViewerSettings::default(), Scene::new())
            .unwrap();
        registry
            .open(params("cell-2"), &ViewerSettings::default(), Scene::new())
            .unwrap();

        registry
            .dispatch("cell-1", &ViewerEvent::Click { layer: 0, head: 1 })
            .unwrap();

        let one = registry.get("cell-1").unwrap();
        let two = registry.get("cell-2").unwrap();
        assert_eq!(one.selection(), Selection::DetailShown { layer: 0, head: 1 });
        assert_eq!(two.selection(), Selection::NoDetail);
        assert!(one.renderer().count(&[Tag::Detail]) > 0);
        assert_eq!(two.renderer().count(&[Tag::Detail]), 0);
    }

    #[test]
    fn test_dispatch_to_unknown_instance() {
        let mut registry: ViewerRegistry<Scene> = ViewerRegistry::new();
        let err = registry
            .dispatch("ghost", &ViewerEvent::Leave)
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_detach() {
        let mut registry = ViewerRegistry::new();
        registry
            .open(params("cell-1"), &ViewerSettings::default(), Scene::new())
            .unwrap();
        let viewer = registry.detach("cell-1").unwrap();
        assert_eq!(viewer.root_div_id(), "cell-1");
        assert!(registry.is_empty());
        assert!(registry.get_mut("cell-1").is_none());
    }
}
