//! Which (layer, head) has its detail overlay open.

use serde::{Deserialize, Serialize};

/// At most one thumbnail is detailed at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    NoDetail,
    DetailShown { layer: usize, head: usize },
}

/// What a click changed, so the viewer knows which elements to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing was detailed; now (layer, head) is.
    Show { layer: usize, head: usize },
    /// A different thumbnail was detailed and is replaced.
    Replace {
        from: (usize, usize),
        to: (usize, usize),
    },
    /// The detailed thumbnail was clicked again and is closed.
    Hide { layer: usize, head: usize },
}

impl Selection {
    /// Apply a click on thumbnail (layer, head).
    pub fn toggle(self, layer: usize, head: usize) -> (Selection, Transition) {
        match self {
            Selection::NoDetail => (
                Selection::DetailShown { layer, head },
                Transition::Show { layer, head },
            ),
            Selection::DetailShown {
                layer: shown_layer,
                head: shown_head,
            } if shown_layer == layer && shown_head == head => {
                (Selection::NoDetail, Transition::Hide { layer, head })
            }
            Selection::DetailShown {
                layer: shown_layer,
                head: shown_head,
            } => (
                Selection::DetailShown { layer, head },
                Transition::Replace {
                    from: (shown_layer, shown_head),
                    to: (layer, head),
                },
            ),
        }
    }

    pub fn detailed(&self) -> Option<(usize, usize)> {
        match self {
            Selection::NoDetail => None,
            Selection::DetailShown { layer, head } => Some((*layer, *head)),
        }
    }

    pub fn is_detailed(&self, layer: usize, head: usize) -> bool {
        self.detailed() == Some((layer, head))
    }
}

impl Transition {
    /// The thumbnail that ends up detailed, if any.
    pub fn shown(&self) -> Option<(usize, usize)> {
        match self {
            Transition::Show { layer, head } => Some((*layer, *head)),
            Transition::Replace { to, .. } => Some(*to),
            Transition::Hide { .. } => None,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::NoDetail => write!(f, "no detail"),
            Selection::DetailShown { layer, head } => {
                write!(f, "detail shown for layer {layer}, head {head}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_no_detail() {
        assert_eq!(Selection::default(), Selection::NoDetail);
        assert_eq!(Selection::default().detailed(), None);
    }

    #[test]
    fn test_click_shows_detail() {
        let (next, transition) = Selection::NoDetail.toggle(2, 5);
        assert_eq!(next, Selection::DetailShown { layer: 2, head: 5 });
        assert_eq!(transition, Transition::Show { layer: 2, head: 5 });
        assert_eq!(transition.shown(), Some((2, 5)));
    }

    #[test]
    fn test_same_click_hides_detail() {
        let (next, transition) = Selection::DetailShown { layer: 2, head: 5 }.toggle(2, 5);
        assert_eq!(next, Selection::NoDetail);
        assert_eq!(transition, Transition::Hide { layer: 2, head: 5 });
        assert_eq!(transition.shown(), None);
    }

    #[test]
    fn test_other_click_replaces_detail() {
        let (next, transition) = Selection::DetailShown { layer: 2, head: 5 }.toggle(2, 6);
        assert_eq!(next, Selection::DetailShown { layer: 2, head: 6 });
        assert_eq!(
            transition,
            Transition::Replace {
                from: (2, 5),
                to: (2, 6)
            }
        );
    }

    #[test]
    fn test_same_head_different_layer_replaces() {
        let (next, _) = Selection::DetailShown { layer: 0, head: 1 }.toggle(1, 1);
        assert!(next.is_detailed(1, 1));
        assert!(!next.is_detailed(0, 1));
    }

    #[test]
    fn test_three_clicks_cycle() {
        let s = Selection::NoDetail;
        let (s, _) = s.toggle(0, 0);
        let (s, _) = s.toggle(0, 0);
        let (s, _) = s.toggle(0, 0);
        assert_eq!(s, Selection::DetailShown { layer: 0, head: 0 });
    }

    #[test]
    fn test_display() {
        assert_eq!(Selection::NoDetail.to_string(), "no detail");
        assert_eq!(
            Selection::DetailShown { layer: 1, head: 3 }.to_string(),
            "detail shown for layer 1, head 3"
        );
    }
}
