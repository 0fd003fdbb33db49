use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::InteractionConfig;

/// Pointer state of a single node. Hovering and dragging are mutually
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeInteraction {
    #[default]
    Idle,
    Hovering,
    Dragging,
}

/// Visual weight of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeEmphasis {
    #[default]
    Idle,
    /// Touches the hovered node.
    Preview,
    /// Part of a click or keyboard highlight.
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub opacity: f32,
    pub width: f32,
}

impl EdgeEmphasis {
    pub fn style(self, config: &InteractionConfig) -> EdgeStyle {
        match self {
            EdgeEmphasis::Idle => EdgeStyle {
                opacity: config.idle_edge_opacity,
                width: config.idle_edge_width,
            },
            EdgeEmphasis::Preview => EdgeStyle {
                opacity: config.preview_edge_opacity,
                width: config.preview_edge_width,
            },
            EdgeEmphasis::Flow => EdgeStyle {
                opacity: config.flow_edge_opacity,
                width: config.flow_edge_width,
            },
        }
    }
}

/// Interaction state for every node. Nodes missing from the map are idle.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    nodes: BTreeMap<String, NodeInteraction>,
}

impl InteractionState {
    pub fn get(&self, id: &str) -> NodeInteraction {
        self.nodes.get(id).copied().unwrap_or_default()
    }

    /// Node currently being dragged, if any.
    pub fn dragging(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(_, state)| **state == NodeInteraction::Dragging)
            .map(|(id, _)| id.as_str())
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.get(id) == NodeInteraction::Dragging
    }

    /// `Idle -> Hovering`. Returns false when the transition is suppressed.
    pub fn enter(&mut self, id: &str) -> bool {
        if self.get(id) != NodeInteraction::Idle || self.dragging().is_some() {
            return false;
        }
        self.set(id, NodeInteraction::Hovering);
        true
    }

    /// `Hovering -> Idle`.
    pub fn leave(&mut self, id: &str) -> bool {
        if self.get(id) != NodeInteraction::Hovering {
            return false;
        }
        self.set(id, NodeInteraction::Idle);
        true
    }

    /// `Idle | Hovering -> Dragging`. Returns the previous state, or `None`
    /// when the node was already dragging.
    pub fn grab(&mut self, id: &str) -> Option<NodeInteraction> {
        let previous = self.get(id);
        if previous == NodeInteraction::Dragging {
            return None;
        }
        self.set(id, NodeInteraction::Dragging);
        Some(previous)
    }

    /// `Dragging -> Idle`.
    pub fn release(&mut self, id: &str) -> bool {
        if !self.is_dragging(id) {
            return false;
        }
        self.set(id, NodeInteraction::Idle);
        true
    }

    fn set(&mut self, id: &str, state: NodeInteraction) {
        if state == NodeInteraction::Idle {
            self.nodes.remove(id);
        } else {
            self.nodes.insert(id.to_string(), state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_round_trip() {
        let mut state = InteractionState::default();
        assert!(state.enter("clarity"));
        assert_eq!(state.get("clarity"), NodeInteraction::Hovering);
        assert!(!state.enter("clarity"));
        assert!(state.leave("clarity"));
        assert_eq!(state.get("clarity"), NodeInteraction::Idle);
        assert!(!state.leave("clarity"));
    }

    #[test]
    fn dragging_suppresses_hover() {
        let mut state = InteractionState::default();
        assert_eq!(state.grab("bastion"), Some(NodeInteraction::Idle));
        assert!(!state.enter("bastion"));
        assert!(!state.enter("clarity"));
        assert_eq!(state.dragging(), Some("bastion"));
        assert_eq!(state.grab("bastion"), None);
        assert!(state.release("bastion"));
        assert!(state.enter("clarity"));
    }

    #[test]
    fn grab_from_hover_reports_previous_state() {
        let mut state = InteractionState::default();
        state.enter("grammar");
        assert_eq!(state.grab("grammar"), Some(NodeInteraction::Hovering));
        assert!(!state.leave("grammar"));
        assert!(state.release("grammar"));
        assert!(!state.release("grammar"));
    }

    #[test]
    fn emphasis_styles_follow_config() {
        let config = InteractionConfig::default();
        assert_eq!(EdgeEmphasis::Idle.style(&config), EdgeStyle { opacity: 0.4, width: 2.0 });
        assert_eq!(EdgeEmphasis::Preview.style(&config), EdgeStyle { opacity: 0.8, width: 3.0 });
    }
}
