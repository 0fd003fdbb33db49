// Owns the current layout and turns pointer, keyboard and resize events
// into discrete update commands for whatever surface draws the diagram.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, FontSizes};
use crate::detail::{DetailPanel, NullPanel};
use crate::interaction::{EdgeEmphasis, EdgeStyle, InteractionState, NodeInteraction};
use crate::ir::{Access, ChannelKind, Connection, Topology, TopologyError};
use crate::keymap::{KeyAction, resolve_key};
use crate::layout::{
    LabelLayout, Layout, Point, RandomSource, Rect, ThreadRandom, Viewport, compute_groups, compute_layout,
    relabel_node,
};
use crate::resize::ResizeDebouncer;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// One imperative change for the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SceneUpdate {
    MoveNode { id: String, position: Point },
    MoveLabels { id: String, labels: LabelLayout },
    RedrawEdge { id: String, from: Point, to: Point },
    UpdateGroup { id: String, bounds: Rect },
    ResizeVpc { bounds: Rect },
    ResizeRegion { access: Access, bounds: Rect },
    Restyle { node_radius: f32, stroke_width: f32, fonts: FontSizes },
    SetNodeEmphasis { id: String, scale: f32, glow: bool },
    SetEdgeEmphasis { id: String, emphasis: EdgeEmphasis, style: EdgeStyle },
    AnimateParticle { edge_id: String, from: Point, to: Point, duration_ms: u64 },
    SetDragging { id: String, dragging: bool },
    ShowDetail { id: String },
    HideDetail,
    /// Host should re-measure its container and call
    /// [`Scene::request_resize`].
    ResizeBroadcast,
}

pub struct Scene {
    topology: Topology,
    config: Config,
    layout: Layout,
    interaction: InteractionState,
    edges: BTreeMap<String, EdgeEmphasis>,
    panel: Box<dyn DetailPanel>,
    open_detail: Option<String>,
    rng: Box<dyn RandomSource>,
    debouncer: ResizeDebouncer,
    flow_until: Option<Duration>,
}

impl Scene {
    pub fn new(topology: Topology, config: Config, width: f32, height: f32) -> Result<Self, SceneError> {
        Self::with_random(topology, config, width, height, Box::new(ThreadRandom))
    }

    /// Builds the scene with an explicit random source for the last-chance
    /// placement search.
    pub fn with_random(
        topology: Topology,
        config: Config,
        width: f32,
        height: f32,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self, SceneError> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(SceneError::InvalidViewport { width, height });
        }
        let topology = if config.layout.hidden_nodes.is_empty() {
            topology
        } else {
            topology.without_nodes(&config.layout.hidden_nodes)
        };
        topology.validate()?;

        let layout = compute_layout(&topology, Viewport::new(width, height), &config.layout, rng.as_mut());
        let debouncer = ResizeDebouncer::new(Duration::from_millis(config.interaction.resize_debounce_ms));
        tracing::debug!(nodes = topology.nodes.len(), edges = topology.edges.len(), "scene ready");
        Ok(Self {
            topology,
            config,
            layout,
            interaction: InteractionState::default(),
            edges: BTreeMap::new(),
            panel: Box::new(NullPanel),
            open_detail: None,
            rng,
            debouncer,
            flow_until: None,
        })
    }

    pub fn attach_panel(&mut self, panel: Box<dyn DetailPanel>) {
        self.panel = panel;
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn node_state(&self, id: &str) -> NodeInteraction {
        self.interaction.get(id)
    }

    pub fn edge_emphasis(&self, id: &str) -> EdgeEmphasis {
        self.edges.get(id).copied().unwrap_or_default()
    }

    /// Visual scale of a node; only hovering enlarges it.
    pub fn node_scale(&self, id: &str) -> f32 {
        match self.interaction.get(id) {
            NodeInteraction::Hovering => self.config.interaction.hover_scale,
            _ => 1.0,
        }
    }

    /// Id of the node whose record the detail panel shows.
    pub fn open_detail(&self) -> Option<&str> {
        self.open_detail.as_deref()
    }

    /// Both endpoint positions of an edge, or `None` if either is missing
    /// from the layout.
    pub fn edge_endpoints(&self, edge: &Connection) -> Option<(Point, Point)> {
        Some((
            self.layout.position(&edge.source_id)?,
            self.layout.position(&edge.target_id)?,
        ))
    }

    pub fn begin_drag(&mut self, id: &str) -> Vec<SceneUpdate> {
        if self.layout.node(id).is_none() {
            return Vec::new();
        }
        let Some(previous) = self.interaction.grab(id) else {
            return Vec::new();
        };
        let mut updates = Vec::new();
        if previous == NodeInteraction::Hovering {
            updates.push(self.node_emphasis(id));
            self.clear_previews(id, &mut updates);
        }
        updates.push(SceneUpdate::SetDragging {
            id: id.to_string(),
            dragging: true,
        });
        updates
    }

    /// Moves a dragged node to the pointer, clamped to its region's padded
    /// interior. Overlap with other nodes is allowed.
    pub fn drag_to(&mut self, id: &str, x: f32, y: f32) -> Vec<SceneUpdate> {
        if !self.interaction.is_dragging(id) || !(x.is_finite() && y.is_finite()) {
            return Vec::new();
        }
        let Some(bounds) = self.layout.drag_bounds(id) else {
            return Vec::new();
        };
        let position = bounds.clamp(Point::new(x, y));
        let has_port = self.topology.node(id).is_some_and(|node| node.port.is_some());

        let radius = self.layout.metrics.node_radius;
        let Some(node) = self.layout.nodes.get_mut(id) else {
            return Vec::new();
        };
        node.position = position;
        relabel_node(&mut self.layout.nodes, id, has_port, radius, &self.config.layout);
        self.layout.groups = compute_groups(&self.topology.groups, &self.layout.nodes, self.config.layout.group_padding);

        let mut updates = vec![SceneUpdate::MoveNode {
            id: id.to_string(),
            position,
        }];
        if let Some(node) = self.layout.node(id) {
            updates.push(SceneUpdate::MoveLabels {
                id: id.to_string(),
                labels: node.labels,
            });
        }
        for edge in self.topology.edges_touching(id) {
            if let Some(update) = self.redraw_edge(edge) {
                updates.push(update);
            }
        }
        self.push_groups(&mut updates);
        updates
    }

    pub fn end_drag(&mut self, id: &str) -> Vec<SceneUpdate> {
        if !self.interaction.release(id) {
            return Vec::new();
        }
        vec![SceneUpdate::SetDragging {
            id: id.to_string(),
            dragging: false,
        }]
    }

    /// Enlarges the node and previews the edges that touch it.
    pub fn pointer_enter(&mut self, id: &str) -> Vec<SceneUpdate> {
        if self.layout.node(id).is_none() || !self.interaction.enter(id) {
            return Vec::new();
        }
        let mut updates = vec![self.node_emphasis(id)];
        let touching: Vec<String> = self.topology.edges_touching(id).map(|edge| edge.id.clone()).collect();
        for edge_id in touching {
            if self.edge_emphasis(&edge_id) == EdgeEmphasis::Idle {
                updates.push(self.set_edge(&edge_id, EdgeEmphasis::Preview));
            }
        }
        updates
    }

    pub fn pointer_leave(&mut self, id: &str) -> Vec<SceneUpdate> {
        if !self.interaction.leave(id) {
            return Vec::new();
        }
        let mut updates = vec![self.node_emphasis(id)];
        self.clear_previews(id, &mut updates);
        updates
    }

    /// Opens the detail panel for the node and, when enabled, lights up its
    /// direct connections.
    pub fn click(&mut self, id: &str, now: Duration) -> Vec<SceneUpdate> {
        let Some(instance) = self.topology.node(id) else {
            return Vec::new();
        };
        self.panel.show(instance);
        self.open_detail = Some(id.to_string());
        let mut updates = vec![
            SceneUpdate::ShowDetail { id: id.to_string() },
            SceneUpdate::ResizeBroadcast,
        ];
        if self.config.interaction.click_flow_highlight {
            let edge_ids: Vec<String> = self
                .topology
                .edges_touching(id)
                .filter(|edge| edge.other_end(id).is_some_and(|peer| self.layout.node(peer).is_some()))
                .map(|edge| edge.id.clone())
                .collect();
            tracing::debug!(node = id, edges = edge_ids.len(), "flow highlight");
            self.highlight_edges(&edge_ids, now, &mut updates);
        }
        updates
    }

    /// Keyboard focus: same as clicking the node.
    pub fn focus_node(&mut self, id: &str, now: Duration) -> Vec<SceneUpdate> {
        self.click(id, now)
    }

    pub fn highlight_all(&mut self, now: Duration) -> Vec<SceneUpdate> {
        let edge_ids: Vec<String> = self.topology.edges.iter().map(|edge| edge.id.clone()).collect();
        let mut updates = Vec::new();
        self.highlight_edges(&edge_ids, now, &mut updates);
        updates
    }

    pub fn hide_detail(&mut self) -> Vec<SceneUpdate> {
        if self.open_detail.take().is_none() {
            return Vec::new();
        }
        self.panel.hide();
        vec![SceneUpdate::HideDetail, SceneUpdate::ResizeBroadcast]
    }

    pub fn key(&mut self, key: &str, now: Duration) -> Vec<SceneUpdate> {
        match resolve_key(key, &self.config.interaction) {
            Some(KeyAction::Focus(id)) => self.focus_node(&id, now),
            Some(KeyAction::HighlightAll) => self.highlight_all(now),
            Some(KeyAction::HidePanel) => self.hide_detail(),
            None => Vec::new(),
        }
    }

    /// Records a container size change. The re-layout runs from
    /// [`Scene::advance`] once the debounce period has passed.
    pub fn request_resize(&mut self, width: f32, height: f32, now: Duration) {
        self.debouncer.request(width, height, now);
    }

    pub fn resize_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Fires due timers: the debounced resize and the expiry of a flow
    /// highlight.
    pub fn advance(&mut self, now: Duration) -> Vec<SceneUpdate> {
        let mut updates = Vec::new();
        if let Some((width, height)) = self.debouncer.poll(now) {
            let viewport = Viewport::from_container(width, height, self.layout.viewport, &self.config.interaction);
            updates.extend(self.relayout(viewport));
        }
        if self.flow_until.is_some_and(|until| now >= until) {
            self.flow_until = None;
            let flowing: Vec<String> = self
                .edges
                .iter()
                .filter(|(_, emphasis)| **emphasis == EdgeEmphasis::Flow)
                .map(|(id, _)| id.clone())
                .collect();
            for edge_id in flowing {
                let resting = self.resting_emphasis(&edge_id);
                updates.push(self.set_edge(&edge_id, resting));
            }
        }
        updates
    }

    /// Recomputes the whole layout for `viewport` and reports new geometry
    /// for every element.
    pub fn relayout(&mut self, viewport: Viewport) -> Vec<SceneUpdate> {
        self.layout = compute_layout(&self.topology, viewport, &self.config.layout, self.rng.as_mut());
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            mode = ?self.layout.mode,
            "relayout"
        );
        self.geometry_updates()
    }

    /// Commands that redraw every element from the current layout.
    pub fn geometry_updates(&self) -> Vec<SceneUpdate> {
        let layout = &self.layout;
        let mut updates = vec![SceneUpdate::ResizeVpc { bounds: layout.vpc }];
        for region in layout.regions.values() {
            updates.push(SceneUpdate::ResizeRegion {
                access: region.access,
                bounds: region.bounds,
            });
        }
        updates.push(SceneUpdate::Restyle {
            node_radius: layout.metrics.node_radius,
            stroke_width: layout.metrics.stroke_width,
            fonts: layout.metrics.fonts,
        });
        for node in layout.nodes.values() {
            updates.push(SceneUpdate::MoveNode {
                id: node.id.clone(),
                position: node.position,
            });
            updates.push(SceneUpdate::MoveLabels {
                id: node.id.clone(),
                labels: node.labels,
            });
        }
        for edge in &self.topology.edges {
            if let Some(update) = self.redraw_edge(edge) {
                updates.push(update);
            }
        }
        self.push_groups(&mut updates);
        updates
    }

    fn redraw_edge(&self, edge: &Connection) -> Option<SceneUpdate> {
        let (from, to) = self.edge_endpoints(edge)?;
        Some(SceneUpdate::RedrawEdge {
            id: edge.id.clone(),
            from,
            to,
        })
    }

    fn push_groups(&self, updates: &mut Vec<SceneUpdate>) {
        for group in &self.layout.groups {
            updates.push(SceneUpdate::UpdateGroup {
                id: group.id.clone(),
                bounds: group.bounds,
            });
        }
    }

    fn node_emphasis(&self, id: &str) -> SceneUpdate {
        let hovering = self.interaction.get(id) == NodeInteraction::Hovering;
        SceneUpdate::SetNodeEmphasis {
            id: id.to_string(),
            scale: self.node_scale(id),
            glow: hovering,
        }
    }

    fn set_edge(&mut self, id: &str, emphasis: EdgeEmphasis) -> SceneUpdate {
        if emphasis == EdgeEmphasis::Idle {
            self.edges.remove(id);
        } else {
            self.edges.insert(id.to_string(), emphasis);
        }
        SceneUpdate::SetEdgeEmphasis {
            id: id.to_string(),
            emphasis,
            style: emphasis.style(&self.config.interaction),
        }
    }

    /// Drops the previews of edges touching `id`, except where the other
    /// end is still hovered.
    fn clear_previews(&mut self, id: &str, updates: &mut Vec<SceneUpdate>) {
        let previews: Vec<String> = self
            .topology
            .edges_touching(id)
            .filter(|edge| self.edge_emphasis(&edge.id) == EdgeEmphasis::Preview)
            .map(|edge| edge.id.clone())
            .collect();
        for edge_id in previews {
            let resting = self.resting_emphasis(&edge_id);
            if resting != EdgeEmphasis::Preview {
                updates.push(self.set_edge(&edge_id, resting));
            }
        }
    }

    /// Emphasis an edge returns to when a flow highlight ends.
    fn resting_emphasis(&self, edge_id: &str) -> EdgeEmphasis {
        let hovered = self.topology.edge(edge_id).is_some_and(|edge| {
            self.interaction.get(&edge.source_id) == NodeInteraction::Hovering
                || self.interaction.get(&edge.target_id) == NodeInteraction::Hovering
        });
        if hovered {
            EdgeEmphasis::Preview
        } else {
            EdgeEmphasis::Idle
        }
    }

    fn highlight_edges(&mut self, edge_ids: &[String], now: Duration, updates: &mut Vec<SceneUpdate>) {
        let stale: Vec<String> = self
            .edges
            .iter()
            .filter(|(id, emphasis)| **emphasis == EdgeEmphasis::Flow && !edge_ids.contains(*id))
            .map(|(id, _)| id.clone())
            .collect();
        for edge_id in stale {
            let resting = self.resting_emphasis(&edge_id);
            updates.push(self.set_edge(&edge_id, resting));
        }

        let duration_ms = self.config.interaction.particle_duration_ms;
        for edge_id in edge_ids {
            let Some(edge) = self.topology.edge(edge_id) else {
                continue;
            };
            let Some((from, to)) = self.edge_endpoints(edge) else {
                continue;
            };
            let animate = edge.channel_kind == ChannelKind::Api;
            updates.push(self.set_edge(edge_id, EdgeEmphasis::Flow));
            if animate {
                updates.push(SceneUpdate::AnimateParticle {
                    edge_id: edge_id.clone(),
                    from,
                    to,
                    duration_ms,
                });
            }
        }
        let lifetime = Duration::from_millis(self.config.interaction.flow_highlight_ms);
        self.flow_until = Some(now.saturating_add(lifetime));
    }
}
