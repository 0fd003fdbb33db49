use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{FontSizes, InteractionConfig, LayoutConfig};
use crate::ir::{Access, Role};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Closed-interval overlap test: touching edges count as overlapping.
    pub fn touches(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Interior left after shrinking every side by `pad`. When the rectangle
    /// is too small the interior collapses onto its center line.
    pub fn inset(&self, pad: f32) -> Bounds {
        let (min_x, max_x) = collapse(self.x + pad, self.right() - pad);
        let (min_y, max_y) = collapse(self.y + pad, self.bottom() - pad);
        Bounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

fn collapse(min: f32, max: f32) -> (f32, f32) {
    if min <= max {
        (min, max)
    } else {
        let mid = (min + max) / 2.0;
        (mid, mid)
    }
}

/// Inclusive axis-aligned clamp box. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() && v > 0.0 { v } else { 1.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    /// Drawing surface for a host container: the gutter is removed from the
    /// width and both sides are floored. A zero height keeps the previous
    /// aspect ratio.
    pub fn from_container(width: f32, height: f32, previous: Viewport, config: &InteractionConfig) -> Self {
        let width = (width - config.container_gutter).max(config.min_viewport_width);
        let height = if height.is_finite() && height > 0.0 {
            height
        } else {
            width / previous.aspect_ratio()
        };
        Self::new(width, height.max(config.min_viewport_height))
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// How the two regions share the VPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    Stacked,
    SideBySide,
}

impl LayoutMode {
    pub fn for_viewport(viewport: Viewport, threshold: f32) -> Self {
        if viewport.aspect_ratio() < threshold {
            LayoutMode::Stacked
        } else {
            LayoutMode::SideBySide
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleMetrics {
    pub scale_factor: f32,
    pub node_radius: f32,
    pub min_node_distance: f32,
    pub placement_padding: f32,
    pub drag_padding: f32,
    pub stroke_width: f32,
    pub fonts: FontSizes,
}

impl ScaleMetrics {
    pub fn for_viewport(viewport: Viewport, config: &LayoutConfig) -> Self {
        let scale_factor = (viewport.width / config.base_width).min(viewport.height / config.base_height);
        let node_radius = config.base_radius * scale_factor;
        Self {
            scale_factor,
            node_radius,
            min_node_distance: node_radius * config.min_distance_multiplier,
            placement_padding: config.placement_padding.max(config.placement_padding * scale_factor),
            drag_padding: config.drag_padding * scale_factor,
            stroke_width: (config.base_stroke_width * scale_factor).max(config.min_stroke_width),
            fonts: config.fonts.scaled(scale_factor, config.min_font_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    Preferred,
    Spiral,
    Grid,
    Random,
    /// Every search failed; the node sits on its preferred point and may
    /// overlap.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelSide {
    Below,
    Above,
    Right,
}

/// Anchor points (text centers) of a node's caption block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelLayout {
    pub side: LabelSide,
    pub name: Point,
    pub port: Option<Point>,
    pub address: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub role: Role,
    pub region: Access,
    pub preferred: Point,
    pub position: Point,
    pub strategy: PlacementStrategy,
    pub labels: LabelLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionLayout {
    pub access: Access,
    pub bounds: Rect,
    pub name: String,
    pub cidr: String,
    /// Dataset regions folded into this rectangle.
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupLayout {
    pub id: String,
    pub bounds: Rect,
    pub members: Vec<String>,
    pub color: Option<String>,
}

/// Complete geometry for one viewport. Produced by
/// [`compute_layout`](super::compute_layout) and owned by the scene.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub viewport: Viewport,
    pub mode: LayoutMode,
    pub metrics: ScaleMetrics,
    pub vpc: Rect,
    pub regions: BTreeMap<Access, RegionLayout>,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub groups: Vec<GroupLayout>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(|node| node.position)
    }

    pub fn region(&self, access: Access) -> Option<&RegionLayout> {
        self.regions.get(&access)
    }

    /// Interior a placed node may occupy.
    pub fn placement_bounds(&self, access: Access) -> Option<Bounds> {
        let pad = self.metrics.placement_padding + self.metrics.node_radius;
        self.region(access).map(|region| region.bounds.inset(pad))
    }

    /// Interior a dragged node is clamped to.
    pub fn drag_bounds(&self, node_id: &str) -> Option<Bounds> {
        let node = self.nodes.get(node_id)?;
        let pad = self.metrics.drag_padding + self.metrics.node_radius;
        self.region(node.region).map(|region| region.bounds.inset(pad))
    }
}
