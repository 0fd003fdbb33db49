mod groups;
pub(crate) mod label_placement;
pub mod placement;
mod preferred;
pub mod random;
mod regions;
pub(crate) mod types;
pub use groups::{bounding_rect, compute_groups, group_layout};
pub use label_placement::place_labels;
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
pub use types::*;

use placement::Placer;
use preferred::preferred_positions;
use regions::{region_rects, vpc_rect};

use crate::config::LayoutConfig;
use crate::ir::{Access, Topology};
use std::collections::BTreeMap;

/// Computes a complete layout for `viewport` from scratch.
///
/// Deterministic except for nodes that needed the random fallback search,
/// which draw from `rng`. Never fails: nodes that cannot be placed without
/// overlap keep their preferred point.
pub fn compute_layout(
    topology: &Topology,
    viewport: Viewport,
    config: &LayoutConfig,
    rng: &mut dyn RandomSource,
) -> Layout {
    let metrics = ScaleMetrics::for_viewport(viewport, config);
    let mode = LayoutMode::for_viewport(viewport, config.vertical_ratio_threshold);
    let vpc = vpc_rect(viewport, config);
    let (public_rect, private_rect) = region_rects(&vpc, mode);
    tracing::debug!(
        width = viewport.width,
        height = viewport.height,
        ?mode,
        scale = metrics.scale_factor,
        "computing layout"
    );

    let mut regions = BTreeMap::new();
    for (access, bounds) in [(Access::Public, public_rect), (Access::Private, private_rect)] {
        regions.insert(access, region_layout(topology, access, bounds));
    }

    let preferred = preferred_positions(topology, &public_rect, &private_rect, mode, &metrics);
    let mut placer = Placer::new(&metrics, config, rng);
    let mut nodes = BTreeMap::new();
    for pref in preferred {
        let region = match pref.access {
            Access::Public => &public_rect,
            Access::Private => &private_rect,
        };
        let placement = placer.place(pref.point, region);
        nodes.insert(
            pref.instance.id.clone(),
            NodeLayout {
                id: pref.instance.id.clone(),
                role: pref.instance.role,
                region: pref.access,
                preferred: pref.point,
                position: placement.position,
                strategy: placement.strategy,
                labels: place_labels(placement.position, false, &[], metrics.node_radius, config),
            },
        );
    }

    relabel_all(&mut nodes, topology, metrics.node_radius, config);
    let groups = compute_groups(&topology.groups, &nodes, config.group_padding);

    Layout {
        viewport,
        mode,
        metrics,
        vpc,
        regions,
        nodes,
        groups,
    }
}

fn region_layout(topology: &Topology, access: Access, bounds: Rect) -> RegionLayout {
    let primary = topology.primary_region(access);
    RegionLayout {
        access,
        bounds,
        name: primary.map(|r| r.name.clone()).unwrap_or_default(),
        cidr: primary.map(|r| r.cidr.clone()).unwrap_or_default(),
        subnets: topology
            .network
            .regions
            .iter()
            .filter(|r| r.access == access)
            .map(|r| r.id.clone())
            .collect(),
    }
}

/// Re-runs caption placement for one node against every other node.
pub fn relabel_node(
    nodes: &mut BTreeMap<String, NodeLayout>,
    id: &str,
    has_port: bool,
    radius: f32,
    config: &LayoutConfig,
) {
    let obstacles: Vec<Point> = nodes
        .values()
        .filter(|node| node.id != id)
        .map(|node| node.position)
        .collect();
    if let Some(node) = nodes.get_mut(id) {
        node.labels = place_labels(node.position, has_port, &obstacles, radius, config);
    }
}

fn relabel_all(nodes: &mut BTreeMap<String, NodeLayout>, topology: &Topology, radius: f32, config: &LayoutConfig) {
    for instance in &topology.nodes {
        relabel_node(nodes, &instance.id, instance.port.is_some(), radius, config);
    }
}
