// Formulaic starting points per role. These are only preferences: the
// placer moves a node when its preferred point is taken.

use super::{LayoutMode, Point, Rect, ScaleMetrics};
use crate::ir::{Access, Instance, Role, Topology};

const PUBLIC_Y_NUDGE: f32 = 5.0;
const COORDINATOR_X_NUDGE: f32 = 30.0;
const EVALUATOR_COLUMNS: usize = 3;
const EVALUATOR_LEFT: f32 = 60.0;
const EVALUATOR_SPACING_FACTOR: f32 = 1.2;

struct ModeOffsets {
    coordinator_top: f32,
    evaluator_top: f32,
    evaluator_row_divisor: f32,
    light_left: f32,
    light_right: f32,
    light_bottom: f32,
}

fn offsets(mode: LayoutMode) -> ModeOffsets {
    match mode {
        LayoutMode::Stacked => ModeOffsets {
            coordinator_top: 60.0,
            evaluator_top: 120.0,
            evaluator_row_divisor: 3.5,
            light_left: 60.0,
            light_right: 60.0,
            light_bottom: 60.0,
        },
        LayoutMode::SideBySide => ModeOffsets {
            coordinator_top: 75.0,
            evaluator_top: 155.0,
            evaluator_row_divisor: 4.0,
            light_left: 50.0,
            light_right: 80.0,
            light_bottom: 75.0,
        },
    }
}

#[derive(Debug, Clone)]
pub struct PreferredNode<'a> {
    pub instance: &'a Instance,
    pub access: Access,
    pub point: Point,
}

/// Preferred points in placement order: by role (gateway first, light
/// evaluators last), then dataset order.
pub fn preferred_positions<'a>(
    topology: &'a Topology,
    public: &Rect,
    private: &Rect,
    mode: LayoutMode,
    metrics: &ScaleMetrics,
) -> Vec<PreferredNode<'a>> {
    let offsets = offsets(mode);
    let mut order: Vec<&Instance> = topology.nodes.iter().collect();
    order.sort_by_key(|node| node.role);

    let rect_for = |access: Access| match access {
        Access::Public => public,
        Access::Private => private,
    };
    let is_entry = |role: Role| matches!(role, Role::Gateway | Role::Frontend);
    let entry_total = |access: Access| {
        order
            .iter()
            .filter(|n| is_entry(n.role) && topology.access_of(n) == access)
            .count()
    };
    let entry_totals = [entry_total(Access::Public), entry_total(Access::Private)];
    let light_total = order.iter().filter(|n| n.role == Role::LightEvaluator).count();

    let mut entry_seen = [0usize; 2];
    let mut coordinator_seen = 0usize;
    let mut evaluator_seen = 0usize;
    let mut light_seen = 0usize;
    let mut out = Vec::with_capacity(order.len());

    for node in order {
        let access = topology.access_of(node);
        let r = rect_for(access);
        let point = match node.role {
            Role::Gateway | Role::Frontend => {
                let slot = &mut entry_seen[access as usize];
                let n = entry_totals[access as usize] as f32;
                let i = *slot as f32;
                *slot += 1;
                Point::new(r.x + r.width * (i + 1.0) / (n + 1.0), r.y + r.height / 2.0 + PUBLIC_Y_NUDGE)
            }
            Role::Coordinator => {
                let i = coordinator_seen as f32;
                coordinator_seen += 1;
                let nudge = match mode {
                    LayoutMode::Stacked => 0.0,
                    LayoutMode::SideBySide => COORDINATOR_X_NUDGE,
                };
                Point::new(
                    r.x + r.width / 2.0 + nudge + i * metrics.min_node_distance,
                    r.y + offsets.coordinator_top,
                )
            }
            Role::ComputeEvaluator => {
                let col = evaluator_seen % EVALUATOR_COLUMNS;
                let row = evaluator_seen / EVALUATOR_COLUMNS;
                evaluator_seen += 1;
                let min_spacing = metrics.min_node_distance * EVALUATOR_SPACING_FACTOR;
                let spacing_x = min_spacing.max(r.width / 4.0);
                let spacing_y = min_spacing.max(r.height / offsets.evaluator_row_divisor);
                Point::new(
                    r.x + EVALUATOR_LEFT + col as f32 * spacing_x,
                    r.y + offsets.evaluator_top + row as f32 * spacing_y,
                )
            }
            Role::LightEvaluator => {
                let left = r.x + offsets.light_left;
                let right = r.right() - offsets.light_right;
                let t = if light_total > 1 {
                    light_seen as f32 / (light_total - 1) as f32
                } else {
                    0.0
                };
                light_seen += 1;
                Point::new(left + (right - left) * t, r.bottom() - offsets.light_bottom)
            }
        };
        out.push(PreferredNode {
            instance: node,
            access,
            point,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::regions::{region_rects, vpc_rect};
    use crate::layout::Viewport;

    fn approx(a: Point, x: f32, y: f32) {
        assert!((a.x - x).abs() < 1e-2 && (a.y - y).abs() < 1e-2, "{a:?} != ({x}, {y})");
    }

    #[test]
    fn side_by_side_preferences_follow_role_slots() {
        let topology = Topology::builtin().unwrap();
        let viewport = Viewport::new(1200.0, 800.0);
        let config = LayoutConfig::default();
        let metrics = ScaleMetrics::for_viewport(viewport, &config);
        let vpc = vpc_rect(viewport, &config);
        let (public, private) = region_rects(&vpc, LayoutMode::SideBySide);
        let prefs = preferred_positions(&topology, &public, &private, LayoutMode::SideBySide, &metrics);

        let ids: Vec<&str> = prefs.iter().map(|p| p.instance.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "bastion",
                "webapp",
                "orchestrator",
                "clarity",
                "grammar",
                "documentation",
                "structure",
                "granularity",
                "tooling",
                "repetition"
            ]
        );
        approx(prefs[0].point, 228.0, 353.0);
        approx(prefs[1].point, 396.0, 353.0);
        approx(prefs[2].point, 918.0, 135.0);
        approx(prefs[3].point, 696.0, 215.0);
        approx(prefs[4].point, 822.0, 215.0);
        approx(prefs[6].point, 696.0, 359.0);
        approx(prefs[8].point, 686.0, 561.0);
        approx(prefs[9].point, 1060.0, 561.0);
        assert_eq!(prefs[9].access, Access::Private);
    }

    #[test]
    fn lone_gateway_is_centered() {
        let topology = Topology::builtin().unwrap().without_nodes(&["webapp"]);
        let viewport = Viewport::new(1200.0, 800.0);
        let config = LayoutConfig::default();
        let metrics = ScaleMetrics::for_viewport(viewport, &config);
        let vpc = vpc_rect(viewport, &config);
        let (public, private) = region_rects(&vpc, LayoutMode::SideBySide);
        let prefs = preferred_positions(&topology, &public, &private, LayoutMode::SideBySide, &metrics);
        assert_eq!(prefs[0].instance.id, "bastion");
        approx(prefs[0].point, public.x + public.width / 2.0, 353.0);
    }
}
