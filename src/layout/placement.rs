// Collision-free node placement. Nodes are placed one at a time; each new
// node must keep `min_distance` from every node placed before it, across
// all regions.

use std::f32::consts::TAU;

use super::random::RandomSource;
use super::{Bounds, PlacementStrategy, Point, Rect, ScaleMetrics};
use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub strategy: PlacementStrategy,
}

pub struct Placer<'a> {
    placed: Vec<Point>,
    min_distance: f32,
    inset: f32,
    config: &'a LayoutConfig,
    rng: &'a mut dyn RandomSource,
}

impl<'a> Placer<'a> {
    pub fn new(metrics: &ScaleMetrics, config: &'a LayoutConfig, rng: &'a mut dyn RandomSource) -> Self {
        Self {
            placed: Vec::new(),
            min_distance: metrics.min_node_distance,
            inset: metrics.placement_padding + metrics.node_radius,
            config,
            rng,
        }
    }

    pub fn collides(&self, candidate: Point) -> bool {
        self.placed
            .iter()
            .any(|placed| placed.distance(candidate) < self.min_distance)
    }

    /// Finds a spot for a node preferring `preferred` inside `region`.
    /// Always returns a position; when every search fails the preferred
    /// point is used as is.
    pub fn place(&mut self, preferred: Point, region: &Rect) -> Placement {
        let bounds = region.inset(self.inset);
        let start = bounds.clamp(preferred);

        let found = if !self.collides(start) {
            Some((start, PlacementStrategy::Preferred))
        } else {
            self.spiral_search(start, region, &bounds)
                .map(|p| (p, PlacementStrategy::Spiral))
                .or_else(|| self.grid_search(&bounds).map(|p| (p, PlacementStrategy::Grid)))
                .or_else(|| self.random_search(&bounds).map(|p| (p, PlacementStrategy::Random)))
        };

        let (position, strategy) = match found {
            Some(found) => found,
            None => {
                tracing::warn!(
                    x = preferred.x,
                    y = preferred.y,
                    "no collision-free position found, keeping preferred position"
                );
                (preferred, PlacementStrategy::Fallback)
            }
        };
        if strategy != PlacementStrategy::Preferred {
            tracing::debug!(?strategy, x = position.x, y = position.y, "relocated node");
        }
        self.placed.push(position);
        Placement { position, strategy }
    }

    fn spiral_search(&self, center: Point, region: &Rect, bounds: &Bounds) -> Option<Point> {
        let step = self.min_distance * self.config.spiral_step_ratio;
        if !(step > 0.0 && step.is_finite()) {
            return None;
        }
        let max_radius = region.width.min(region.height) / 3.0;
        let angle_steps = self.config.spiral_angle_steps.max(1);
        let mut radius = self.min_distance;
        while radius <= max_radius {
            for k in 0..angle_steps {
                let angle = TAU * k as f32 / angle_steps as f32;
                let candidate = bounds.clamp(Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ));
                if !self.collides(candidate) {
                    return Some(candidate);
                }
            }
            radius += step;
        }
        None
    }

    fn grid_search(&self, bounds: &Bounds) -> Option<Point> {
        let step = self.min_distance * self.config.grid_step_ratio;
        if !(step > 0.0 && step.is_finite()) {
            return None;
        }
        let cols = (bounds.width() / step).floor() as usize;
        let rows = (bounds.height() / step).floor() as usize;
        for i in 0..=cols {
            let x = bounds.min_x + i as f32 * step;
            for j in 0..=rows {
                let candidate = Point::new(x, bounds.min_y + j as f32 * step);
                if !self.collides(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn random_search(&mut self, bounds: &Bounds) -> Option<Point> {
        for _ in 0..self.config.random_attempts {
            let candidate = Point::new(
                bounds.min_x + self.rng.next_unit() * bounds.width(),
                bounds.min_y + self.rng.next_unit() * bounds.height(),
            );
            if !self.collides(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::random::{ScriptedRandom, SeededRandom};
    use crate::layout::Viewport;

    fn metrics() -> ScaleMetrics {
        ScaleMetrics::for_viewport(Viewport::new(1200.0, 800.0), &LayoutConfig::default())
    }

    #[test]
    fn free_preferred_position_is_kept() {
        let config = LayoutConfig::default();
        let metrics = metrics();
        let mut rng = SeededRandom::new(1);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        let region = Rect::new(0.0, 0.0, 600.0, 600.0);
        let placement = placer.place(Point::new(300.0, 300.0), &region);
        assert_eq!(placement.strategy, PlacementStrategy::Preferred);
        assert_eq!(placement.position, Point::new(300.0, 300.0));
    }

    #[test]
    fn preferred_position_is_clamped_into_interior() {
        let config = LayoutConfig::default();
        let metrics = metrics();
        let mut rng = SeededRandom::new(1);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        let region = Rect::new(0.0, 0.0, 600.0, 600.0);
        let placement = placer.place(Point::new(10.0, 590.0), &region);
        assert_eq!(placement.position, Point::new(85.0, 515.0));
    }

    #[test]
    fn collision_moves_to_spiral_ring() {
        let config = LayoutConfig::default();
        let metrics = metrics();
        let mut rng = SeededRandom::new(1);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        let region = Rect::new(0.0, 0.0, 600.0, 600.0);
        placer.place(Point::new(300.0, 300.0), &region);
        let second = placer.place(Point::new(300.0, 300.0), &region);
        assert_eq!(second.strategy, PlacementStrategy::Spiral);
        assert!((second.position.x - 400.0).abs() < 1e-3);
        assert!((second.position.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn crowded_region_falls_back_to_grid() {
        let config = LayoutConfig::default();
        let metrics = metrics();
        let mut rng = SeededRandom::new(1);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        // Interior is 85..195 on both axes and the spiral cap (280/3) is
        // below the first ring radius, so the spiral never runs.
        let region = Rect::new(0.0, 0.0, 280.0, 280.0);
        let first = placer.place(Point::new(0.0, 0.0), &region);
        let second = placer.place(Point::new(0.0, 0.0), &region);
        assert_eq!(first.strategy, PlacementStrategy::Preferred);
        assert_eq!(first.position, Point::new(85.0, 85.0));
        assert_eq!(second.strategy, PlacementStrategy::Grid);
        assert_eq!(second.position, Point::new(165.0, 165.0));
        assert!(first.position.distance(second.position) >= metrics.min_node_distance);
    }

    #[test]
    fn exhausted_search_keeps_preferred_point() {
        let config = LayoutConfig {
            random_attempts: 5,
            ..LayoutConfig::default()
        };
        let metrics = metrics();
        let mut rng = ScriptedRandom::new(vec![0.5]);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        // Degenerate interior: everything collapses to the center point.
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let first = placer.place(Point::new(50.0, 50.0), &region);
        let second = placer.place(Point::new(20.0, 80.0), &region);
        assert_eq!(first.strategy, PlacementStrategy::Preferred);
        assert_eq!(second.strategy, PlacementStrategy::Fallback);
        assert_eq!(second.position, Point::new(20.0, 80.0));
    }

    #[test]
    fn zero_distance_never_collides() {
        let config = LayoutConfig::default();
        let mut metrics = metrics();
        metrics.min_node_distance = 0.0;
        let mut rng = SeededRandom::new(3);
        let mut placer = Placer::new(&metrics, &config, &mut rng);
        let region = Rect::new(0.0, 0.0, 400.0, 400.0);
        for _ in 0..3 {
            let placement = placer.place(Point::new(200.0, 200.0), &region);
            assert_eq!(placement.strategy, PlacementStrategy::Preferred);
        }
    }
}
