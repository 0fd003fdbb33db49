// Caption placement for nodes. Three fixed candidates are tried in order
// (below, above, right); the last one is used even if it still overlaps.

use super::{LabelLayout, LabelSide, Point, Rect};
use crate::config::LayoutConfig;

/// Places the name/port/address block of a node at `center`. `obstacles`
/// are the centers of every other node; each is treated as the bounding
/// square of a circle of `radius`.
pub fn place_labels(
    center: Point,
    has_port: bool,
    obstacles: &[Point],
    radius: f32,
    config: &LayoutConfig,
) -> LabelLayout {
    let below = below_candidate(center, has_port, radius, config);
    if !overlaps_nodes(&below, obstacles, radius, config) {
        return below;
    }
    let above = above_candidate(center, has_port, radius, config);
    if !overlaps_nodes(&above, obstacles, radius, config) {
        return above;
    }
    right_candidate(center, has_port, radius, config)
}

fn below_candidate(center: Point, has_port: bool, radius: f32, config: &LayoutConfig) -> LabelLayout {
    let line = config.label_line_height;
    let name_y = center.y + radius + config.label_offset;
    LabelLayout {
        side: LabelSide::Below,
        name: Point::new(center.x, name_y),
        port: has_port.then(|| Point::new(center.x, name_y + line)),
        address: Point::new(center.x, name_y + if has_port { line * 2.0 } else { line }),
    }
}

fn above_candidate(center: Point, has_port: bool, radius: f32, config: &LayoutConfig) -> LabelLayout {
    let line = config.label_line_height;
    let name_y = center.y - radius - config.label_offset;
    LabelLayout {
        side: LabelSide::Above,
        name: Point::new(center.x, name_y),
        port: has_port.then(|| Point::new(center.x, name_y - line)),
        address: Point::new(center.x, name_y - if has_port { line * 2.0 } else { line }),
    }
}

fn right_candidate(center: Point, has_port: bool, radius: f32, config: &LayoutConfig) -> LabelLayout {
    let line = config.label_line_height;
    let x = center.x + radius + config.label_side_gap;
    LabelLayout {
        side: LabelSide::Right,
        name: Point::new(x, center.y - if has_port { line } else { line / 2.0 }),
        port: has_port.then(|| Point::new(x, center.y)),
        address: Point::new(x, center.y + line),
    }
}

pub(crate) fn label_boxes(labels: &LabelLayout, config: &LayoutConfig) -> Vec<Rect> {
    let (w, h) = (config.label_box_width, config.label_box_height);
    let mut boxes = vec![Rect::centered(labels.name, w, h)];
    if let Some(port) = labels.port {
        boxes.push(Rect::centered(port, w, h));
    }
    boxes.push(Rect::centered(labels.address, w, h));
    boxes
}

fn overlaps_nodes(labels: &LabelLayout, obstacles: &[Point], radius: f32, config: &LayoutConfig) -> bool {
    let boxes = label_boxes(labels, config);
    obstacles.iter().any(|node| {
        let square = Rect::centered(*node, radius * 2.0, radius * 2.0);
        boxes.iter().any(|label| label.touches(&square))
    })
}
