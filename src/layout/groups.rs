use std::collections::BTreeMap;

use super::{GroupLayout, NodeLayout, Point, Rect};
use crate::ir::SecurityGroup;

/// Smallest rectangle covering `points`, grown by `padding` on every side.
pub fn bounding_rect(points: impl IntoIterator<Item = Point>, padding: f32) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in iter {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(
        min_x - padding,
        min_y - padding,
        max_x - min_x + padding * 2.0,
        max_y - min_y + padding * 2.0,
    ))
}

/// Boundary of one security group from the current node positions. Members
/// without a position are skipped.
pub fn group_layout(group: &SecurityGroup, nodes: &BTreeMap<String, NodeLayout>, padding: f32) -> Option<GroupLayout> {
    let members: Vec<String> = group
        .member_ids
        .iter()
        .filter(|id| nodes.contains_key(*id))
        .cloned()
        .collect();
    let bounds = bounding_rect(members.iter().filter_map(|id| nodes.get(id).map(|n| n.position)), padding)?;
    Some(GroupLayout {
        id: group.id.clone(),
        bounds,
        members,
        color: group.color.clone(),
    })
}

pub fn compute_groups(groups: &[SecurityGroup], nodes: &BTreeMap<String, NodeLayout>, padding: f32) -> Vec<GroupLayout> {
    groups
        .iter()
        .filter_map(|group| group_layout(group, nodes, padding))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_pads_extremes() {
        let rect = bounding_rect([Point::new(10.0, 20.0), Point::new(50.0, 5.0)], 30.0).unwrap();
        assert_eq!(rect, Rect::new(-20.0, -25.0, 100.0, 75.0));
    }

    #[test]
    fn single_member_gets_square_box() {
        let rect = bounding_rect([Point::new(100.0, 100.0)], 30.0).unwrap();
        assert_eq!(rect, Rect::new(70.0, 70.0, 60.0, 60.0));
    }

    #[test]
    fn empty_membership_has_no_box() {
        assert!(bounding_rect(Vec::new(), 30.0).is_none());
        let group = SecurityGroup {
            id: "sg-empty".to_string(),
            name: String::new(),
            color: None,
            member_ids: vec!["ghost".to_string()],
            inbound_rules: Vec::new(),
            outbound_rules: Vec::new(),
        };
        assert!(group_layout(&group, &BTreeMap::new(), 30.0).is_none());
    }
}
