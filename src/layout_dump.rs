use crate::ir::Topology;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub mode: String,
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
    pub node_radius: f32,
    pub min_node_distance: f32,
    pub regions: Vec<RegionDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub groups: Vec<GroupDump>,
}

#[derive(Debug, Serialize)]
pub struct RegionDump {
    pub access: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub role: String,
    pub region: String,
    pub x: f32,
    pub y: f32,
    pub preferred: [f32; 2],
    pub strategy: String,
    pub label_side: String,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
    pub id: String,
    pub members: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, topology: &Topology) -> Self {
        let regions = layout
            .regions
            .values()
            .map(|region| RegionDump {
                access: region.access.as_str().to_string(),
                name: region.name.clone(),
                x: region.bounds.x,
                y: region.bounds.y,
                width: region.bounds.width,
                height: region.bounds.height,
            })
            .collect();

        let nodes = topology
            .nodes
            .iter()
            .filter_map(|instance| layout.node(&instance.id))
            .map(|node| NodeDump {
                id: node.id.clone(),
                role: format!("{:?}", node.role),
                region: node.region.as_str().to_string(),
                x: node.position.x,
                y: node.position.y,
                preferred: [node.preferred.x, node.preferred.y],
                strategy: format!("{:?}", node.strategy),
                label_side: format!("{:?}", node.labels.side),
            })
            .collect();

        let edges = topology
            .edges
            .iter()
            .filter_map(|edge| {
                let from = layout.position(&edge.source_id)?;
                let to = layout.position(&edge.target_id)?;
                Some(EdgeDump {
                    id: edge.id.clone(),
                    from: edge.source_id.clone(),
                    to: edge.target_id.clone(),
                    kind: format!("{:?}", edge.channel_kind),
                    points: vec![[from.x, from.y], [to.x, to.y]],
                })
            })
            .collect();

        let groups = layout
            .groups
            .iter()
            .map(|group| GroupDump {
                id: group.id.clone(),
                members: group.members.clone(),
                x: group.bounds.x,
                y: group.bounds.y,
                width: group.bounds.width,
                height: group.bounds.height,
            })
            .collect();

        LayoutDump {
            mode: format!("{:?}", layout.mode),
            width: layout.viewport.width,
            height: layout.viewport.height,
            scale_factor: layout.metrics.scale_factor,
            node_radius: layout.metrics.node_radius,
            min_node_distance: layout.metrics.min_node_distance,
            regions,
            nodes,
            edges,
            groups,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, topology: &Topology) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, topology);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::{SeededRandom, Viewport, compute_layout};

    #[test]
    fn dump_lists_nodes_in_dataset_order() {
        let topology = Topology::builtin().unwrap();
        let mut rng = SeededRandom::new(5);
        let layout = compute_layout(&topology, Viewport::new(1200.0, 800.0), &LayoutConfig::default(), &mut rng);
        let dump = LayoutDump::from_layout(&layout, &topology);
        assert_eq!(dump.mode, "SideBySide");
        assert_eq!(dump.nodes.len(), 10);
        assert_eq!(dump.nodes[0].id, "bastion");
        assert_eq!(dump.edges.len(), 17);
        assert_eq!(dump.regions.len(), 2);

        let json: serde_json::Value = serde_json::from_str(&dump.to_json().unwrap()).unwrap();
        assert_eq!(json["nodes"][0]["region"], "public");
        assert_eq!(json["groups"][2]["id"], "sg-private");
    }
}
