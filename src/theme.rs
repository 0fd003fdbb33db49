use crate::ir::{Access, ChannelKind, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub mono_font_family: String,
    pub background: String,
    pub vpc_stroke: String,
    pub vpc_label_color: String,
    pub public_fill: String,
    pub public_stroke: String,
    pub private_fill: String,
    pub private_stroke: String,
    pub region_label_color: String,
    pub region_cidr_color: String,
    pub node_stroke: String,
    pub node_text_color: String,
    pub label_color: String,
    pub port_label_color: String,
    pub address_label_color: String,
    pub label_halo: String,
    pub api_edge_color: String,
    pub ssh_edge_color: String,
    pub api_edge_dasharray: String,
    pub ssh_edge_dasharray: String,
    pub group_fallback_color: String,
    pub gateway_color: String,
    pub frontend_color: String,
    pub coordinator_color: String,
    pub compute_color: String,
    pub light_color: String,
    pub particle_color: String,
}

impl Theme {
    /// Light palette of the FrizzlesRubric diagram.
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, sans-serif".to_string(),
            mono_font_family: "Consolas, monospace".to_string(),
            background: "#fafafa".to_string(),
            vpc_stroke: "#dddddd".to_string(),
            vpc_label_color: "#666666".to_string(),
            public_fill: "#e3f2fd".to_string(),
            public_stroke: "#90caf9".to_string(),
            private_fill: "#e8f5e8".to_string(),
            private_stroke: "#81c784".to_string(),
            region_label_color: "#555555".to_string(),
            region_cidr_color: "#777777".to_string(),
            node_stroke: "#ffffff".to_string(),
            node_text_color: "#ffffff".to_string(),
            label_color: "#333333".to_string(),
            port_label_color: "#666666".to_string(),
            address_label_color: "#888888".to_string(),
            label_halo: "rgba(255,255,255,0.8)".to_string(),
            api_edge_color: "#7b1fa2".to_string(),
            ssh_edge_color: "#f57c00".to_string(),
            api_edge_dasharray: "5,5".to_string(),
            ssh_edge_dasharray: "3,3".to_string(),
            group_fallback_color: "#9e9e9e".to_string(),
            gateway_color: "#f57c00".to_string(),
            frontend_color: "#2196f3".to_string(),
            coordinator_color: "#7b1fa2".to_string(),
            compute_color: "#4caf50".to_string(),
            light_color: "#1976d2".to_string(),
            particle_color: "#ab47bc".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#121821".to_string(),
            vpc_stroke: "#3a4656".to_string(),
            vpc_label_color: "#9fb0c6".to_string(),
            public_fill: "#15263a".to_string(),
            public_stroke: "#3d6a99".to_string(),
            private_fill: "#162a1d".to_string(),
            private_stroke: "#3f7a4c".to_string(),
            region_label_color: "#c3cfdd".to_string(),
            region_cidr_color: "#8c9bb0".to_string(),
            node_stroke: "#0b1016".to_string(),
            label_color: "#e6edf5".to_string(),
            port_label_color: "#b5c2d2".to_string(),
            address_label_color: "#8c9bb0".to_string(),
            label_halo: "rgba(18,24,33,0.8)".to_string(),
            ..Self::classic()
        }
    }

    pub fn edge_color(&self, kind: ChannelKind) -> &str {
        match kind {
            ChannelKind::Api => &self.api_edge_color,
            ChannelKind::Ssh => &self.ssh_edge_color,
        }
    }

    pub fn edge_dasharray(&self, kind: ChannelKind) -> &str {
        match kind {
            ChannelKind::Api => &self.api_edge_dasharray,
            ChannelKind::Ssh => &self.ssh_edge_dasharray,
        }
    }

    pub fn region_colors(&self, access: Access) -> (&str, &str) {
        match access {
            Access::Public => (&self.public_fill, &self.public_stroke),
            Access::Private => (&self.private_fill, &self.private_stroke),
        }
    }

    /// Fill used when a node record carries no color of its own.
    pub fn role_color(&self, role: Role) -> &str {
        match role {
            Role::Gateway => &self.gateway_color,
            Role::Frontend => &self.frontend_color,
            Role::Coordinator => &self.coordinator_color,
            Role::ComputeEvaluator => &self.compute_color,
            Role::LightEvaluator => &self.light_color,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
