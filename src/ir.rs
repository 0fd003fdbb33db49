use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

const BUILTIN_TOPOLOGY: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/topology.json"));

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to read topology: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid topology JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("topology has no nodes")]
    Empty,
}

/// Whether a subnet faces the internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[serde(alias = "bastion")]
    Gateway,
    #[serde(alias = "webapp")]
    Frontend,
    #[serde(alias = "orchestrator")]
    Coordinator,
    #[serde(alias = "ml-expert")]
    ComputeEvaluator,
    #[serde(alias = "non-ml-expert")]
    LightEvaluator,
}

impl Role {
    /// Short glyph drawn inside the node circle.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Role::Gateway => "SSH",
            Role::Frontend => "WEB",
            Role::Coordinator => "API",
            Role::ComputeEvaluator => "ML",
            Role::LightEvaluator => "SVC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Api,
    Ssh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cidr: String,
    pub access: Access,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub id: String,
    pub cidr: String,
    pub regions: Vec<Region>,
}

/// One infrastructure instance. The `details` map carries free-form
/// attributes that only the detail panel reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub region: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub channel_kind: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Connection {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// The endpoint opposite `node_id`, if the edge touches it.
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source_id == node_id {
            Some(&self.target_id)
        } else if self.target_id == node_id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Single(u16),
    Range(String),
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSpec::Single(port) => write!(f, "{port}"),
            PortSpec::Range(range) => f.write_str(range),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortSpec>,
    pub peer: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub inbound_rules: Vec<Rule>,
    #[serde(default)]
    pub outbound_rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub network: Network,
    pub nodes: Vec<Instance>,
    #[serde(default)]
    pub edges: Vec<Connection>,
    #[serde(default)]
    pub groups: Vec<SecurityGroup>,
}

impl Topology {
    /// The compiled-in FrizzlesRubric deployment.
    pub fn builtin() -> Result<Self, TopologyError> {
        Self::from_json_str(BUILTIN_TOPOLOGY)
    }

    pub fn from_json_str(input: &str) -> Result<Self, TopologyError> {
        let mut topology: Topology = serde_json::from_str(input)?;
        topology.normalize();
        topology.validate()?;
        Ok(topology)
    }

    pub fn from_json5_str(input: &str) -> Result<Self, TopologyError> {
        let mut topology: Topology = json5::from_str(input)?;
        topology.normalize();
        topology.validate()?;
        Ok(topology)
    }

    pub fn load(path: &Path) -> Result<Self, TopologyError> {
        let contents = std::fs::read_to_string(path)?;
        let is_json5 = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json5"))
            .unwrap_or(false);
        if is_json5 {
            Self::from_json5_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    fn normalize(&mut self) {
        for edge in &mut self.edges {
            if edge.id.is_empty() {
                edge.id = format!("{}-{}", edge.source_id, edge.target_id);
            }
        }
    }

    /// Node ids must be unique; dangling references are only reported.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.nodes.is_empty() {
            return Err(TopologyError::Empty);
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(TopologyError::DuplicateNode(node.id.clone()));
            }
        }
        for edge in &self.edges {
            for end in [&edge.source_id, &edge.target_id] {
                if !seen.contains(end.as_str()) {
                    tracing::warn!(edge = %edge.id, node = %end, "edge references unknown node");
                }
            }
        }
        for group in &self.groups {
            for member in &group.member_ids {
                if !seen.contains(member.as_str()) {
                    tracing::warn!(group = %group.id, node = %member, "group references unknown node");
                }
            }
        }
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Instance> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.network.regions.iter().find(|region| region.id == id)
    }

    /// Access class of the region a node lives in. Unknown regions fall
    /// back to private.
    pub fn access_of(&self, node: &Instance) -> Access {
        self.region(&node.region)
            .map(|region| region.access)
            .unwrap_or(Access::Private)
    }

    /// First region of the given access class, used for region captions.
    pub fn primary_region(&self, access: Access) -> Option<&Region> {
        self.network.regions.iter().find(|region| region.access == access)
    }

    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(node_id))
    }

    pub fn edge(&self, id: &str) -> Option<&Connection> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Drops the named nodes, every edge touching them, and their group
    /// memberships.
    pub fn without_nodes<S: AsRef<str>>(&self, ids: &[S]) -> Topology {
        let hidden: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        let mut out = self.clone();
        out.nodes.retain(|node| !hidden.contains(node.id.as_str()));
        out.edges.retain(|edge| {
            !hidden.contains(edge.source_id.as_str()) && !hidden.contains(edge.target_id.as_str())
        });
        for group in &mut out.groups {
            group.member_ids.retain(|id| !hidden.contains(id.as_str()));
        }
        out.groups.retain(|group| !group.member_ids.is_empty());
        out
    }
}
