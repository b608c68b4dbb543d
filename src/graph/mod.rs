pub mod builder;
pub mod folder;
pub mod loader;
pub mod propagation;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Per-node data. For action nodes it maps upstream node ids to the asset
/// payload they sent, plus the reserved `config` entry.
pub type NodeData = Map<String, Value>;

pub const TOKEN_CARD: &str = "tokenCard";
pub const NFT_CARD: &str = "nftCard";
pub const WALLET_BALANCE: &str = "walletBalance";
pub const FOLDER: &str = "folder";
pub const ACTION_RESULT: &str = "actionResult";

pub const CONFIG_KEY: &str = "config";
/// Handle on action nodes whose edges only order execution.
pub const OUTPUT_HANDLE: &str = "output";

pub fn is_asset_node_type(kind: &str) -> bool {
    matches!(kind, TOKEN_CARD | NFT_CARD | WALLET_BALANCE | FOLDER)
}

pub fn create_node_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Node {
    pub fn new(kind: &str, position: Position) -> Self {
        Self::with_id(&create_node_id(), kind, position)
    }

    pub fn with_id(id: &str, kind: &str, position: Position) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            position,
            data: NodeData::new(),
            selected: false,
        }
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    pub fn is_asset_bearing(&self) -> bool {
        is_asset_node_type(&self.kind)
    }

    /// Action parameters stored under the reserved `config` key.
    pub fn config(&self) -> Map<String, Value> {
        self.data
            .get(CONFIG_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

pub fn edge_id(source: &str, source_handle: Option<&str>, target: &str) -> String {
    match source_handle {
        Some(handle) => format!("{source}:{handle}-{target}"),
        None => format!("{source}-{target}"),
    }
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self::from_handle(source, None, target)
    }

    pub fn from_handle(source: &str, source_handle: Option<&str>, target: &str) -> Self {
        Self {
            id: edge_id(source, source_handle, target),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.map(str::to_string),
            animated: false,
            style: None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    pub fn is_connected(&self, node_id: &str) -> bool {
        self.edges.iter().any(|e| e.touches(node_id))
    }
}
