use serde_json::{Map, Value};
use tracing::warn;

use crate::assets::FlowToken;
use crate::generator::FlowStep;
use crate::graph::folder::{FolderApp, FolderData};
use crate::graph::propagation::{Connection, add_edge, attach_payload};
use crate::graph::{
    CONFIG_KEY, FOLDER, FlowGraph, NFT_CARD, Node, NodeData, OUTPUT_HANDLE, Position, TOKEN_CARD,
    WALLET_BALANCE,
};
use crate::portfolio::Portfolio;

const GRID_ORIGIN: Position = Position { x: 450.0, y: 100.0 };
const GRID_X_SPACING: f64 = 130.0;
const GRID_Y_SPACING: f64 = 140.0;
const GRID_COLUMNS: usize = 5;

const STEP_ORIGIN: Position = Position { x: 200.0, y: 300.0 };
const STEP_X_SPACING: f64 = 300.0;

fn object(value: Value) -> NodeData {
    match value {
        Value::Object(map) => map,
        _ => NodeData::new(),
    }
}

/// Fluent construction of canvases. Connections are applied in order on
/// `build`, with the same payload propagation as interactive connects.
pub struct FlowGraphBuilder {
    pub nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Default for FlowGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn token_card(self, id: &str, token: &FlowToken, position: Position) -> Self {
        let data = object(serde_json::to_value(token).unwrap_or_default());
        self.node(Node::with_id(id, TOKEN_CARD, position).with_data(data))
    }

    pub fn wallet_balance(self, id: &str, solana: &str, position: Position) -> Self {
        let mut data = NodeData::new();
        data.insert("solana".to_string(), Value::String(solana.to_string()));
        self.node(Node::with_id(id, WALLET_BALANCE, position).with_data(data))
    }

    pub fn folder(self, id: &str, name: &str, apps: Vec<FolderApp>, position: Position) -> Self {
        let folder = FolderData {
            name: name.to_string(),
            apps,
        };
        let data = object(serde_json::to_value(folder).unwrap_or_default());
        self.node(Node::with_id(id, FOLDER, position).with_data(data))
    }

    pub fn action(self, id: &str, action_type: &str) -> ActionBuilder {
        ActionBuilder {
            graph_builder: self,
            id: id.to_string(),
            action_type: action_type.to_string(),
            position: Position::default(),
            config: Map::new(),
        }
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.connections.push(Connection::new(source, target));
        self
    }

    pub fn connect_output(mut self, source: &str, target: &str) -> Self {
        self.connections
            .push(Connection::from_handle(source, OUTPUT_HANDLE, target));
        self
    }

    pub fn build(self) -> FlowGraph {
        let mut nodes = self.nodes;
        let mut edges = Vec::new();
        for conn in &self.connections {
            edges = add_edge(edges, conn);
            nodes = attach_payload(nodes, &conn.source, &conn.target);
        }
        FlowGraph { nodes, edges }
    }
}

pub struct ActionBuilder {
    graph_builder: FlowGraphBuilder,
    id: String,
    action_type: String,
    position: Position,
    config: Map<String, Value>,
}

impl ActionBuilder {
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    pub fn build(mut self) -> FlowGraphBuilder {
        let mut node = Node::with_id(&self.id, &self.action_type, self.position);
        if !self.config.is_empty() {
            node.data
                .insert(CONFIG_KEY.to_string(), Value::Object(self.config));
        }
        self.graph_builder.nodes.push(node);
        self.graph_builder
    }
}

/// Asset nodes for a freshly loaded portfolio: the wallet balance first, then
/// token cards, then NFT cards, five per row.
pub fn portfolio_nodes(portfolio: &Portfolio) -> Vec<Node> {
    let mut entries: Vec<(&str, NodeData)> = Vec::new();
    entries.push((
        WALLET_BALANCE,
        object(serde_json::to_value(&portfolio.native_balance).unwrap_or_default()),
    ));
    for token in &portfolio.tokens {
        entries.push((TOKEN_CARD, object(serde_json::to_value(token).unwrap_or_default())));
    }
    for nft in &portfolio.nfts {
        entries.push((NFT_CARD, object(serde_json::to_value(nft).unwrap_or_default())));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (kind, data))| {
            let row = (i / GRID_COLUMNS) as f64;
            let col = (i % GRID_COLUMNS) as f64;
            let position = GRID_ORIGIN.offset(col * GRID_X_SPACING, row * GRID_Y_SPACING);
            Node::new(kind, position).with_data(data)
        })
        .collect()
}

/// Finds the asset node a step refers to, by node id, token symbol or mint.
fn find_asset_node<'a>(nodes: &'a [Node], reference: &str) -> Option<&'a Node> {
    nodes.iter().filter(|n| n.is_asset_bearing()).find(|n| {
        if n.id == reference {
            return true;
        }
        match n.kind.as_str() {
            TOKEN_CARD => ["symbol", "mint"].iter().any(|key| {
                n.data
                    .get(*key)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.eq_ignore_ascii_case(reference))
            }),
            WALLET_BALANCE => reference.eq_ignore_ascii_case("SOL"),
            _ => false,
        }
    })
}

/// Appends one action node per generated step, chained left to right.
pub fn materialize_steps(graph: FlowGraph, steps: &[FlowStep]) -> FlowGraph {
    let FlowGraph { mut nodes, mut edges } = graph;
    let mut previous: Option<String> = None;

    for (i, step) in steps.iter().enumerate() {
        let position = STEP_ORIGIN.offset(i as f64 * STEP_X_SPACING, 0.0);
        let mut node = Node::new(&step.action, position);
        node.data
            .insert(CONFIG_KEY.to_string(), Value::Object(step.config.clone()));
        node.data.insert(
            "description".to_string(),
            Value::String(step.description.clone()),
        );
        let node_id = node.id.clone();
        nodes.push(node);

        if let Some(reference) = &step.asset_source {
            match find_asset_node(&nodes, reference).map(|n| n.id.clone()) {
                Some(source) => {
                    edges = add_edge(edges, &Connection::new(&source, &node_id));
                    nodes = attach_payload(nodes, &source, &node_id);
                }
                None => warn!(asset = %reference, step = i, "Asset source not found on canvas"),
            }
        }

        if let Some(prev) = previous.replace(node_id.clone()) {
            edges = add_edge(edges, &Connection::from_handle(&prev, OUTPUT_HANDLE, &node_id));
        }
    }

    FlowGraph { nodes, edges }
}
