//! Edge-driven asset propagation: connecting an asset node to another node
//! snapshots its payload into the target's data map, keyed by the source id.
//! Disconnects and deletions remove exactly those entries again.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::assets::{
    FlowToken, build_asset_payload, extract_assets_from_node_data, flatten_folder, flatten_tokens,
    is_asset_payload, native_token, token_from_card, wallet_amount,
};
use crate::graph::folder::FolderData;
use crate::graph::store::GraphStore;
use crate::graph::{CONFIG_KEY, Edge, FOLDER, FlowGraph, Node, TOKEN_CARD, WALLET_BALANCE};

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
}

impl Connection {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
        }
    }

    pub fn from_handle(source: &str, handle: &str, target: &str) -> Self {
        Self {
            source_handle: Some(handle.to_string()),
            ..Self::new(source, target)
        }
    }
}

pub fn add_edge(mut edges: Vec<Edge>, connection: &Connection) -> Vec<Edge> {
    if connection.source == connection.target {
        return edges;
    }
    let edge = Edge::from_handle(
        &connection.source,
        connection.source_handle.as_deref(),
        &connection.target,
    );
    if !edges.iter().any(|e| e.id == edge.id) {
        edges.push(edge);
    }
    edges
}

/// Copies the source node's current payload into `target.data[source]`.
/// Sources that are not asset-bearing leave the target untouched.
pub fn attach_payload(mut nodes: Vec<Node>, source_id: &str, target_id: &str) -> Vec<Node> {
    let Some(payload) = nodes
        .iter()
        .find(|n| n.id == source_id)
        .and_then(build_asset_payload)
    else {
        return nodes;
    };
    if let Some(target) = nodes.iter_mut().find(|n| n.id == target_id) {
        target.data.insert(source_id.to_string(), payload.to_value());
    }
    nodes
}

pub fn detach_payload(mut nodes: Vec<Node>, source_id: &str, target_id: &str) -> Vec<Node> {
    if let Some(target) = nodes.iter_mut().find(|n| n.id == target_id) {
        target.data.shift_remove(source_id);
    }
    nodes
}

/// Drops asset payload entries whose source node no longer exists.
pub fn prune_dangling(mut nodes: Vec<Node>) -> Vec<Node> {
    let ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    for node in &mut nodes {
        node.data
            .retain(|key, value| !is_asset_payload(value) || ids.contains(key));
    }
    nodes
}

pub fn remove_nodes(nodes: Vec<Node>, removed: &HashSet<String>) -> Vec<Node> {
    let remaining = nodes.into_iter().filter(|n| !removed.contains(&n.id)).collect();
    prune_dangling(remaining)
}

pub fn remove_edges_touching(edges: Vec<Edge>, removed: &HashSet<String>) -> Vec<Edge> {
    edges
        .into_iter()
        .filter(|e| !removed.contains(&e.source) && !removed.contains(&e.target))
        .collect()
}

pub async fn connect(store: &dyn GraphStore, connection: Connection) -> Result<()> {
    let edge_conn = connection.clone();
    store
        .update_edges(Box::new(move |edges| add_edge(edges, &edge_conn)))
        .await?;
    if connection.source == connection.target {
        return Ok(());
    }
    debug!(source = %connection.source, target = %connection.target, "Connected");
    store
        .update_nodes(Box::new(move |nodes| {
            attach_payload(nodes, &connection.source, &connection.target)
        }))
        .await
}

pub async fn disconnect(store: &dyn GraphStore, edge_id: &str) -> Result<()> {
    let graph = store.snapshot().await?;
    let Some(edge) = graph.edges.iter().find(|e| e.id == edge_id).cloned() else {
        return Ok(());
    };
    let id = edge_id.to_string();
    store
        .update_edges(Box::new(move |edges: Vec<Edge>| {
            edges.into_iter().filter(|e| e.id != id).collect()
        }))
        .await?;
    store
        .update_nodes(Box::new(move |nodes| {
            detach_payload(nodes, &edge.source, &edge.target)
        }))
        .await
}

/// Explicit deletion of any single node, asset nodes included.
pub async fn delete_node(store: &dyn GraphStore, node_id: &str) -> Result<()> {
    let removed: HashSet<String> = HashSet::from([node_id.to_string()]);
    let for_edges = removed.clone();
    store
        .update_edges(Box::new(move |edges| remove_edges_touching(edges, &for_edges)))
        .await?;
    store
        .update_nodes(Box::new(move |nodes| remove_nodes(nodes, &removed)))
        .await
}

/// Bulk deletion of the current selection. Asset nodes survive regardless of
/// selection. Returns the ids that were removed.
pub async fn delete_selected(store: &dyn GraphStore) -> Result<Vec<String>> {
    let graph = store.snapshot().await?;
    let removed: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| n.selected && !n.is_asset_bearing())
        .map(|n| n.id.clone())
        .collect();

    let set: HashSet<String> = removed.iter().cloned().collect();
    let for_edges = set.clone();
    store
        .update_edges(Box::new(move |edges| remove_edges_touching(edges, &for_edges)))
        .await?;
    store
        .update_nodes(Box::new(move |nodes| remove_nodes(nodes, &set)))
        .await?;
    info!(count = removed.len(), "Deleted selected nodes");
    Ok(removed)
}

pub async fn select_all(store: &dyn GraphStore) -> Result<()> {
    store
        .update_nodes(Box::new(|nodes: Vec<Node>| {
            nodes
                .into_iter()
                .map(|mut n| {
                    n.selected = true;
                    n
                })
                .collect()
        }))
        .await
}

pub async fn set_node_config(
    store: &dyn GraphStore,
    node_id: &str,
    config: Map<String, Value>,
) -> Result<()> {
    let id = node_id.to_string();
    store
        .update_nodes(Box::new(move |nodes: Vec<Node>| {
            nodes
                .into_iter()
                .map(|mut n| {
                    if n.id == id {
                        n.data.insert(CONFIG_KEY.to_string(), Value::Object(config.clone()));
                    }
                    n
                })
                .collect()
        }))
        .await
}

/// Tokens derived fresh from the current state of each upstream node.
pub fn edge_derived_tokens(graph: &FlowGraph, node_id: &str) -> Vec<FlowToken> {
    let mut tokens = Vec::new();
    for edge in graph.incoming(node_id) {
        let Some(source) = graph.node(&edge.source) else {
            continue;
        };
        match source.kind.as_str() {
            TOKEN_CARD => tokens.extend(token_from_card(&source.data)),
            FOLDER => tokens.extend(flatten_folder(&FolderData::from_node_data(&source.data)).0),
            WALLET_BALANCE => tokens.push(native_token(wallet_amount(&source.data))),
            _ => {}
        }
    }
    tokens
}

/// Tokens snapshotted into the node's own data map.
pub fn direct_tokens(node: &Node) -> Vec<FlowToken> {
    flatten_tokens(&extract_assets_from_node_data(&node.data))
}

/// Input tokens for an action node. Edge-derived tokens win outright; the
/// node's own snapshots are only a fallback.
pub fn effective_tokens(graph: &FlowGraph, node_id: &str) -> Vec<FlowToken> {
    let from_edges = edge_derived_tokens(graph, node_id);
    if !from_edges.is_empty() {
        return from_edges;
    }
    graph.node(node_id).map(direct_tokens).unwrap_or_default()
}
