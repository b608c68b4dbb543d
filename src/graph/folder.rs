use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::graph::{FOLDER, NFT_CARD, Node, NodeData, Position, TOKEN_CARD, WALLET_BALANCE};

/// Dropping an asset node closer than this (on both axes) groups it.
pub const OVERLAP_THRESHOLD: f64 = 45.0;
pub const DEFAULT_FOLDER_NAME: &str = "Folder";
pub const NEW_FOLDER_NAME: &str = "Assets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderApp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl FolderApp {
    fn from_node(node: &Node) -> Self {
        Self {
            id: Some(node.id.clone()),
            kind: node.kind.clone(),
            data: Value::Object(node.data.clone()),
        }
    }
}

fn default_folder_name() -> String {
    DEFAULT_FOLDER_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderData {
    #[serde(default = "default_folder_name")]
    pub name: String,
    #[serde(default)]
    pub apps: Vec<FolderApp>,
}

impl FolderData {
    /// Lenient read: a folder with unreadable data is an empty folder.
    pub fn from_node_data(data: &NodeData) -> Self {
        serde_json::from_value(Value::Object(data.clone())).unwrap_or_else(|_| FolderData {
            name: default_folder_name(),
            apps: Vec::new(),
        })
    }

    fn into_node_data(self) -> NodeData {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => NodeData::new(),
        }
    }
}

fn is_groupable(kind: &str) -> bool {
    matches!(kind, TOKEN_CARD | NFT_CARD | WALLET_BALANCE)
}

fn overlaps(a: Position, b: Position) -> bool {
    (a.x - b.x).abs() < OVERLAP_THRESHOLD && (a.y - b.y).abs() < OVERLAP_THRESHOLD
}

/// Groups the node `dropped_id` with whatever asset node or folder it was
/// dropped on. Returns the nodes unchanged when nothing overlaps.
pub fn group_into_folder(nodes: Vec<Node>, dropped_id: &str) -> Vec<Node> {
    let Some(dropped) = nodes.iter().find(|n| n.id == dropped_id).cloned() else {
        return nodes;
    };
    if !is_groupable(&dropped.kind) {
        return nodes;
    }

    let Some(target) = nodes
        .iter()
        .find(|n| {
            n.id != dropped.id
                && (is_groupable(&n.kind) || n.kind == FOLDER)
                && overlaps(n.position, dropped.position)
        })
        .cloned()
    else {
        return nodes;
    };

    if target.kind == FOLDER {
        return nodes
            .into_iter()
            .filter(|n| n.id != dropped.id)
            .map(|mut n| {
                if n.id == target.id {
                    let mut folder = FolderData::from_node_data(&n.data);
                    folder.apps.push(FolderApp::from_node(&dropped));
                    n.data = folder.into_node_data();
                }
                n
            })
            .collect();
    }

    let folder = Node::new(FOLDER, target.position).with_data(
        FolderData {
            name: NEW_FOLDER_NAME.to_string(),
            apps: vec![FolderApp::from_node(&target), FolderApp::from_node(&dropped)],
        }
        .into_node_data(),
    );
    info!(folder_id = %folder.id, "Folder created");

    let mut next: Vec<Node> = nodes
        .into_iter()
        .filter(|n| n.id != dropped.id && n.id != target.id)
        .collect();
    next.push(folder);
    next
}

/// Takes app `index` out of the folder and puts it back on the canvas next to
/// it. A folder left without apps is removed.
pub fn remove_from_folder(nodes: Vec<Node>, folder_id: &str, index: usize) -> Vec<Node> {
    let mut restored = None;
    let mut emptied = false;
    let mut next: Vec<Node> = nodes
        .into_iter()
        .map(|mut n| {
            if n.id == folder_id && n.kind == FOLDER {
                let mut folder = FolderData::from_node_data(&n.data);
                if index < folder.apps.len() {
                    let app = folder.apps.remove(index);
                    let id = app.id.clone().unwrap_or_else(crate::graph::create_node_id);
                    let data = app.data.as_object().cloned().unwrap_or_default();
                    restored = Some(
                        Node::with_id(&id, &app.kind, n.position.offset(150.0, 0.0)).with_data(data),
                    );
                    emptied = folder.apps.is_empty();
                    n.data = folder.into_node_data();
                }
            }
            n
        })
        .collect();
    if emptied {
        next.retain(|n| n.id != folder_id);
    }
    next.extend(restored);
    next
}
