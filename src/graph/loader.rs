use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

use crate::graph::FlowGraph;

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Loads a canvas from a `.json` file, or YAML for any other extension.
pub fn load_graph(path: impl AsRef<Path>) -> Result<FlowGraph> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read flow file from {}", path.display()))?;

    let graph: FlowGraph = if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize JSON flow from {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize YAML flow from {}", path.display()))?
    };

    Ok(graph)
}

pub fn save_graph(path: impl AsRef<Path>, graph: &FlowGraph) -> Result<()> {
    let path = path.as_ref();
    let content = if is_json(path) {
        serde_json::to_string_pretty(graph)?
    } else {
        serde_yaml::to_string(graph)?
    };
    fs::write(path, content)
        .with_context(|| format!("Failed to write flow file to {}", path.display()))?;
    Ok(())
}
