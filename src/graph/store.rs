use async_trait::async_trait;
use anyhow::Result;
use tokio::sync::RwLock;

use crate::graph::{Edge, FlowGraph, Node};

pub type NodeUpdater = Box<dyn FnOnce(Vec<Node>) -> Vec<Node> + Send>;
pub type EdgeUpdater = Box<dyn FnOnce(Vec<Edge>) -> Vec<Edge> + Send>;

/// Holder of the canvas. Every mutation is an updater that receives the
/// current collection and returns the next one, so rapid successive edits
/// compose without losing each other.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn snapshot(&self) -> Result<FlowGraph>;
    async fn update_nodes(&self, updater: NodeUpdater) -> Result<()>;
    async fn update_edges(&self, updater: EdgeUpdater) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    graph: RwLock<FlowGraph>,
}

impl InMemoryGraphStore {
    pub fn new(graph: FlowGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn snapshot(&self) -> Result<FlowGraph> {
        Ok(self.graph.read().await.clone())
    }

    async fn update_nodes(&self, updater: NodeUpdater) -> Result<()> {
        let mut graph = self.graph.write().await;
        let nodes = std::mem::take(&mut graph.nodes);
        graph.nodes = updater(nodes);
        Ok(())
    }

    async fn update_edges(&self, updater: EdgeUpdater) -> Result<()> {
        let mut graph = self.graph.write().await;
        let edges = std::mem::take(&mut graph.edges);
        graph.edges = updater(edges);
        Ok(())
    }
}
