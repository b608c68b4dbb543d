use serde::Serialize;

use crate::runtime::outcome::ResultStatus;

/// One result node appended by a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    pub node_id: String,
    pub label: String,
    pub status: ResultStatus,
    pub result_node_id: String,
    pub message: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub nodes: Vec<NodeReport>,
    /// Set when the stop handle ended the run before every node started.
    pub stopped: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.status == ResultStatus::Success)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.nodes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        !self.stopped && self.failed() == 0
    }
}
