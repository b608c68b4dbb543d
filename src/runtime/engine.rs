use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::actions::catalog::{get_action_label, is_action_type, is_token_based};
use crate::actions::registry::{ActionRegistry, RegistryConfig};
use crate::assets::{FlowToken, SOL_MINT};
use crate::error::{FlowError, Result};
use crate::graph::propagation::effective_tokens;
use crate::graph::store::GraphStore;
use crate::graph::{ACTION_RESULT, Edge, EdgeStyle, Node, create_node_id};
use crate::runtime::context::ExecutionContext;
use crate::runtime::outcome::ActionOutcome;
use crate::runtime::report::{NodeReport, RunReport};

pub const SUCCESS_STROKE: &str = "#92FE9D";
pub const FAILURE_STROKE: &str = "#FF6B6B";

/// Which action nodes a full-canvas run picks up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Only action nodes with at least one edge.
    #[default]
    Connected,
    All,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub selection: SelectionPolicy,
    /// Horizontal distance from an action node to its result nodes.
    pub result_offset_x: f64,
    /// Vertical step between result nodes of successive token iterations.
    pub iteration_offset_y: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::Connected,
            result_offset_x: 260.0,
            iteration_offset_y: 120.0,
        }
    }
}

/// Runs the action nodes of a canvas left to right, one at a time, and
/// appends a result node for every dispatch.
pub struct Engine {
    flows: DashMap<String, Arc<dyn GraphStore>>,
    registry: ActionRegistry,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), RegistryConfig::default())
    }

    pub fn with_config(config: EngineConfig, registry: RegistryConfig) -> Self {
        Self {
            flows: DashMap::new(),
            registry: ActionRegistry::new(registry),
            config,
        }
    }

    pub fn register_flow(&self, flow_id: &str, store: Arc<dyn GraphStore>) {
        self.flows.insert(flow_id.to_string(), store);
    }

    pub fn flow(&self, flow_id: &str) -> Option<Arc<dyn GraphStore>> {
        self.flows.get(flow_id).map(|entry| entry.value().clone())
    }

    pub async fn execute_flow(&self, flow_id: &str, ctx: &ExecutionContext) -> Result<RunReport> {
        let store = self
            .flow(flow_id)
            .ok_or_else(|| FlowError::FlowNotFound(flow_id.to_string()))?;
        info!(flow_id, "Executing flow");
        self.execute(store.as_ref(), ctx).await
    }

    /// One pass over the eligible action nodes. Only a missing wallet or an
    /// empty selection abort the run; every per-node failure becomes a result
    /// node instead.
    pub async fn execute(&self, store: &dyn GraphStore, ctx: &ExecutionContext) -> Result<RunReport> {
        if !ctx.signer.is_connected() {
            warn!("Execution requested without a connected wallet");
            return Err(FlowError::WalletNotConnected);
        }

        let graph = store.snapshot().await?;
        let mut order: Vec<(String, f64)> = graph
            .nodes
            .iter()
            .filter(|n| is_action_type(&n.kind))
            .filter(|n| self.config.selection == SelectionPolicy::All || graph.is_connected(&n.id))
            .map(|n| (n.id.clone(), n.position.x))
            .collect();

        if order.is_empty() {
            return Err(FlowError::NoActionNodes);
        }
        // Stable: equal x keeps canvas order.
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        info!(
            nodes = order.len(),
            wallet = ctx.signer.public_key().unwrap_or_default(),
            "Starting flow run"
        );

        let mut report = RunReport::default();
        for (node_id, _) in &order {
            if ctx.stop.is_stopped() {
                info!(node_id = %node_id, "Run stopped before node");
                report.stopped = true;
                break;
            }

            // Earlier nodes may have changed the canvas.
            let graph = store.snapshot().await?;
            let Some(node) = graph.node(node_id).cloned() else {
                warn!(node_id = %node_id, "Node removed during run, skipping");
                continue;
            };
            let tokens = effective_tokens(&graph, node_id);
            self.execute_node(store, ctx, &node, tokens, &mut report).await?;
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            stopped = report.stopped,
            "Flow run finished"
        );
        Ok(report)
    }

    async fn execute_node(
        &self,
        store: &dyn GraphStore,
        ctx: &ExecutionContext,
        node: &Node,
        tokens: Vec<FlowToken>,
        report: &mut RunReport,
    ) -> Result<()> {
        let action_type = node.kind.as_str();
        let label = get_action_label(action_type);
        let config = node.config();
        info!(node_id = %node.id, action = action_type, tokens = tokens.len(), "Executing node");

        if !is_token_based(action_type) || config.contains_key("mint") {
            let outcome = self.dispatch(ctx, action_type, label, &tokens, &config).await;
            return self.append_result(store, node, label, outcome, 0, report).await;
        }

        let tokens = match (tokens.is_empty(), &ctx.portfolio) {
            (false, _) => tokens,
            (true, Some(portfolio)) => {
                info!(node_id = %node.id, count = portfolio.tokens.len(), "No connected tokens, iterating portfolio");
                portfolio.flow_tokens()
            }
            (true, None) => Vec::new(),
        };

        if tokens.is_empty() {
            let err = FlowError::NoTokensConnected(label.to_string());
            warn!(node_id = %node.id, action = action_type, "{}", err);
            let outcome = ActionOutcome::failure(err.to_string());
            return self.append_result(store, node, label, outcome, 0, report).await;
        }

        for (index, token) in tokens.iter().enumerate() {
            let mut iteration_config = config.clone();
            iteration_config.insert("mint".to_string(), Value::String(token.mint.clone()));
            let iteration_label = format!("{} ({})", label, token_tag(token));

            let outcome = self
                .dispatch(ctx, action_type, &iteration_label, std::slice::from_ref(token), &iteration_config)
                .await;
            self.append_result(store, node, &iteration_label, outcome, index, report)
                .await?;
        }
        Ok(())
    }

    async fn dispatch(
        &self,
        ctx: &ExecutionContext,
        action_type: &str,
        label: &str,
        tokens: &[FlowToken],
        config: &Map<String, Value>,
    ) -> ActionOutcome {
        match self
            .registry
            .run_action(ctx.agent.as_ref(), action_type, tokens, config)
            .await
        {
            Ok(result) => ActionOutcome::success(label, &result),
            Err(e) => {
                error!(action = action_type, label, error = %e, "Action failed");
                ActionOutcome::failure(e.to_string())
            }
        }
    }

    async fn append_result(
        &self,
        store: &dyn GraphStore,
        source: &Node,
        label: &str,
        outcome: ActionOutcome,
        index: usize,
        report: &mut RunReport,
    ) -> Result<()> {
        let result_id = create_node_id();
        let position = source.position.offset(
            self.config.result_offset_x,
            self.config.iteration_offset_y * index as f64,
        );
        let timestamp = Utc::now().to_rfc3339();
        let result_node = Node::with_id(&result_id, ACTION_RESULT, position)
            .with_data(outcome.to_node_data(label, &timestamp));
        let edge = result_edge(&source.id, &result_id, outcome.is_success());

        store
            .update_nodes(Box::new(move |mut nodes: Vec<Node>| {
                nodes.push(result_node);
                nodes
            }))
            .await?;
        store
            .update_edges(Box::new(move |mut edges: Vec<Edge>| {
                edges.push(edge);
                edges
            }))
            .await?;

        report.nodes.push(NodeReport {
            node_id: source.id.clone(),
            label: label.to_string(),
            status: outcome.status,
            result_node_id: result_id,
            message: outcome.message,
            signature: outcome.signature,
        });
        Ok(())
    }
}

fn result_edge(source: &str, result_id: &str, success: bool) -> Edge {
    let mut edge = Edge::new(source, result_id);
    edge.animated = success;
    edge.style = Some(EdgeStyle {
        stroke: if success { SUCCESS_STROKE } else { FAILURE_STROKE }.to_string(),
        stroke_width: 2,
    });
    edge
}

/// Symbol when known, otherwise the mint shortened to `abcd...wxyz`.
fn token_tag(token: &FlowToken) -> String {
    if !token.symbol.is_empty() {
        return token.symbol.clone();
    }
    if token.mint == SOL_MINT {
        return "SOL".to_string();
    }
    let chars: Vec<char> = token.mint.chars().collect();
    if chars.len() <= 8 {
        return token.mint.clone();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
