use async_trait::async_trait;
use serde_json::{Value, json};
use crate::actions::catalog::ACTION_DEFINITIONS;
use crate::actions::resolve::to_upper_snake;
use crate::actions::{ActionHandler, Agent};
use anyhow::Result;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::info;

/// Logs the payload and reports success without touching the chain.
#[derive(Debug)]
pub struct DryRunAction {
    name: String,
    similes: Vec<String>,
}

#[async_trait]
impl ActionHandler for DryRunAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn similes(&self) -> &[String] {
        &self.similes
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        info!(action = %self.name, params = %params, "[DRY RUN]");
        Ok(json!({
            "status": "success",
            "message": format!("{} simulated", self.name),
            "data": params,
        }))
    }
}

/// Exposes every catalog action under the agent's UPPER_SNAKE naming.
#[derive(Debug)]
pub struct DryRunAgent {
    actions: Vec<Arc<dyn ActionHandler>>,
}

impl DryRunAgent {
    pub fn from_catalog() -> Self {
        let actions = ACTION_DEFINITIONS
            .iter()
            .map(|def| {
                Arc::new(DryRunAction {
                    name: to_upper_snake(def.action_type),
                    similes: vec![def.label.to_string()],
                }) as Arc<dyn ActionHandler>
            })
            .collect();
        Self { actions }
    }
}

impl Agent for DryRunAgent {
    fn actions(&self) -> &[Arc<dyn ActionHandler>] {
        &self.actions
    }
}
