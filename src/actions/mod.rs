use async_trait::async_trait;
use serde_json::Value;
use anyhow::Result;
use std::fmt::Debug;
use std::sync::Arc;

pub mod builtin;
pub mod catalog;
pub mod http;
pub mod params;
pub mod presets;
pub mod registry;
pub mod resolve;
pub mod schema;

use crate::actions::schema::ParamSchema;

/// One capability exposed by the DeFi agent.
#[async_trait]
pub trait ActionHandler: Send + Sync + Debug {
    fn name(&self) -> &str;
    /// Alternative names the agent accepts for this action.
    fn similes(&self) -> &[String] {
        &[]
    }
    fn schema(&self) -> Option<&ParamSchema> {
        None
    }
    async fn execute(&self, params: Value) -> Result<Value>;
}

/// The external agent: a list of actions plus the dispatch entrypoint.
/// Dispatch builds and submits transactions through the agent's own signer.
#[async_trait]
pub trait Agent: Send + Sync {
    fn actions(&self) -> &[Arc<dyn ActionHandler>];

    async fn execute(&self, action: &dyn ActionHandler, params: Value) -> Result<Value> {
        action.execute(params).await
    }
}
