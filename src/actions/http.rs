use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use crate::actions::schema::ParamSchema;
use crate::actions::{ActionHandler, Agent};
use anyhow::{Result, anyhow};
use std::fmt::Debug;
use std::sync::Arc;
use reqwest::Client;
use tracing::info;

/// Action descriptor as listed by the agent bridge.
#[derive(Debug, Clone, Deserialize)]
struct RemoteActionInfo {
    name: String,
    #[serde(default)]
    similes: Vec<String>,
    #[serde(default)]
    schema: Option<ParamSchema>,
}

#[derive(Debug)]
struct Bridge {
    client: Client,
    base_url: String,
    wallet: String,
}

/// An action hosted by the HTTP agent bridge.
#[derive(Debug)]
pub struct RemoteAction {
    name: String,
    similes: Vec<String>,
    schema: Option<ParamSchema>,
    bridge: Arc<Bridge>,
}

#[async_trait]
impl ActionHandler for RemoteAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn similes(&self) -> &[String] {
        &self.similes
    }

    fn schema(&self) -> Option<&ParamSchema> {
        self.schema.as_ref()
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let url = format!("{}/actions/{}", self.bridge.base_url, self.name);
        let response = self
            .bridge
            .client
            .post(&url)
            .json(&json!({
                "wallet": self.bridge.wallet,
                "params": params,
            }))
            .send()
            .await?;

        let status = response.status();
        // Failures still carry a JSON body with a message when the bridge can produce one.
        let body = match response.json::<Value>().await {
            Ok(json) => json,
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Agent bridge returned {}", status));
            return Err(anyhow!(message));
        }
        Ok(body)
    }
}

/// Agent whose actions live behind an HTTP bridge to the DeFi toolkit. The
/// bridge owns signing for the connected wallet.
#[derive(Debug)]
pub struct RemoteAgent {
    actions: Vec<Arc<dyn ActionHandler>>,
}

impl RemoteAgent {
    pub async fn connect(base_url: &str, wallet: &str) -> Result<Self> {
        let bridge = Arc::new(Bridge {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            wallet: wallet.to_string(),
        });

        let response = bridge
            .client
            .get(format!("{}/actions", bridge.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("Failed to list agent actions: {}", response.status()));
        }
        let listed: Vec<RemoteActionInfo> = response.json().await?;
        info!(count = listed.len(), url = %bridge.base_url, "Connected to agent bridge");

        let actions = listed
            .into_iter()
            .map(|info| {
                Arc::new(RemoteAction {
                    name: info.name,
                    similes: info.similes,
                    schema: info.schema,
                    bridge: bridge.clone(),
                }) as Arc<dyn ActionHandler>
            })
            .collect();

        Ok(Self { actions })
    }
}

impl Agent for RemoteAgent {
    fn actions(&self) -> &[Arc<dyn ActionHandler>] {
        &self.actions
    }
}
