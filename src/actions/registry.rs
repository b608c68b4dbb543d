use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::actions::catalog::{get_action_label, is_action_type};
use crate::actions::params::{inject_defaults, normalize_fields};
use crate::actions::resolve::find_action_by_name;
use crate::actions::{ActionHandler, Agent};
use crate::assets::FlowToken;
use crate::error::{FlowError, Result};

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Synthesize placeholders for required fields that are only missing,
    /// then validate once more.
    pub inject_defaults: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            inject_defaults: true,
        }
    }
}

/// Resolves catalog actions on an agent and dispatches them.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    config: RegistryConfig,
}

impl ActionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, agent: &dyn Agent, action_type: &str) -> Result<Arc<dyn ActionHandler>> {
        if let Some(action) = find_action_by_name(agent, action_type) {
            return Ok(action);
        }
        if is_action_type(action_type) {
            Err(FlowError::ActionUnavailable(action_type.to_string()))
        } else {
            Err(FlowError::UnknownAction(action_type.to_string()))
        }
    }

    /// Builds the payload for `action`, validating it against the action's
    /// schema when one is declared.
    pub fn prepare_payload(
        &self,
        action_type: &str,
        action: &dyn ActionHandler,
        tokens: &[FlowToken],
        config: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let mut payload = normalize_fields(config.clone(), action.schema());
        if !payload.contains_key("tokens") {
            let tokens = serde_json::to_value(tokens).map_err(anyhow::Error::from)?;
            payload.insert("tokens".to_string(), tokens);
        }

        let Some(schema) = action.schema() else {
            return Ok(payload);
        };

        let errors = match schema.validate(&payload) {
            Ok(()) => return Ok(payload),
            Err(errors) => errors,
        };

        if !(self.config.inject_defaults && errors.only_missing()) {
            return Err(FlowError::InvalidParams {
                action: action_type.to_string(),
                missing: errors.missing,
                invalid: errors.invalid,
            });
        }

        let injected = inject_defaults(&mut payload, &errors.missing);
        warn!(action = action_type, fields = ?injected, "Injected placeholder parameters");

        schema
            .validate(&payload)
            .map(|()| payload)
            .map_err(|retry| FlowError::InvalidParams {
                action: action_type.to_string(),
                missing: retry.missing,
                invalid: retry.invalid,
            })
    }

    /// Resolves and executes one catalog action. A returned record with a
    /// set `status` other than `"success"` is an error even though the agent
    /// did not fail.
    pub async fn run_action(
        &self,
        agent: &dyn Agent,
        action_type: &str,
        tokens: &[FlowToken],
        config: &Map<String, Value>,
    ) -> Result<Value> {
        let action = self.resolve(agent, action_type)?;
        let payload = self.prepare_payload(action_type, action.as_ref(), tokens, config)?;

        info!(action = action_type, agent_name = action.name(), "Dispatching action");
        let result = agent
            .execute(action.as_ref(), Value::Object(payload))
            .await
            .map_err(|e| FlowError::ActionFailed {
                action: action_type.to_string(),
                message: e.to_string(),
            })?;

        if result.get("status").is_some_and(is_failure_status) {
            let message = result
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} failed", get_action_label(action_type)));
            return Err(FlowError::ActionFailed {
                action: action_type.to_string(),
                message,
            });
        }
        Ok(result)
    }
}

/// A status that is set (not null, false, zero or empty) and is anything
/// other than the string `"success"`.
pub fn is_failure_status(status: &Value) -> bool {
    match status {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty() && s != "success",
        Value::Array(_) | Value::Object(_) => true,
    }
}
