use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::NodeData;

/// Fields describing the call itself rather than what it produced.
pub const METADATA_FIELDS: &[&str] = &["status", "message", "signature", "transaction", "transactions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Transaction identifier of an agent result, checked in order: the result
/// itself as a string, `signature`, `transaction`, then `transactions[0]`.
pub fn extract_signature(result: &Value) -> Option<String> {
    if let Value::String(s) = result {
        return Some(s.clone());
    }
    result
        .get("signature")
        .and_then(Value::as_str)
        .or_else(|| result.get("transaction").and_then(Value::as_str))
        .or_else(|| {
            result
                .get("transactions")
                .and_then(Value::as_array)
                .and_then(|txs| txs.first())
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

/// Anything the result carries beyond call metadata.
pub fn extract_return_data(result: &Value) -> Option<Value> {
    match result {
        Value::Object(fields) => {
            if let Some(data) = fields.get("data") {
                return Some(data.clone());
            }
            let rest: Map<String, Value> = fields
                .iter()
                .filter(|(k, _)| !METADATA_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (!rest.is_empty()).then_some(Value::Object(rest))
        }
        Value::String(_) | Value::Null => None,
        other => Some(other.clone()),
    }
}

/// Normalized result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub status: ResultStatus,
    pub message: String,
    pub signature: Option<String>,
    pub data: Option<Value>,
}

impl ActionOutcome {
    pub fn success(label: &str, result: &Value) -> Self {
        let message = result
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{label} executed successfully"));
        Self {
            status: ResultStatus::Success,
            message,
            signature: extract_signature(result),
            data: extract_return_data(result),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            message: message.into(),
            signature: None,
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Data map of the result node rendered for this outcome.
    pub fn to_node_data(&self, label: &str, timestamp: &str) -> NodeData {
        let status = match self.status {
            ResultStatus::Success => "success",
            ResultStatus::Error => "error",
        };
        let mut data = NodeData::new();
        data.insert("label".to_string(), Value::from(label));
        data.insert("message".to_string(), Value::from(self.message.as_str()));
        data.insert("status".to_string(), Value::from(status));
        data.insert("timestamp".to_string(), Value::from(timestamp));
        data.insert(
            "transactionSignature".to_string(),
            self.signature.clone().map(Value::String).unwrap_or(Value::Null),
        );
        data.insert(
            "returnData".to_string(),
            self.data.clone().unwrap_or(Value::Null),
        );
        data
    }
}
