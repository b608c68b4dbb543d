//! Typed shortcuts for the few actions the canvas calls by their exact agent name.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use anyhow::{Result, anyhow};
use std::sync::Arc;

use crate::actions::{ActionHandler, Agent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    pub output_mint: String,
    pub input_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeParams {
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeInput {
    pub mint: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFee {
    #[default]
    Fast,
    Turbo,
    Ultra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeParams {
    pub input_assets: Vec<MergeInput>,
    pub output_mint: String,
    #[serde(default)]
    pub priority_fee: PriorityFee,
}

fn find_exact(agent: &dyn Agent, name: &str) -> Result<Arc<dyn ActionHandler>> {
    agent
        .actions()
        .iter()
        .find(|a| a.name() == name)
        .cloned()
        .ok_or_else(|| anyhow!("{} action is unavailable in the agent", name))
}

async fn dispatch(agent: &dyn Agent, name: &str, params: Value) -> Result<Value> {
    let action = find_exact(agent, name)?;
    agent.execute(action.as_ref(), params).await
}

pub async fn execute_swap(agent: &dyn Agent, params: &SwapParams) -> Result<Value> {
    dispatch(agent, "TRADE", serde_json::to_value(params)?).await
}

pub async fn execute_stake(agent: &dyn Agent, params: &StakeParams) -> Result<Value> {
    dispatch(agent, "STAKE_WITH_JUPITER", json!({ "amount": params.amount })).await
}

pub async fn execute_merge(agent: &dyn Agent, params: &MergeParams) -> Result<Value> {
    dispatch(agent, "SOLUTIOFI_MERGE_TOKENS", serde_json::to_value(params)?).await
}
