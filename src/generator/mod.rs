//! Natural-language to flow steps. The model proposes steps; nothing here
//! touches the chain or the canvas.

pub mod llm;

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::actions::catalog::{ACTION_DEFINITIONS, is_action_type};
use crate::assets::{SOL_MINT, USDC_MINT, USDT_MINT};
use crate::error::{FlowError, Result};
use crate::generator::llm::LlmClient;

/// Config keys that must hold real numbers in generated steps.
pub const NUMERIC_FIELDS: &[&str] = &["inputAmount", "amount", "leverage", "slippageBps"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    pub action: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "assetSource", default, skip_serializing_if = "Option::is_none")]
    pub asset_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTokenBalance {
    pub symbol: String,
    pub mint: String,
    pub amount: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssets {
    pub native_balance: String,
    #[serde(default)]
    pub tokens: Vec<UserTokenBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_assets: Option<UserAssets>,
}

impl GenerateRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            user_assets: None,
        }
    }

    pub fn with_assets(mut self, assets: UserAssets) -> Self {
        self.user_assets = Some(assets);
        self
    }
}

const RULES: &str = r#"
Respond with a JSON array of steps. Each step is an object with:
1. "action": one of the action types listed above, spelled exactly
2. "config": an object holding the parameters for that action
3. "description": a short human-readable summary of the step

Swaps use "trade" with outputMint, inputAmount, optional inputMint (defaults to SOL) and optional slippageBps (default 50).
Staking uses "stakeWithJup" with amount.
Balances use "get_balance" for SOL and "get_token_balance" for tokens.

Amounts, leverage and slippage are always JSON numbers. Never emit placeholder strings such as
"CALCULATE_50_PERCENT" or "FROM_PREVIOUS_OUTPUT". Percentages are resolved against the balances
below: "50% of my USDC" with 100 USDC is inputAmount 50; "all my SOL" is the full SOL balance.

Example: the user holds 100 USDC and asks "swap 50% of my USDC to SOL":
[{"action":"trade","config":{"inputMint":"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v","outputMint":"So11111111111111111111111111111111111111112","inputAmount":50,"slippageBps":50},"description":"Swap 50 USDC (50% of balance) to SOL"}]

Return the JSON array only: no markdown, no commentary."#;

/// System context for the model: the catalog, well-known mints, output rules
/// and, when present, the user's balances.
pub fn system_prompt(user_assets: Option<&UserAssets>) -> String {
    let mut prompt = String::from(
        "You build DeFi workflows on Solana from natural language.\n\nAvailable actions:\n",
    );
    for def in ACTION_DEFINITIONS {
        let _ = writeln!(prompt, "- {}: {} ({})", def.action_type, def.label, def.category);
    }
    let _ = write!(
        prompt,
        "\nKnown mints:\n- SOL: {SOL_MINT}\n- USDC: {USDC_MINT}\n- USDT: {USDT_MINT}\n"
    );
    prompt.push_str(RULES);

    if let Some(assets) = user_assets {
        let _ = write!(
            prompt,
            "\n\n=== USER PORTFOLIO ===\nSOL Balance: {}\n",
            assets.native_balance
        );
        if !assets.tokens.is_empty() {
            prompt.push_str("Token Balances:\n");
            for t in &assets.tokens {
                let _ = writeln!(
                    prompt,
                    "- {}: {} (mint: {}, decimals: {})",
                    t.symbol, t.amount, t.mint, t.decimals
                );
            }
        }
        prompt.push_str(
            "Use these exact balances: multiply the balance by the fraction (25% = 0.25, 50% = 0.5, \
             75% = 0.75, 100% = 1.0), round to two decimals, and write the number into the config.",
        );
    }
    prompt
}

/// Removes a surrounding ``` or ```json fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim_end().strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn generation_error(message: impl Into<String>, raw: &str) -> FlowError {
    FlowError::Generation {
        message: message.into(),
        raw: raw.to_string(),
    }
}

/// Parses and validates raw model output into steps. Every failure keeps the
/// raw text.
pub fn parse_flow_steps(raw: &str) -> Result<Vec<FlowStep>> {
    let text = strip_code_fences(raw);
    let value: Value = serde_json::from_str(text)
        .map_err(|e| generation_error(format!("AI returned invalid JSON: {e}"), raw))?;

    if !value.is_array() {
        return Err(generation_error("Response is not a JSON array", raw));
    }
    let steps: Vec<FlowStep> = serde_json::from_value(value)
        .map_err(|e| generation_error(format!("Malformed step: {e}"), raw))?;

    for (idx, step) in steps.iter().enumerate() {
        if !is_action_type(&step.action) {
            return Err(generation_error(
                format!("Step {} uses unknown action \"{}\"", idx + 1, step.action),
                raw,
            ));
        }
        for key in NUMERIC_FIELDS {
            if let Some(Value::String(s)) = step.config.get(*key) {
                warn!(step = idx + 1, field = key, value = %s, "Numeric parameter generated as a string");
            }
        }
    }
    Ok(steps)
}

pub struct FlowGenerator {
    client: Arc<dyn LlmClient>,
}

impl FlowGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn generate_flow_steps(&self, request: &GenerateRequest) -> Result<Vec<FlowStep>> {
        if request.prompt.trim().is_empty() {
            return Err(FlowError::InvalidPrompt);
        }

        let system = system_prompt(request.user_assets.as_ref());
        let raw = self
            .client
            .generate(&system, &request.prompt)
            .await
            .map_err(|e| generation_error(e.to_string(), ""))?;

        match parse_flow_steps(&raw) {
            Ok(steps) => {
                info!(steps = steps.len(), "Generated flow");
                Ok(steps)
            }
            Err(e) => {
                error!(raw = %raw, error = %e, "Failed to parse generated flow");
                Err(e)
            }
        }
    }
}
