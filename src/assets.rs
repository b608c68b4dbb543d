//! Canonical token / NFT shapes flowing along edges, and the payloads that
//! downstream nodes keep in their data map keyed by the upstream node id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::graph::folder::FolderData;
use crate::graph::{FOLDER, NFT_CARD, Node, NodeData, TOKEN_CARD, WALLET_BALANCE};
use crate::portfolio::{Nft, PortfolioToken};

/// Wrapped SOL mint, used as the native-currency sentinel.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const SOL_DECIMALS: u8 = 9;
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowToken {
    pub mint: String,
    pub symbol: String,
    pub decimals: u8,
    /// Decimal string, never a float.
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AssetPayload {
    Token {
        token: FlowToken,
    },
    Nft {
        nft: Nft,
    },
    Folder {
        tokens: Vec<FlowToken>,
        nfts: Vec<Nft>,
        name: String,
    },
}

impl AssetPayload {
    /// Tokens usable as action input. NFTs never flatten into tokens.
    pub fn tokens(&self) -> Vec<FlowToken> {
        match self {
            AssetPayload::Token { token } => vec![token.clone()],
            AssetPayload::Folder { tokens, .. } => tokens.clone(),
            AssetPayload::Nft { .. } => Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        // Every variant is plain data; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A payload found in a node's data map, tagged with the node that sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedAsset {
    pub source: String,
    pub payload: AssetPayload,
}

pub fn to_flow_token(token: &PortfolioToken) -> FlowToken {
    FlowToken {
        mint: token.mint.clone(),
        symbol: token.symbol.clone(),
        decimals: token.decimals,
        amount: token.amount.clone(),
        logo: token.logo.clone(),
        name: Some(token.name.clone()).filter(|n| !n.is_empty()),
    }
}

pub fn native_token(amount: impl Into<String>) -> FlowToken {
    FlowToken {
        mint: SOL_MINT.to_string(),
        symbol: "SOL".to_string(),
        decimals: SOL_DECIMALS,
        amount: amount.into(),
        logo: None,
        name: Some("Solana".to_string()),
    }
}

/// Non-negative decimal string: digits with at most one dot.
pub fn is_decimal_amount(s: &str) -> bool {
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Reads the `solana` balance field of a wallet-balance node, which may be a
/// string or a number depending on where the node came from.
pub fn wallet_amount(data: &NodeData) -> String {
    let raw = match data.get("solana") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return "0".to_string(),
    };
    if is_decimal_amount(&raw) {
        raw
    } else {
        warn!(amount = %raw, "Ignoring malformed wallet balance");
        "0".to_string()
    }
}

pub fn token_from_card(data: &NodeData) -> Option<FlowToken> {
    serde_json::from_value::<PortfolioToken>(Value::Object(data.clone()))
        .map(|t| to_flow_token(&t))
        .map_err(|e| debug!(error = %e, "Token card data is not a token"))
        .ok()
}

fn token_from_value(value: &Value) -> Option<FlowToken> {
    value.as_object().and_then(token_from_card)
}

fn nft_from_value(value: &Value) -> Option<Nft> {
    serde_json::from_value(value.clone()).ok()
}

/// Tokens and NFTs held by a folder's apps. Apps of other types are skipped.
pub fn flatten_folder(folder: &FolderData) -> (Vec<FlowToken>, Vec<Nft>) {
    let mut tokens = Vec::new();
    let mut nfts = Vec::new();
    for app in &folder.apps {
        match app.kind.as_str() {
            TOKEN_CARD => tokens.extend(token_from_value(&app.data)),
            WALLET_BALANCE => {
                if let Some(data) = app.data.as_object() {
                    tokens.push(native_token(wallet_amount(data)));
                }
            }
            NFT_CARD => nfts.extend(nft_from_value(&app.data)),
            _ => {}
        }
    }
    (tokens, nfts)
}

/// Payload an asset-bearing node emits when it is connected to another node.
/// Returns `None` for any other node type.
pub fn build_asset_payload(node: &Node) -> Option<AssetPayload> {
    match node.kind.as_str() {
        TOKEN_CARD => token_from_card(&node.data).map(|token| AssetPayload::Token { token }),
        WALLET_BALANCE => Some(AssetPayload::Token {
            token: native_token(wallet_amount(&node.data)),
        }),
        NFT_CARD => nft_from_value(&Value::Object(node.data.clone())).map(|nft| AssetPayload::Nft { nft }),
        FOLDER => {
            let folder = FolderData::from_node_data(&node.data);
            let (tokens, nfts) = flatten_folder(&folder);
            Some(AssetPayload::Folder {
                tokens,
                nfts,
                name: folder.name,
            })
        }
        _ => None,
    }
}

pub fn is_asset_payload(value: &Value) -> bool {
    matches!(
        value.get("kind").and_then(Value::as_str),
        Some("token" | "nft" | "folder")
    )
}

/// Entries of a node's data map that are asset payloads, in insertion order.
pub fn extract_assets_from_node_data(data: &NodeData) -> Vec<AttachedAsset> {
    data.iter()
        .filter(|(_, value)| is_asset_payload(value))
        .filter_map(|(source, value)| match serde_json::from_value(value.clone()) {
            Ok(payload) => Some(AttachedAsset {
                source: source.clone(),
                payload,
            }),
            Err(e) => {
                debug!(source = %source, error = %e, "Skipping malformed asset payload");
                None
            }
        })
        .collect()
}

pub fn flatten_tokens(assets: &[AttachedAsset]) -> Vec<FlowToken> {
    assets.iter().flat_map(|a| a.payload.tokens()).collect()
}
