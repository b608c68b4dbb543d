use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::assets::{FlowToken, to_flow_token};
use crate::generator::{UserAssets, UserTokenBalance};

pub const DEFAULT_MORALIS_URL: &str = "https://solana-gateway.moralis.io";

/// The portfolio API sends `null` for unknown names and symbols of unverified
/// tokens; those read as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token balance as returned by the portfolio API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioToken {
    #[serde(deserialize_with = "null_as_default")]
    pub associated_token_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mint: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount_raw: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub decimals: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub token_standard: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    pub logo: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_verified_contract: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub possible_spam: bool,
}

/// NFT metadata. Only the identifying fields are typed; the rest is kept as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub media: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeBalance {
    #[serde(deserialize_with = "null_as_default")]
    pub lamports: String,
    #[serde(deserialize_with = "null_as_default")]
    pub solana: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    #[serde(deserialize_with = "null_as_default")]
    pub native_balance: NativeBalance,
    #[serde(deserialize_with = "null_as_default")]
    pub tokens: Vec<PortfolioToken>,
    #[serde(deserialize_with = "null_as_default")]
    pub nfts: Vec<Nft>,
}

impl Portfolio {
    pub fn flow_tokens(&self) -> Vec<FlowToken> {
        self.tokens.iter().map(to_flow_token).collect()
    }

    /// Balance snapshot handed to the flow generator.
    pub fn user_assets(&self) -> UserAssets {
        UserAssets {
            native_balance: self.native_balance.solana.clone(),
            tokens: self
                .tokens
                .iter()
                .map(|t| UserTokenBalance {
                    symbol: t.symbol.clone(),
                    mint: t.mint.clone(),
                    amount: t.amount.clone(),
                    decimals: t.decimals,
                })
                .collect(),
        }
    }
}

/// Source of wallet balances. `None` means unavailable; implementations log
/// their own failures instead of returning them.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Option<Portfolio>;
}

#[derive(Debug, Clone)]
pub struct MoralisClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_MORALIS_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn portfolio_url(&self, address: &str) -> String {
        format!(
            "{}/account/mainnet/{}/portfolio?nftMetadata=false&mediaItems=false&excludeSpam=true",
            self.base_url, address
        )
    }

    async fn request(&self, address: &str) -> anyhow::Result<Portfolio> {
        let response = self
            .client
            .get(self.portfolio_url(address))
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Moralis API error: {}", response.status());
        }
        Ok(response.json::<Portfolio>().await?)
    }
}

#[async_trait]
impl PortfolioSource for MoralisClient {
    async fn fetch(&self, address: &str) -> Option<Portfolio> {
        match self.request(address).await {
            Ok(portfolio) => {
                info!(
                    address,
                    tokens = portfolio.tokens.len(),
                    nfts = portfolio.nfts.len(),
                    "Portfolio loaded"
                );
                Some(portfolio)
            }
            Err(e) => {
                error!(address, error = %e, "Error fetching wallet portfolio");
                None
            }
        }
    }
}
