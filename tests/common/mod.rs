#![allow(dead_code)]

use async_trait::async_trait;
use sendflow::actions::schema::ParamSchema;
use sendflow::actions::{ActionHandler, Agent};
use sendflow::assets::FlowToken;
use sendflow::generator::llm::LlmClient;
use sendflow::portfolio::{NativeBalance, Portfolio, PortfolioToken};
use sendflow::runtime::context::{ExecutionContext, WalletSession};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const JUP: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";

/// Every dispatch made through the mock agent, in order: (agent action name, params).
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(String, Value)>>>);

impl CallLog {
    pub fn record(&self, name: &str, params: &Value) {
        self.0.lock().unwrap().push((name.to_string(), params.clone()));
    }

    pub fn names(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn params(&self) -> Vec<Value> {
        self.0.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Value(Value),
    Fail(String),
}

#[derive(Debug)]
pub struct MockAction {
    pub name: String,
    pub similes: Vec<String>,
    pub schema: Option<ParamSchema>,
    pub reply: Reply,
    pub log: CallLog,
}

#[async_trait]
impl ActionHandler for MockAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn similes(&self) -> &[String] {
        &self.similes
    }

    fn schema(&self) -> Option<&ParamSchema> {
        self.schema.as_ref()
    }

    async fn execute(&self, params: Value) -> anyhow::Result<Value> {
        self.log.record(&self.name, &params);
        match &self.reply {
            Reply::Value(v) => Ok(v.clone()),
            Reply::Fail(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }
}

pub fn action(name: &str, reply: Reply, log: &CallLog) -> MockAction {
    MockAction {
        name: name.to_string(),
        similes: Vec::new(),
        schema: None,
        reply,
        log: log.clone(),
    }
}

/// Action answering with a success record carrying a signature derived from its name.
pub fn succeeding(name: &str, log: &CallLog) -> Arc<dyn ActionHandler> {
    Arc::new(action(
        name,
        Reply::Value(json!({ "status": "success", "signature": format!("sig-{name}") })),
        log,
    ))
}

pub fn failing(name: &str, message: &str, log: &CallLog) -> Arc<dyn ActionHandler> {
    Arc::new(action(name, Reply::Fail(message.to_string()), log))
}

pub fn replying(name: &str, value: Value, log: &CallLog) -> Arc<dyn ActionHandler> {
    Arc::new(action(name, Reply::Value(value), log))
}

/// Action that only exposes a name, for resolution tests.
pub fn named(name: &str) -> Arc<dyn ActionHandler> {
    succeeding(name, &CallLog::default())
}

pub fn with_similes(name: &str, similes: &[&str]) -> Arc<dyn ActionHandler> {
    let mut a = action(name, Reply::Value(json!({})), &CallLog::default());
    a.similes = similes.iter().map(|s| s.to_string()).collect();
    Arc::new(a)
}

pub struct MockAgent {
    pub actions: Vec<Arc<dyn ActionHandler>>,
}

impl MockAgent {
    pub fn new(actions: Vec<Arc<dyn ActionHandler>>) -> Self {
        Self { actions }
    }
}

impl Agent for MockAgent {
    fn actions(&self) -> &[Arc<dyn ActionHandler>] {
        &self.actions
    }
}

pub fn context(actions: Vec<Arc<dyn ActionHandler>>) -> ExecutionContext {
    ExecutionContext::new(
        Arc::new(WalletSession::connected(WALLET)),
        Arc::new(MockAgent::new(actions)),
    )
}

pub fn token(symbol: &str, mint: &str, amount: &str, decimals: u8) -> FlowToken {
    FlowToken {
        mint: mint.to_string(),
        symbol: symbol.to_string(),
        decimals,
        amount: amount.to_string(),
        logo: None,
        name: None,
    }
}

pub fn portfolio_token(symbol: &str, mint: &str, amount: &str, decimals: u8) -> PortfolioToken {
    PortfolioToken {
        mint: mint.to_string(),
        symbol: symbol.to_string(),
        name: format!("{symbol} Token"),
        amount: amount.to_string(),
        decimals,
        ..Default::default()
    }
}

pub fn sample_portfolio() -> Portfolio {
    Portfolio {
        native_balance: NativeBalance {
            lamports: "2500000000".to_string(),
            solana: "2.5".to_string(),
        },
        tokens: vec![
            portfolio_token("USDC", USDC, "100", 6),
            portfolio_token("BONK", BONK, "1500000", 5),
            portfolio_token("JUP", JUP, "42.5", 6),
        ],
        nfts: Vec::new(),
    }
}

/// LLM stand-in returning a canned completion and remembering what it was asked.
#[derive(Default)]
pub struct FakeLlm {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        if self.fail {
            anyhow::bail!("upstream unavailable");
        }
        Ok(self.reply.clone())
    }
}

pub fn shared(action: MockAction) -> Arc<dyn ActionHandler> {
    Arc::new(action)
}
