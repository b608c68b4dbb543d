use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::actions::Agent;
use crate::portfolio::Portfolio;

/// Connected wallet as seen by the engine. Signing itself is the agent's job.
pub trait Signer: Send + Sync {
    fn is_connected(&self) -> bool;
    fn public_key(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    public_key: Option<String>,
}

impl WalletSession {
    pub fn connected(public_key: &str) -> Self {
        Self {
            public_key: Some(public_key.to_string()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

impl Signer for WalletSession {
    fn is_connected(&self) -> bool {
        self.public_key.is_some()
    }

    fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }
}

/// Shared stop flag. Setting it keeps later nodes from starting; a dispatch
/// already sent to the agent still completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a run needs besides the graph. Cheap to clone (just Arcs).
#[derive(Clone)]
pub struct ExecutionContext {
    pub signer: Arc<dyn Signer>,
    pub agent: Arc<dyn Agent>,
    pub portfolio: Option<Arc<Portfolio>>,
    pub stop: StopHandle,
}

impl ExecutionContext {
    pub fn new(signer: Arc<dyn Signer>, agent: Arc<dyn Agent>) -> Self {
        Self {
            signer,
            agent,
            portfolio: None,
            stop: StopHandle::default(),
        }
    }

    pub fn with_portfolio(mut self, portfolio: Portfolio) -> Self {
        self.portfolio = Some(Arc::new(portfolio));
        self
    }

    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }
}
