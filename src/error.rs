use thiserror::Error;

/// Errors surfaced by the flow engine, the action registry and the generator.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Connect your wallet to run DeFi flows")]
    WalletNotConnected,

    #[error("No connected DeFi actions on the canvas")]
    NoActionNodes,

    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    /// The identifier is not part of the action catalog at all.
    #[error("Unknown action \"{0}\": it is not part of the action catalog")]
    UnknownAction(String),

    /// The catalog knows the action but the connected agent does not expose it.
    #[error("Action \"{0}\" is in the catalog but unavailable on the connected agent version")]
    ActionUnavailable(String),

    #[error("Invalid parameters for \"{action}\": missing [{}], invalid [{}]", .missing.join(", "), .invalid.join("; "))]
    InvalidParams {
        action: String,
        missing: Vec<String>,
        invalid: Vec<String>,
    },

    #[error("{message}")]
    ActionFailed { action: String, message: String },

    #[error("No tokens connected to {0}")]
    NoTokensConnected(String),

    #[error("Invalid prompt: expected a non-empty instruction")]
    InvalidPrompt,

    /// The raw model output is kept so the caller can diagnose it.
    #[error("Flow generation failed: {message}")]
    Generation { message: String, raw: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = FlowError> = std::result::Result<T, E>;
