//! Unified error types.

use thiserror::Error;

use crate::shared::{TxHash, Wei};

/// Top-level error for wallet actions and the flow built on them.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("No provider available")]
    ProviderUnavailable,

    /// Carries the wallet's own message unchanged.
    #[error("{0}")]
    UserRejected(String),

    #[error("Insufficient balance after reserving {reserve_percent}% for fees (balance: {balance})")]
    InsufficientBalance { balance: Wei, reserve_percent: u8 },

    #[error("Network switch failed: {0}")]
    NetworkSwitchFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Transaction {0} reverted")]
    Reverted(TxHash),
}

impl ActionError {
    /// Whether the wallet itself declined the prompt.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }
}

/// Errors raised by a provider back-end.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[cfg(feature = "wasm")]
    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// EIP-1193 code for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

impl ProviderError {
    /// Lift a provider error into the action taxonomy, splitting out user rejections.
    pub fn into_action_error(self) -> ActionError {
        match self {
            ProviderError::Rpc { code, message } if code == USER_REJECTED_CODE => {
                ActionError::UserRejected(message)
            }
            other => ActionError::Provider(other),
        }
    }
}

/// Startup configuration errors. All of them are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Project ID is not set")]
    MissingProjectId,

    #[error("No supported chains configured")]
    NoChains,

    #[error("Chain {0} is not in the supported chain list")]
    UnknownChain(u64),

    #[error("Reserve percent must be between 0 and 100, got {0}")]
    InvalidReservePercent(u8),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
