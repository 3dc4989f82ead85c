//! Startup configuration — `AppConfig` and the flow knobs in `FlowConfig`.
//!
//! Everything is validated once, in [`AppConfigBuilder::build`]. A config
//! error is fatal: the app shows setup instructions instead of starting.

use std::time::Duration;

use crate::error::ConfigError;
use crate::network::{Chain, DEFAULT_CHAINS};
use crate::shared::{Address, ChainId, Wei};

/// Placeholder shipped in templates; treated the same as a missing id.
pub const PLACEHOLDER_PROJECT_ID: &str = "YOUR_PROJECT_ID";

pub const DEFAULT_SIGNATURE_MESSAGE: &str = "Hello from AppKit!";

/// Share of the balance held back for fees when computing the send amount.
pub const DEFAULT_RESERVE_PERCENT: u8 = 5;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How much the send step transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendAmount {
    /// `floor(balance * (100 - pct) / 100)`.
    ReservePercent(u8),
    /// A constant amount, independent of the balance.
    Fixed(Wei),
}

impl Default for SendAmount {
    fn default() -> Self {
        SendAmount::ReservePercent(DEFAULT_RESERVE_PERCENT)
    }
}

/// Where the send step transfers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recipient {
    /// Back to the connected address.
    #[default]
    SelfAddress,
    Fixed(Address),
}

impl Recipient {
    pub fn resolve(&self, connected: Address) -> Address {
        match self {
            Recipient::SelfAddress => connected,
            Recipient::Fixed(address) => *address,
        }
    }
}

/// When the send step counts as successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationPolicy {
    /// As soon as the wallet returns a transaction hash.
    #[default]
    None,
    /// Once a receipt is available, polling every `poll_interval`.
    Receipt { poll_interval: Duration },
}

/// Per-run behaviour of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub require_signature: bool,
    pub signature_message: String,
    pub send_amount: SendAmount,
    pub recipient: Recipient,
    pub confirmation: ConfirmationPolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            require_signature: true,
            signature_message: DEFAULT_SIGNATURE_MESSAGE.to_string(),
            send_amount: SendAmount::default(),
            recipient: Recipient::default(),
            confirmation: ConfirmationPolicy::default(),
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.send_amount {
            SendAmount::ReservePercent(pct) if pct > 100 => {
                return Err(ConfigError::InvalidReservePercent(pct));
            }
            SendAmount::Fixed(amount) if amount.is_zero() => {
                return Err(ConfigError::InvalidValue {
                    key: "send_amount".into(),
                    reason: "fixed amount must be greater than zero".into(),
                });
            }
            _ => {}
        }
        if self.require_signature && self.signature_message.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "signature_message".into(),
                reason: "must not be empty when a signature is required".into(),
            });
        }
        if let ConfirmationPolicy::Receipt { poll_interval } = self.confirmation {
            if poll_interval.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key: "poll_interval".into(),
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    project_id: String,
    chains: Vec<Chain>,
    default_chain: ChainId,
    flow: FlowConfig,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read `PROJECT_ID`, `RESERVE_PERCENT`, `SIGNATURE_MESSAGE` and
    /// `REQUIRE_SIGNATURE` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = AppConfig::builder().project_id(&lookup("PROJECT_ID").unwrap_or_default());

        if let Some(raw) = lookup("RESERVE_PERCENT") {
            let pct = raw.trim().parse::<u8>().map_err(|e| ConfigError::InvalidValue {
                key: "RESERVE_PERCENT".into(),
                reason: e.to_string(),
            })?;
            builder = builder.reserve_percent(pct);
        }
        if let Some(message) = lookup("SIGNATURE_MESSAGE") {
            builder = builder.signature_message(&message);
        }
        if let Some(raw) = lookup("REQUIRE_SIGNATURE") {
            let required = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "REQUIRE_SIGNATURE".into(),
                        reason: format!("expected true/false, got '{}'", other),
                    })
                }
            };
            builder = builder.require_signature(required);
        }

        builder.build()
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn default_chain(&self) -> &Chain {
        self.chain(self.default_chain)
            .unwrap_or(&self.chains[0])
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id == id)
    }

    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct AppConfigBuilder {
    project_id: String,
    chains: Vec<Chain>,
    default_chain: Option<ChainId>,
    flow: FlowConfig,
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            chains: DEFAULT_CHAINS.to_vec(),
            default_chain: None,
            flow: FlowConfig::default(),
        }
    }
}

impl AppConfigBuilder {
    pub fn project_id(mut self, id: &str) -> Self {
        self.project_id = id.trim().to_string();
        self
    }

    pub fn chains(mut self, chains: Vec<Chain>) -> Self {
        self.chains = chains;
        self
    }

    pub fn default_chain(mut self, id: ChainId) -> Self {
        self.default_chain = Some(id);
        self
    }

    pub fn flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn require_signature(mut self, required: bool) -> Self {
        self.flow.require_signature = required;
        self
    }

    pub fn signature_message(mut self, message: &str) -> Self {
        self.flow.signature_message = message.to_string();
        self
    }

    pub fn reserve_percent(mut self, pct: u8) -> Self {
        self.flow.send_amount = SendAmount::ReservePercent(pct);
        self
    }

    pub fn fixed_amount(mut self, amount: Wei) -> Self {
        self.flow.send_amount = SendAmount::Fixed(amount);
        self
    }

    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.flow.recipient = recipient;
        self
    }

    pub fn confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.flow.confirmation = policy;
        self
    }

    pub fn build(self) -> Result<AppConfig, ConfigError> {
        if self.project_id.is_empty() || self.project_id == PLACEHOLDER_PROJECT_ID {
            return Err(ConfigError::MissingProjectId);
        }
        let first = self.chains.first().ok_or(ConfigError::NoChains)?;
        let default_chain = match self.default_chain {
            Some(id) if self.chains.iter().any(|c| c.id == id) => id,
            Some(id) => return Err(ConfigError::UnknownChain(id.get())),
            None => first.id,
        };
        self.flow.validate()?;

        Ok(AppConfig {
            project_id: self.project_id,
            chains: self.chains,
            default_chain,
            flow: self.flow,
        })
    }
}
