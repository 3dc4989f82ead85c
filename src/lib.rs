//! # wallet-actions
//!
//! Connect → sign → balance → send orchestration for EIP-1193 wallet
//! providers, for both native and WASM targets.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Amounts, chain ids, chain catalogue, errors, configuration (always available, WASM-safe)
//! 2. **Provider** — The `request` seam: JSON-RPC over HTTP, injected `window.ethereum`, scripted
//! 3. **Actions** — `WalletActions`: signature, balance, transaction, network switch, receipt
//! 4. **Orchestration** — Connection store + `Orchestrator` event loop driving one run per address
//! 5. **View** — Status sinks: tracing, status board, toasts, setup instructions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wallet_actions::prelude::*;
//!
//! let config = AppConfig::from_env()?;
//! let board = Rc::new(RefCell::new(StatusBoardSink::new()));
//! let mut orchestrator = Orchestrator::new(config, board.clone());
//!
//! let (events, mut rx) = channel();
//! events.providers(Some(ProviderHandle::new(JsonRpcProvider::new("http://127.0.0.1:8545")?)));
//! events.account(AccountState::connected(address));
//! drop(events);
//!
//! orchestrator.run(&mut rx).await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes: `Wei`, `ChainId`, `Signature`.
pub mod shared;

/// Unified error types.
pub mod error;

/// Supported chain descriptors.
pub mod network;

/// Startup configuration.
pub mod config;

// ── Layer 2: Provider ────────────────────────────────────────────────────────

/// Wallet provider trait and back-ends.
pub mod provider;

// ── Layer 3: Actions ─────────────────────────────────────────────────────────

pub mod actions;

// ── Layer 4: Orchestration ───────────────────────────────────────────────────

/// Latest account / network / provider snapshot.
pub mod store;

/// Outbound session controls.
pub mod session;

pub mod orchestrator;

// ── Layer 5: View ────────────────────────────────────────────────────────────

/// Status sinks and presentation models.
pub mod view;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Address, ChainId, Signature, TxHash, Wei, U256};

    // Errors
    pub use crate::error::{ActionError, ConfigError, ProviderError};

    // Configuration + chains
    pub use crate::config::{
        AppConfig, AppConfigBuilder, ConfirmationPolicy, FlowConfig, Recipient, SendAmount,
    };
    pub use crate::network::Chain;

    // Provider
    #[cfg(feature = "http")]
    pub use crate::provider::http::JsonRpcProvider;
    #[cfg(feature = "wasm")]
    pub use crate::provider::injected::InjectedProvider;
    pub use crate::provider::scripted::ScriptedProvider;
    pub use crate::provider::{ProviderHandle, WalletProvider};

    // Actions
    pub use crate::actions::{Receipt, TxHandle, WalletActions};

    // Orchestration
    pub use crate::orchestrator::{
        channel, ActionRun, ConnectionEvent, EventSender, Orchestrator, RunPhase, Step,
        StepStatus,
    };
    pub use crate::session::SessionControl;
    pub use crate::store::{
        AccountState, ConnectionReader, ConnectionState, ConnectionStore, NetworkState,
    };

    // View
    pub use crate::view::{
        Fanout, Notice, SetupNotice, SharedSink, StatusBoardSink, StatusSink, StatusUpdate,
        StepView, ToastSink, TracingSink,
    };
}
