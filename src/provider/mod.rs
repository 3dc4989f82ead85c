//! Provider layer — the EIP-1193 `request` seam every wallet action goes through.
//!
//! The transport is chosen by feature:
//! - `http` feature → [`http::JsonRpcProvider`] (JSON-RPC 2.0 over `reqwest`)
//! - `wasm` feature → [`injected::InjectedProvider`] (`window.ethereum`)
//!
//! [`scripted::ScriptedProvider`] is always available for tests and demos.
//!
//! Everything here is single-threaded: trait futures are `?Send` so that
//! browser providers holding `JsValue`s fit behind the same handle.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "wasm")]
pub mod injected;

pub mod scripted;

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// JSON-RPC method names used by the wallet actions.
pub mod methods {
    pub const PERSONAL_SIGN: &str = "personal_sign";
    pub const ETH_GET_BALANCE: &str = "eth_getBalance";
    pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const ETH_GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ETH_CHAIN_ID: &str = "eth_chainId";
}

/// A wallet's request interface.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Send one request and return the raw JSON result.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "provider"
    }
}

/// Opaque, cheaply clonable handle to the active provider.
#[derive(Clone)]
pub struct ProviderHandle(Rc<dyn WalletProvider>);

impl ProviderHandle {
    pub fn new<P: WalletProvider + 'static>(provider: P) -> Self {
        Self(Rc::new(provider))
    }

    /// Wrap a provider the caller keeps a reference to (e.g. to inspect a scripted provider).
    pub fn from_rc<P: WalletProvider + 'static>(provider: Rc<P>) -> Self {
        Self(provider)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        tracing::debug!(provider = self.name(), method, "provider request");
        let result = self.0.request(method, params).await;
        if let Err(e) = &result {
            tracing::debug!(provider = self.name(), method, "provider request failed: {}", e);
        }
        result
    }

    /// Whether both handles point at the same provider instance.
    pub fn same_as(&self, other: &ProviderHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProviderHandle({})", self.name())
    }
}
