//! Inbound events and the queue connection callbacks feed them through.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::provider::ProviderHandle;
use crate::shared::ChainId;
use crate::store::{AccountState, NetworkState};

/// Everything the orchestrator reacts to.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Account(AccountState),
    Network(NetworkState),
    Providers(Option<ProviderHandle>),
    /// User asked to switch the wallet to another chain.
    SwitchNetwork(ChainId),
    /// User asked to open the connect UI.
    OpenConnect,
    /// User asked to end the wallet session.
    Disconnect,
}

pub type EventReceiver = mpsc::UnboundedReceiver<ConnectionEvent>;

/// Callback side of the event queue. Cheap to clone into every callback.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ConnectionEvent>,
}

pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

impl EventSender {
    /// Enqueue an event. Returns `false` once the orchestrator has stopped.
    pub fn send(&self, event: ConnectionEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Event queue closed, dropping {:?}", e.0);
                false
            }
        }
    }

    pub fn account(&self, account: AccountState) -> bool {
        self.send(ConnectionEvent::Account(account))
    }

    /// Account callback payload (`{ address, isConnected }`).
    pub fn account_payload(&self, payload: &Value) -> bool {
        self.account(AccountState::from_payload(payload))
    }

    pub fn network(&self, network: NetworkState) -> bool {
        self.send(ConnectionEvent::Network(network))
    }

    /// Network callback payload (`{ chainId }`).
    pub fn network_payload(&self, payload: &Value) -> bool {
        self.network(NetworkState::from_payload(payload))
    }

    pub fn providers(&self, provider: Option<ProviderHandle>) -> bool {
        self.send(ConnectionEvent::Providers(provider))
    }

    pub fn switch_network(&self, chain_id: ChainId) -> bool {
        self.send(ConnectionEvent::SwitchNetwork(chain_id))
    }

    pub fn open_connect(&self) -> bool {
        self.send(ConnectionEvent::OpenConnect)
    }

    pub fn disconnect(&self) -> bool {
        self.send(ConnectionEvent::Disconnect)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
