//! Connection store — the latest account, network and provider snapshot.
//!
//! The store is an owned value injected into the orchestrator. Each update
//! replaces exactly one slot, then observers see the full new snapshot.
//! In-flight runs hold a [`ConnectionReader`] so every wallet call sees the
//! latest provider rather than the one present when the run started.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::Value;

use crate::provider::ProviderHandle;
use crate::shared::{Address, ChainId};

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    /// `None` means disconnected.
    pub address: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub provider: Option<ProviderHandle>,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Account slot as reported by the connection library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    pub address: Option<Address>,
}

impl AccountState {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }

    /// Read an account payload (`{ address, isConnected, ... }`).
    ///
    /// A missing or unparseable address means disconnected, as does an
    /// explicit `isConnected: false` next to a stale address.
    pub fn from_payload(payload: &Value) -> Self {
        let connected = payload
            .get("isConnected")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let address = payload
            .get("address")
            .and_then(Value::as_str)
            .and_then(|s| Address::from_str(s).ok())
            .filter(|_| connected);
        Self { address }
    }
}

/// Network slot as reported by the connection library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkState {
    pub chain_id: Option<ChainId>,
}

impl NetworkState {
    pub fn on(chain_id: ChainId) -> Self {
        Self {
            chain_id: Some(chain_id),
        }
    }

    /// Read a network payload. `chainId` may be a number, a decimal or hex
    /// string, or CAIP-2 (`eip155:1`); `caipNetworkId` is used as a fallback.
    pub fn from_payload(payload: &Value) -> Self {
        let chain_id = ["chainId", "caipNetworkId"]
            .iter()
            .filter_map(|key| payload.get(*key))
            .find_map(|value| match value {
                Value::Number(n) => n.as_u64().map(ChainId::new),
                Value::String(s) => ChainId::parse(s),
                _ => None,
            });
        Self { chain_id }
    }
}

/// One slot replacement.
#[derive(Debug, Clone)]
pub enum ConnectionUpdate {
    Account(AccountState),
    Network(NetworkState),
    Provider(Option<ProviderHandle>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Observer = Box<dyn FnMut(&ConnectionState)>;

/// Read-only view of a store's live state. Cheap to clone.
#[derive(Clone, Default)]
pub struct ConnectionReader {
    state: Rc<RefCell<ConnectionState>>,
}

impl ConnectionReader {
    pub fn read(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address
    }

    pub fn provider(&self) -> Option<ProviderHandle> {
        self.state.borrow().provider.clone()
    }
}

impl std::fmt::Debug for ConnectionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ConnectionReader")
            .field(&*self.state.borrow())
            .finish()
    }
}

#[derive(Default)]
pub struct ConnectionStore {
    state: Rc<RefCell<ConnectionState>>,
    observers: Vec<(SubscriberId, Observer)>,
    next_id: u64,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one slot and notify observers.
    pub fn update(&mut self, update: ConnectionUpdate) {
        {
            let mut state = self.state.borrow_mut();
            match update {
                ConnectionUpdate::Account(account) => state.address = account.address,
                ConnectionUpdate::Network(network) => state.chain_id = network.chain_id,
                ConnectionUpdate::Provider(provider) => state.provider = provider,
            }
        }

        let state = self.state.borrow();
        for (_, observer) in self.observers.iter_mut() {
            observer(&state);
        }
    }

    pub fn read(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.state.borrow().chain_id
    }

    pub fn provider(&self) -> Option<ProviderHandle> {
        self.state.borrow().provider.clone()
    }

    /// Live view that follows every later update.
    pub fn reader(&self) -> ConnectionReader {
        ConnectionReader {
            state: self.state.clone(),
        }
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriberId
    where
        F: FnMut(&ConnectionState) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("state", &*self.state.borrow())
            .field("observers", &self.observers.len())
            .finish()
    }
}
