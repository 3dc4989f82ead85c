//! Deterministic in-process provider.
//!
//! Replies are queued per method and consumed in order. Every request is
//! recorded so tests can assert on exactly what was sent to the wallet.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{ProviderError, USER_REJECTED_CODE};
use crate::provider::WalletProvider;

enum Reply {
    Ready(Result<Value, ProviderError>),
    Deferred(oneshot::Receiver<Result<Value, ProviderError>>),
}

/// One request as the provider received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// Completes a deferred reply. Dropping it leaves the request pending forever.
pub type ReplySender = oneshot::Sender<Result<Value, ProviderError>>;

#[derive(Default)]
pub struct ScriptedProvider {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful result for `method`.
    pub fn respond(&self, method: &str, result: Value) -> &Self {
        self.push(method, Reply::Ready(Ok(result)));
        self
    }

    /// Queue a failure for `method`.
    pub fn fail(&self, method: &str, error: ProviderError) -> &Self {
        self.push(method, Reply::Ready(Err(error)));
        self
    }

    /// Queue an EIP-1193 user rejection (code 4001) for `method`.
    pub fn reject(&self, method: &str, message: &str) -> &Self {
        self.fail(
            method,
            ProviderError::Rpc {
                code: USER_REJECTED_CODE,
                message: message.to_string(),
            },
        )
    }

    /// Queue a reply the caller completes later through the returned sender.
    pub fn defer(&self, method: &str) -> ReplySender {
        let (tx, rx) = oneshot::channel();
        self.push(method, Reply::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Method names in the order they were requested.
    pub fn methods(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.method.clone()).collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait(?Send)]
impl WalletProvider for ScriptedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push(RecordedCall {
            method: method.to_string(),
            params,
        });

        let reply = self
            .replies
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => match rx.await {
                Ok(result) => result,
                // Sender dropped: behave like a wallet that never answers.
                Err(_) => std::future::pending().await,
            },
            None => Err(ProviderError::Unsupported(format!(
                "no scripted reply for {}",
                method
            ))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
