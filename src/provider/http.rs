//! JSON-RPC 2.0 provider over HTTP — `JsonRpcProvider`.
//!
//! Talks to a node that holds unlocked accounts (a local dev node, or a
//! signer proxy), so `personal_sign` and `eth_sendTransaction` are answered
//! by the node itself. Requests are never retried: every wallet action is
//! surfaced exactly once, success or failure.

use std::cell::Cell;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;
use crate::provider::WalletProvider;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC provider for a single endpoint.
pub struct JsonRpcProvider {
    url: String,
    client: Client,
    next_id: Cell<u64>,
}

impl JsonRpcProvider {
    pub fn new(url: &str) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.pool_max_idle_per_host(4);
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            next_id: Cell::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    async fn do_request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id(),
            method,
            params,
        };

        let resp = self.client.post(&self.url).json(&body).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body_text
            )));
        }

        let parsed: JsonRpcResponse = resp.json().await?;
        match parsed.error {
            Some(err) => Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(parsed.result),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for JsonRpcProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.do_request(method, params).await
    }

    fn name(&self) -> &str {
        "json-rpc"
    }
}
