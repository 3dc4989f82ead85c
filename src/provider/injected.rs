//! Injected browser provider — `window.ethereum.request({ method, params })`.
//!
//! Also wraps any EIP-1193 object handed over by a connection library
//! (e.g. the `eip155` provider a connect modal exposes).

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect, JSON};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::ProviderError;
use crate::provider::WalletProvider;

/// EIP-1193 provider backed by a JavaScript object.
pub struct InjectedProvider {
    inner: JsValue,
}

impl InjectedProvider {
    /// Look up `window.ethereum`. Returns `None` when no wallet is injected.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { inner: ethereum })
    }

    /// Wrap an EIP-1193 object obtained elsewhere.
    pub fn from_js(provider: JsValue) -> Self {
        Self { inner: provider }
    }

    fn request_fn(&self) -> Result<Function, ProviderError> {
        Reflect::get(&self.inner, &JsValue::from_str("request"))
            .map_err(|e| ProviderError::Js(extract_js_error(&e)))?
            .dyn_into::<Function>()
            .map_err(|_| ProviderError::Unsupported("provider has no request() method".into()))
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(|e| ProviderError::Js(extract_js_error(&e)))?;
        let params_js = JSON::parse(&serde_json::to_string(&params)?)
            .map_err(|e| ProviderError::Js(extract_js_error(&e)))?;
        Reflect::set(&args, &JsValue::from_str("params"), &params_js)
            .map_err(|e| ProviderError::Js(extract_js_error(&e)))?;

        let promise = self
            .request_fn()?
            .call1(&self.inner, &args)
            .map_err(rpc_error_from_js)?
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::Unsupported("request() did not return a promise".into()))?;

        let result = JsFuture::from(promise).await.map_err(rpc_error_from_js)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }

        let json: String = JSON::stringify(&result)
            .map_err(|e| ProviderError::Js(extract_js_error(&e)))?
            .into();
        Ok(serde_json::from_str(&json)?)
    }

    fn name(&self) -> &str {
        "injected"
    }
}

/// Map a rejected promise to an RPC error when it carries an EIP-1193 `code`.
fn rpc_error_from_js(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64());
    let message = extract_js_error(&err);
    match code {
        Some(code) => ProviderError::Rpc {
            code: code as i64,
            message,
        },
        None => ProviderError::Js(message),
    }
}

fn extract_js_error(err: &JsValue) -> String {
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}
