//! `WalletActions` — stateless request wrappers over the active provider.
//!
//! No call is retried. A wallet rejection comes back as
//! [`ActionError::UserRejected`]; anything else fails only the step that
//! issued it.

use serde_json::json;

use crate::actions::{wire, Receipt, TxHandle};
use crate::error::{ActionError, ProviderError};
use crate::network::Chain;
use crate::provider::{methods, ProviderHandle};
use crate::shared::{hex, Address, Signature, TxHash, Wei};
use crate::store::ConnectionReader;

#[derive(Debug, Clone)]
enum ProviderSource {
    Fixed(Option<ProviderHandle>),
    Live(ConnectionReader),
}

/// Action client. The provider is looked up on every call, so a client built
/// over a store picks up a provider that arrives after it was created.
#[derive(Debug, Clone)]
pub struct WalletActions {
    source: ProviderSource,
}

impl WalletActions {
    /// Client bound to one provider handle.
    pub fn new(provider: Option<ProviderHandle>) -> Self {
        Self {
            source: ProviderSource::Fixed(provider),
        }
    }

    /// Client that reads the provider slot of a connection store.
    pub fn from_store(reader: ConnectionReader) -> Self {
        Self {
            source: ProviderSource::Live(reader),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider().is_ok()
    }

    fn provider(&self) -> Result<ProviderHandle, ActionError> {
        let provider = match &self.source {
            ProviderSource::Fixed(provider) => provider.clone(),
            ProviderSource::Live(reader) => reader.provider(),
        };
        provider.ok_or(ActionError::ProviderUnavailable)
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, ActionError> {
        self.provider()?
            .request(method, params)
            .await
            .map_err(ProviderError::into_action_error)
    }

    /// `personal_sign` over the UTF-8 bytes of `message`.
    pub async fn request_signature(
        &self,
        address: Address,
        message: &str,
    ) -> Result<Signature, ActionError> {
        let data = hex::encode_prefixed(message.as_bytes());
        let result = self
            .call(methods::PERSONAL_SIGN, json!([data, address]))
            .await?;
        wire::parse_signature(&result)
    }

    /// Latest balance of `address`, exact to the wei.
    pub async fn read_balance(&self, address: Address) -> Result<Wei, ActionError> {
        let result = self
            .call(methods::ETH_GET_BALANCE, json!([address, "latest"]))
            .await?;
        wire::parse_balance(&result)
    }

    /// Balance formatted in ether, for display.
    pub async fn read_balance_ether(&self, address: Address) -> Result<String, ActionError> {
        Ok(self.read_balance(address).await?.to_ether_string())
    }

    /// Send `amount` from `address` back to itself.
    pub async fn submit_transaction(
        &self,
        address: Address,
        amount: Wei,
    ) -> Result<TxHandle, ActionError> {
        self.submit_transaction_to(address, address, amount).await
    }

    /// Send `amount` from `from` to `to`.
    pub async fn submit_transaction_to(
        &self,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TxHandle, ActionError> {
        if amount.is_zero() {
            return Err(ActionError::InvalidAmount(
                "transaction amount must be greater than zero".into(),
            ));
        }
        let tx = json!({
            "from": from,
            "to": to,
            "value": amount.to_hex_quantity(),
        });
        let result = self.call(methods::ETH_SEND_TRANSACTION, json!([tx])).await?;
        wire::parse_tx_handle(&result)
    }

    /// Ask the wallet to switch to `chain`.
    pub async fn switch_network(&self, chain: &Chain) -> Result<(), ActionError> {
        self.call(
            methods::WALLET_SWITCH_ETHEREUM_CHAIN,
            json!([{ "chainId": chain.id.to_hex() }]),
        )
        .await
        .map(|_| ())
        .map_err(|e| match e {
            ActionError::ProviderUnavailable => e,
            other => ActionError::NetworkSwitchFailed(other.to_string()),
        })
    }

    /// Receipt for `hash`, or `None` while the transaction is pending.
    pub async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, ActionError> {
        let result = self
            .call(methods::ETH_GET_TRANSACTION_RECEIPT, json!([hash]))
            .await?;
        wire::parse_receipt(&result)
    }
}
