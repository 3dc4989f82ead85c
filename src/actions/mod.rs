//! Wallet actions: signature, balance, transaction, network switch, receipt.

pub mod client;
pub mod wire;

pub use client::WalletActions;

use serde::Serialize;

use crate::shared::TxHash;

/// A submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TxHandle {
    pub hash: TxHash,
}

/// The parts of a transaction receipt the flow looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}
