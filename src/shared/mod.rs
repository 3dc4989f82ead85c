//! Shared newtypes used across all modules.
//!
//! Amounts are always exact integers in wei. Ether strings exist only for
//! display and for parsing human-entered constants.

pub mod fmt;

pub use alloy_primitives::{hex, Address, TxHash, U256};
pub use fmt::{format_ether, truncate_address};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Wei per ether (10^18).
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Decimal places of the native ether unit.
pub const ETHER_DECIMALS: usize = 18;

// ─── Wei ─────────────────────────────────────────────────────────────────────

/// An exact amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(U256);

/// Errors that can occur while parsing an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount '{input}': {reason}")]
    Invalid { input: String, reason: String },
    #[error("Too many decimal places in '{0}' (max 18)")]
    TooPrecise(String),
    #[error("Amount overflow: {0}")]
    Overflow(String),
}

impl Wei {
    pub const ZERO: Wei = Wei(U256::ZERO);

    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a quantity as returned by a node: `0x`-prefixed hex or plain decimal.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (digits, radix) = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (trimmed, 10),
        };
        if digits.is_empty() {
            return Err(AmountError::Empty);
        }

        U256::from_str_radix(digits, radix)
            .map(Wei)
            .map_err(|e| AmountError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse a decimal ether string (`"0.0001"`) into wei, without rounding.
    pub fn from_ether_str(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        if frac_part.len() > ETHER_DECIMALS {
            return Err(AmountError::TooPrecise(input.to_string()));
        }
        let invalid = |reason: &str| AmountError::Invalid {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("no digits"));
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected digits and at most one '.'"));
        }

        let int_value = if int_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_part, 10).map_err(|e| invalid(&e.to_string()))?
        };
        let padded = format!("{:0<width$}", frac_part, width = ETHER_DECIMALS);
        let frac_value = U256::from_str_radix(&padded, 10).map_err(|e| invalid(&e.to_string()))?;

        int_value
            .checked_mul(U256::from(WEI_PER_ETHER))
            .and_then(|v| v.checked_add(frac_value))
            .map(Wei)
            .ok_or_else(|| AmountError::Overflow(input.to_string()))
    }

    /// `floor(self * (100 - reserve_percent) / 100)`.
    ///
    /// Split into quotient and remainder so the multiplication can never
    /// overflow, whatever the balance.
    pub fn after_reserve(&self, reserve_percent: u8) -> Wei {
        let keep = U256::from(100 - u64::from(reserve_percent.min(100)));
        let hundred = U256::from(100u64);
        let quotient = self.0 / hundred;
        let remainder = self.0 % hundred;
        Wei(quotient * keep + remainder * keep / hundred)
    }

    /// JSON-RPC quantity encoding: `0x`-prefixed hex, no leading zeros.
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Human-readable ether value (display only).
    pub fn to_ether_string(&self) -> String {
        format_ether(self.0)
    }
}

impl std::fmt::Display for Wei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl From<U256> for Wei {
    fn from(v: U256) -> Self {
        Self(v)
    }
}

impl From<u64> for Wei {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for Wei {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl FromStr for Wei {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Wei::parse(s)
    }
}

// ─── ChainId ─────────────────────────────────────────────────────────────────

/// EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }

    /// `0x`-prefixed hex form used by `wallet_switchEthereumChain`.
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parse the loose shapes connection libraries use for chain ids:
    /// `"11155111"`, `"0xaa36a7"` or CAIP-2 `"eip155:11155111"`.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let reference = trimmed.strip_prefix("eip155:").unwrap_or(trimmed);
        match reference
            .strip_prefix("0x")
            .or_else(|| reference.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16).ok().map(Self),
            None => reference.parse::<u64>().ok().map(Self),
        }
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

// ─── Signature ───────────────────────────────────────────────────────────────

/// A signature exactly as the wallet returned it (usually `0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!(Wei::parse("0xf4240").unwrap(), Wei::from(1_000_000u64));
        assert_eq!(Wei::parse("1000000").unwrap(), Wei::from(1_000_000u64));
        assert_eq!(Wei::parse("0x0").unwrap(), Wei::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Wei::parse(""), Err(AmountError::Empty));
        assert_eq!(Wei::parse("0x"), Err(AmountError::Empty));
        assert!(matches!(Wei::parse("0xzz"), Err(AmountError::Invalid { .. })));
        assert!(matches!(Wei::parse("1.5"), Err(AmountError::Invalid { .. })));
    }

    #[test]
    fn test_parse_keeps_full_precision() {
        // 2^200, far beyond f64 precision.
        let big = U256::from(1u64) << 200usize;
        let hex = format!("0x{:x}", big);
        assert_eq!(Wei::parse(&hex).unwrap().as_u256(), big);
    }

    #[test]
    fn test_from_ether_str() {
        assert_eq!(
            Wei::from_ether_str("0.0001").unwrap(),
            Wei::from(100_000_000_000_000u64)
        );
        assert_eq!(
            Wei::from_ether_str("1").unwrap(),
            Wei::from(WEI_PER_ETHER)
        );
        assert_eq!(
            Wei::from_ether_str(".5").unwrap(),
            Wei::from(WEI_PER_ETHER / 2)
        );
        assert!(matches!(
            Wei::from_ether_str("0.0000000000000000001"),
            Err(AmountError::TooPrecise(_))
        ));
        assert!(matches!(
            Wei::from_ether_str("1e5"),
            Err(AmountError::Invalid { .. })
        ));
    }

    #[test]
    fn test_after_reserve_matches_floor_formula() {
        for balance in [0u64, 1, 10, 19, 20, 99, 100, 101, 1_000_000, 123_456_789] {
            let expected = balance * 95 / 100;
            let actual = Wei::from(balance).after_reserve(5);
            assert_eq!(actual, Wei::from(expected), "balance {balance}");
            assert!(actual <= Wei::from(balance));
        }
    }

    #[test]
    fn test_after_reserve_does_not_overflow() {
        let max = Wei::new(U256::MAX);
        let kept = max.after_reserve(5);
        assert!(kept < max);
        assert_eq!(max.after_reserve(0), max);
        assert_eq!(max.after_reserve(100), Wei::ZERO);
    }

    #[test]
    fn test_chain_id_parse_shapes() {
        assert_eq!(ChainId::parse("11155111"), Some(ChainId::new(11_155_111)));
        assert_eq!(ChainId::parse("0xaa36a7"), Some(ChainId::new(11_155_111)));
        assert_eq!(ChainId::parse("eip155:1"), Some(ChainId::new(1)));
        assert_eq!(ChainId::parse("solana:mainnet"), None);
        assert_eq!(ChainId::new(137).to_hex(), "0x89");
    }
}
