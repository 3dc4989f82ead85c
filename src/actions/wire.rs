//! Adapters from raw provider results to typed values.
//!
//! Providers disagree on result shapes (a transaction may come back as a bare
//! hash or as an object). Each result kind is normalised in exactly one place.

use std::str::FromStr;

use serde_json::Value;

use crate::actions::{Receipt, TxHandle};
use crate::error::ActionError;
use crate::shared::{Signature, TxHash, Wei};

/// Keys a transaction object may carry its hash under, in lookup order.
const TX_HASH_KEYS: [&str; 3] = ["hash", "transactionHash", "txHash"];

pub fn parse_signature(value: &Value) -> Result<Signature, ActionError> {
    match value.as_str() {
        Some(s) if !s.is_empty() => Ok(Signature::new(s)),
        _ => Err(ActionError::MalformedResponse(format!(
            "expected signature string, got {}",
            value
        ))),
    }
}

/// Balances arrive as hex quantities; some providers return decimal strings
/// or plain JSON numbers.
pub fn parse_balance(value: &Value) -> Result<Wei, ActionError> {
    match value {
        Value::String(s) => Wei::parse(s)
            .map_err(|e| ActionError::MalformedResponse(format!("balance: {}", e))),
        Value::Number(n) => n.as_u64().map(Wei::from).ok_or_else(|| {
            ActionError::MalformedResponse(format!("balance is not an unsigned integer: {}", n))
        }),
        other => Err(ActionError::MalformedResponse(format!(
            "expected balance quantity, got {}",
            other
        ))),
    }
}

pub fn parse_tx_handle(value: &Value) -> Result<TxHandle, ActionError> {
    let raw = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => TX_HASH_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    };

    let raw = raw.ok_or_else(|| {
        ActionError::MalformedResponse(format!("no transaction hash in {}", value))
    })?;
    let hash = parse_hash(raw)?;
    Ok(TxHandle { hash })
}

/// `null` means "not mined yet".
pub fn parse_receipt(value: &Value) -> Result<Option<Receipt>, ActionError> {
    if value.is_null() {
        return Ok(None);
    }
    let obj = value.as_object().ok_or_else(|| {
        ActionError::MalformedResponse(format!("expected receipt object, got {}", value))
    })?;

    let hash = obj
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| ActionError::MalformedResponse("receipt without transactionHash".into()))
        .and_then(parse_hash)?;

    // Pre-Byzantium receipts carry no status; treat them as successful.
    let success = match obj.get("status").and_then(Value::as_str) {
        Some(status) => parse_quantity(status)? == 1,
        None => true,
    };

    let block_number = match obj.get("blockNumber").and_then(Value::as_str) {
        Some(n) => Some(parse_quantity(n)?),
        None => None,
    };

    Ok(Some(Receipt {
        hash,
        success,
        block_number,
    }))
}

fn parse_hash(raw: &str) -> Result<TxHash, ActionError> {
    TxHash::from_str(raw)
        .map_err(|e| ActionError::MalformedResponse(format!("invalid transaction hash '{}': {}", raw, e)))
}

fn parse_quantity(raw: &str) -> Result<u64, ActionError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ActionError::MalformedResponse(format!("invalid quantity '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    #[test]
    fn test_tx_handle_from_bare_string() {
        let handle = parse_tx_handle(&json!(HASH)).unwrap();
        assert_eq!(handle.hash, TxHash::from_str(HASH).unwrap());
    }

    #[test]
    fn test_tx_handle_from_object_shapes() {
        for key in ["hash", "transactionHash", "txHash"] {
            let handle = parse_tx_handle(&json!({ key: HASH, "other": 1 })).unwrap();
            assert_eq!(handle.hash, TxHash::from_str(HASH).unwrap(), "key {key}");
        }
    }

    #[test]
    fn test_tx_handle_rejects_other_shapes() {
        for value in [json!(null), json!(42), json!({"id": HASH}), json!("0x1234")] {
            assert!(
                matches!(parse_tx_handle(&value), Err(ActionError::MalformedResponse(_))),
                "{value}"
            );
        }
    }

    #[test]
    fn test_parse_balance_shapes() {
        assert_eq!(parse_balance(&json!("0xf4240")).unwrap(), Wei::from(1_000_000u64));
        assert_eq!(parse_balance(&json!("1000000")).unwrap(), Wei::from(1_000_000u64));
        assert_eq!(parse_balance(&json!(10)).unwrap(), Wei::from(10u64));
        assert!(parse_balance(&json!(-1)).is_err());
        assert!(parse_balance(&json!(null)).is_err());
    }

    #[test]
    fn test_parse_signature() {
        assert_eq!(parse_signature(&json!("0xdead")).unwrap().as_str(), "0xdead");
        assert!(parse_signature(&json!("")).is_err());
        assert!(parse_signature(&json!({"sig": "0x"})).is_err());
    }

    #[test]
    fn test_parse_receipt() {
        assert_eq!(parse_receipt(&json!(null)).unwrap(), None);

        let mined = parse_receipt(&json!({
            "transactionHash": HASH,
            "status": "0x1",
            "blockNumber": "0x10",
        }))
        .unwrap()
        .unwrap();
        assert!(mined.success);
        assert_eq!(mined.block_number, Some(16));

        let reverted = parse_receipt(&json!({ "transactionHash": HASH, "status": "0x0" }))
            .unwrap()
            .unwrap();
        assert!(!reverted.success);
        assert_eq!(reverted.block_number, None);
    }
}
