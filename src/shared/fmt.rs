//! Display helpers. Never used for arithmetic.

use alloy_primitives::U256;

use super::{ETHER_DECIMALS, WEI_PER_ETHER};

/// Format a wei amount as ether, trimming trailing zeros (`950000` → `"0.00000000000095"`).
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(WEI_PER_ETHER);
    let integer = wei / unit;
    let fraction = wei % unit;

    if fraction.is_zero() {
        return integer.to_string();
    }

    let frac_str = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
    format!("{}.{}", integer, frac_str.trim_end_matches('0'))
}

/// Shorten an address for display: `0x1234...abcd`.
///
/// Strings too short to shorten are returned unchanged.
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_char_boundary(6) {
        return address.to_string();
    }
    let tail_start = address.len() - 4;
    if !address.is_char_boundary(tail_start) {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[tail_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ether_whole_and_fractional() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(U256::from(WEI_PER_ETHER)), "1");
        assert_eq!(format_ether(U256::from(WEI_PER_ETHER / 2)), "0.5");
        assert_eq!(format_ether(U256::from(950_000u64)), "0.00000000000095");
        assert_eq!(
            format_ether(U256::from(WEI_PER_ETHER) * U256::from(3u64) + U256::from(1u64)),
            "3.000000000000000001"
        );
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0x52908400098527886E0F7030069857D2E4169EE7"),
            "0x5290...9EE7"
        );
        assert_eq!(truncate_address("0x1234"), "0x1234");
    }
}
