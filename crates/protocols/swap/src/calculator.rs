//! Swap Calculator
//!
//! Basis-point arithmetic for the fee split, slippage floor, deadline and
//! native affordability. All integer math in smallest units, floor division.

use alloy_primitives::U256;
use toby_core::{constants::BPS_DENOMINATOR, SwapError};

use crate::constants::fees::MAX_FEE_BPS;

/// `floor(amount * bps / 10000)` without overflow for any `amount`.
///
/// Splits `amount` into whole and remainder parts of the denominator so no
/// intermediate exceeds `amount` or `10000^2`. `bps` is clamped to 10000.
fn apply_bps(amount: U256, bps: u64) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let bps = U256::from(bps.min(BPS_DENOMINATOR));
    let whole = amount / denominator;
    let rem = amount % denominator;
    whole * bps + rem * bps / denominator
}

/// Amount routed through the main leg: `amount * (10000 - fee) / 10000`
pub fn net_amount(amount_in: U256, fee_bps: u64) -> U256 {
    apply_bps(amount_in, BPS_DENOMINATOR - fee_bps.min(BPS_DENOMINATOR))
}

/// Protocol fee carved out of the input: `amount * fee / 10000`
pub fn fee_amount(amount_in: U256, fee_bps: u64) -> U256 {
    apply_bps(amount_in, fee_bps)
}

/// Minimum acceptable output after slippage.
///
/// `force_zero` returns zero regardless of the quote and disables slippage
/// protection entirely.
pub fn min_output(quoted: U256, slippage_bps: u64, force_zero: bool) -> U256 {
    if force_zero {
        return U256::ZERO;
    }
    apply_bps(quoted, BPS_DENOMINATOR - slippage_bps.min(BPS_DENOMINATOR))
}

/// Unix deadline `now + window`
pub fn deadline(now_secs: u64, window_secs: u64) -> U256 {
    U256::from(now_secs.saturating_add(window_secs))
}

/// Current Unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Trust the contract's fee only within `0..=MAX_FEE_BPS`
pub fn sanitize_fee_bps(raw: U256, fallback_bps: u64) -> u64 {
    if raw > U256::from(MAX_FEE_BPS) {
        tracing::warn!(raw = %raw, fallback_bps, "feeBps out of range, using fallback");
        return fallback_bps.min(MAX_FEE_BPS);
    }
    raw.saturating_to::<u64>()
}

/// Reject slippage above the configured ceiling
pub fn validate_slippage(slippage_bps: u64, max_bps: u64) -> Result<(), SwapError> {
    if slippage_bps > max_bps.min(BPS_DENOMINATOR) {
        return Err(SwapError::InvalidSlippage {
            bps: slippage_bps,
            max_bps,
        });
    }
    Ok(())
}

/// Native needed to submit: `value + gas * gas_price`
pub fn required_native(value: U256, gas: u64, gas_price: u128) -> U256 {
    value.saturating_add(U256::from(gas).saturating_mul(U256::from(gas_price)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_output_example() {
        let quoted = U256::from(1_000_000u64);
        assert_eq!(min_output(quoted, 100, false), U256::from(990_000u64));
    }

    #[test]
    fn test_min_output_zero_slippage_is_identity() {
        let quoted = U256::from(123_456_789u64);
        assert_eq!(min_output(quoted, 0, false), quoted);
    }

    #[test]
    fn test_min_output_strictly_decreasing() {
        let quoted = U256::from(1_000_000u64);
        let mut previous = min_output(quoted, 0, false);
        for slippage in 1..=5_000u64 {
            let current = min_output(quoted, slippage, false);
            assert!(current < previous, "not decreasing at {} bps", slippage);
            previous = current;
        }
    }

    #[test]
    fn test_min_output_force_zero() {
        assert_eq!(min_output(U256::from(1_000u64), 100, true), U256::ZERO);
    }

    #[test]
    fn test_fee_split() {
        let amount = U256::from(1_000_000u64);
        assert_eq!(net_amount(amount, 100), U256::from(990_000u64));
        assert_eq!(fee_amount(amount, 100), U256::from(10_000u64));
        assert_eq!(net_amount(amount, 0), amount);
        assert_eq!(fee_amount(amount, 0), U256::ZERO);
        // floor on both legs
        assert_eq!(net_amount(U256::from(999u64), 100), U256::from(989u64));
        assert_eq!(fee_amount(U256::from(999u64), 100), U256::from(9u64));
    }

    #[test]
    fn test_fee_split_near_u256_max() {
        for amount in [U256::MAX / U256::from(100u64), U256::MAX] {
            let net = net_amount(amount, 100);
            let fee = fee_amount(amount, 100);
            assert!(net > fee);
            assert!(net + fee <= amount);
            assert_eq!(fee, amount / U256::from(100u64));
            // 99% of the input, floored
            assert!(amount - net - fee < U256::from(2u64));
        }
    }

    #[test]
    fn test_min_output_near_u256_max() {
        let quoted = U256::MAX;
        let min = min_output(quoted, 100, false);
        assert!(min < quoted);
        assert!(min > quoted / U256::from(100u64) * U256::from(98u64));
        assert_eq!(min_output(quoted, 0, false), quoted);
    }

    #[test]
    fn test_sanitize_fee_bps() {
        assert_eq!(sanitize_fee_bps(U256::from(25u64), 100), 25);
        assert_eq!(sanitize_fee_bps(U256::from(500u64), 100), 500);
        assert_eq!(sanitize_fee_bps(U256::from(501u64), 100), 100);
        assert_eq!(sanitize_fee_bps(U256::MAX, 100), 100);
    }

    #[test]
    fn test_validate_slippage() {
        assert!(validate_slippage(100, 5_000).is_ok());
        assert!(validate_slippage(5_000, 5_000).is_ok());
        assert!(matches!(
            validate_slippage(5_001, 5_000),
            Err(SwapError::InvalidSlippage { bps: 5_001, .. })
        ));
    }

    #[test]
    fn test_deadline_and_required_native() {
        assert_eq!(deadline(1_700_000_000, 600), U256::from(1_700_000_600u64));
        assert_eq!(
            required_native(U256::from(10u64), 21_000, 2),
            U256::from(42_010u64)
        );
    }
}
