//! Conversions between chain integer units and display amounts.
//!
//! Every token carries a fixed-point scaling exponent (`decimals`); the
//! chain side works in scaled `U256` integers while the client works in
//! [`Decimal`] amounts. Display amounts are truncated to at most
//! [`DISPLAY_DP`] fractional digits.

use alloy_primitives::U256;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest supported scaling exponent (standard ERC-20 range).
pub const MAX_DECIMALS: u8 = 18;

/// Fractional digits kept on display amounts.
pub const DISPLAY_DP: u32 = 6;

fn pow10(decimals: u8) -> Decimal {
    Decimal::from(10u64.pow(u32::from(decimals.min(MAX_DECIMALS))))
}

/// Scale a display amount up by `10^decimals` and truncate to an integer.
///
/// Negative or non-representable amounts collapse to zero rather than
/// panicking; callers validate sign before submitting transactions.
#[must_use]
pub fn to_chain_units(amount: Decimal, decimals: u8) -> U256 {
    let scaled = match amount.checked_mul(pow10(decimals)) {
        Some(s) if !s.is_sign_negative() => s,
        _ => return U256::ZERO,
    };
    let units = scaled.trunc().to_string().parse::<u128>().unwrap_or(0);
    U256::from(units)
}

/// Scale chain units down by `10^decimals`, truncated to [`DISPLAY_DP`]
/// fractional digits.
///
/// Values beyond `u128` saturate instead of erroring; balances anywhere
/// near that range are not representable on the display side anyway.
#[must_use]
pub fn from_chain_units(units: U256, decimals: u8) -> Decimal {
    let raw: u128 = units.try_into().unwrap_or(u128::MAX);
    let value = Decimal::from_u128(raw).unwrap_or(Decimal::MAX);
    (value / pow10(decimals)).round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::ToZero)
}

/// The user's share of a pool as a percentage, rounded to two digits.
///
/// A pool with zero supply has no shares outstanding; the share is 0,
/// never a division-by-zero artifact.
#[must_use]
pub fn pool_share_percent(user_pool_balance: Decimal, total_supply: Decimal) -> Decimal {
    if total_supply.is_zero() {
        return Decimal::ZERO;
    }
    (user_pool_balance / total_supply * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scales_up_by_decimals() {
        assert_eq!(to_chain_units(dec!(10), 6), U256::from(10_000_000u64));
        assert_eq!(to_chain_units(dec!(1.5), 18), U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(to_chain_units(dec!(42), 0), U256::from(42u64));
    }

    #[test]
    fn truncates_sub_unit_remainder() {
        // 1.2345678 at 6 decimals: the 7th digit cannot be represented
        assert_eq!(to_chain_units(dec!(1.2345678), 6), U256::from(1_234_567u64));
    }

    #[test]
    fn negative_amounts_collapse_to_zero() {
        assert_eq!(to_chain_units(dec!(-3), 6), U256::ZERO);
    }

    #[test]
    fn scales_down_and_truncates_display_digits() {
        assert_eq!(from_chain_units(U256::from(10_000_000u64), 6), dec!(10));
        // 1.23456789 at 8 decimals displays as 1.234567
        assert_eq!(from_chain_units(U256::from(123_456_789u64), 8), dec!(1.234567));
    }

    #[test]
    fn round_trips_across_supported_decimals() {
        // For every d in 0..=18, an amount carrying at most min(d, 6)
        // fractional digits survives the trip unchanged.
        for d in 0..=MAX_DECIMALS {
            let dp = u32::from(d).min(DISPLAY_DP);
            let amount = dec!(123.456789).round_dp_with_strategy(dp, RoundingStrategy::ToZero);
            let back = from_chain_units(to_chain_units(amount, d), d);
            assert_eq!(back, amount, "round trip failed at decimals = {d}");
        }
    }

    #[test]
    fn round_trip_matches_display_truncation() {
        // With d >= 6 the trip equals the amount truncated to 6 digits.
        let amount = dec!(0.123456789);
        let back = from_chain_units(to_chain_units(amount, 18), 18);
        assert_eq!(back, dec!(0.123456));
    }

    #[test]
    fn zero_supply_share_is_zero() {
        assert_eq!(pool_share_percent(dec!(50), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn share_percent_rounds_to_two_digits() {
        assert_eq!(pool_share_percent(dec!(50), dec!(1000)), dec!(5.00));
        assert_eq!(pool_share_percent(dec!(1), dec!(3)), dec!(33.33));
    }
}
