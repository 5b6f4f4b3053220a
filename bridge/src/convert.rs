//! Pure conversion arithmetic.

use serde::Serialize;

use remitbridge_common::{Amount, BasisPoints, Rate};

use crate::error::{BridgeError, BridgeResult};

/// Outcome of the conversion arithmetic, before any ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Target amount before the fee is taken.
    pub gross: Amount,
    /// Target amount credited to the requester.
    pub output: Amount,
    /// Fee carved out of the gross target amount.
    pub fee: Amount,
}

/// Convert `amount` at `rate`, taking `fee_bps` of the gross output.
///
/// All rounding is integer truncation toward zero; nothing is ever rounded
/// up. Pure and deterministic: identical inputs always yield an identical
/// [`Quote`].
pub fn convert(amount: Amount, rate: Rate, fee_bps: BasisPoints) -> BridgeResult<Quote> {
    if amount.is_zero() {
        return Err(BridgeError::InvalidAmount);
    }

    let gross = rate.apply(amount).ok_or(BridgeError::AmountOverflow)?;
    let fee = fee_bps.apply(gross).ok_or(BridgeError::AmountOverflow)?;
    let output = gross.checked_sub(fee).ok_or(BridgeError::AmountOverflow)?;

    Ok(Quote { gross, output, fee })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use remitbridge_common::SCALE_FACTOR;

    #[test]
    fn test_reference_example() {
        // 1.0 source at rate 0.9 with a 0.5% fee
        let quote = convert(
            Amount::from_raw(1_000_000),
            Rate::from_raw(900_000),
            BasisPoints::new(50),
        )
        .unwrap();

        assert_eq!(quote.gross, Amount::from_raw(900_000));
        assert_eq!(quote.fee, Amount::from_raw(4_500));
        assert_eq!(quote.output, Amount::from_raw(895_500));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let result = convert(Amount::ZERO, Rate::ONE, BasisPoints::ZERO);
        assert!(matches!(result, Err(BridgeError::InvalidAmount)));
    }

    #[test]
    fn test_truncation_toward_zero() {
        // 3 raw units at 0.333333 truncate to zero output
        let quote = convert(
            Amount::from_raw(3),
            Rate::from_raw(333_333),
            BasisPoints::new(500),
        )
        .unwrap();
        assert_eq!(quote.gross, Amount::ZERO);
        assert_eq!(quote.fee, Amount::ZERO);
        assert_eq!(quote.output, Amount::ZERO);
    }

    #[test]
    fn test_zero_fee_passes_gross_through() {
        let quote = convert(
            Amount::from_units(100).unwrap(),
            Rate::from_raw(920_000),
            BasisPoints::ZERO,
        )
        .unwrap();
        assert_eq!(quote.output, quote.gross);
        assert_eq!(quote.fee, Amount::ZERO);
    }

    #[test]
    fn test_overflow_is_reported() {
        let result = convert(
            Amount::from_raw(u64::MAX),
            Rate::from_raw(2_000_000),
            BasisPoints::ZERO,
        );
        assert!(matches!(result, Err(BridgeError::AmountOverflow)));
    }

    proptest! {
        #[test]
        fn convert_is_deterministic_and_consistent(
            amount in 1u64..=1_000_000_000_000u64,
            rate in 1u64..=10_000_000u64,
            bps in 0u32..=500u32,
        ) {
            let quote = convert(
                Amount::from_raw(amount),
                Rate::from_raw(rate),
                BasisPoints::new(bps),
            )
            .unwrap();

            let expected_gross = ((amount as u128 * rate as u128)
                / SCALE_FACTOR as u128) as u64;
            prop_assert_eq!(quote.gross.raw(), expected_gross);

            // The fee never exceeds the gross output and the split is exact
            prop_assert!(quote.fee.raw() <= quote.gross.raw());
            prop_assert_eq!(
                quote.output.raw() + quote.fee.raw(),
                quote.gross.raw()
            );

            let again = convert(
                Amount::from_raw(amount),
                Rate::from_raw(rate),
                BasisPoints::new(bps),
            )
            .unwrap();
            prop_assert_eq!(again, quote);
        }
    }
}
