//! Pure quote engine for the constant-product pool.
//!
//! All arithmetic is integer, in minor units, with u128 intermediates and
//! floor division. The swap fee is taken from the input side, matching the
//! V4 program. No I/O happens here.

use crate::error::QuoteError;
use crate::pool::PoolInfo;

/// Rational slippage tolerance. The run uses 100/100 — the full adverse
/// deviation is tolerated, a deliberately wide setting preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slippage {
    pub numerator: u64,
    pub denominator: u64,
}

impl Slippage {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }
}

/// Quote for a fixed input amount (buy direction: WSOL in, token out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardQuote {
    pub amount_out: u64,
    /// Worst acceptable output under the slippage tolerance
    pub min_amount_out: u64,
}

/// Quote for a fixed output amount (same direction, input bounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseQuote {
    pub amount_in: u64,
    /// Worst acceptable input under the slippage tolerance
    pub max_amount_in: u64,
}

fn check_common(pool: &PoolInfo, amount: u64, slippage: Slippage) -> Result<(), QuoteError> {
    if amount == 0 {
        return Err(QuoteError::ZeroAmount);
    }
    if pool.base_reserve == 0 || pool.quote_reserve == 0 {
        return Err(QuoteError::EmptyReserves);
    }
    if slippage.denominator == 0 {
        return Err(QuoteError::BadSlippage);
    }
    if pool.fee_denominator == 0 || pool.fee_numerator >= pool.fee_denominator {
        return Err(QuoteError::BadFee {
            numerator: pool.fee_numerator,
            denominator: pool.fee_denominator,
        });
    }
    Ok(())
}

/// Amount of token received for `amount_in` lamports, and the
/// slippage-adjusted minimum.
pub fn compute_amount_out(
    pool: &PoolInfo,
    amount_in: u64,
    slippage: Slippage,
) -> Result<ForwardQuote, QuoteError> {
    check_common(pool, amount_in, slippage)?;

    let fee_num = pool.fee_numerator as u128;
    let fee_den = pool.fee_denominator as u128;
    let reserve_in = pool.quote_reserve as u128;
    let reserve_out = pool.base_reserve as u128;

    let amount_in_less_fee = amount_in as u128 * (fee_den - fee_num) / fee_den;
    let amount_out = reserve_out * amount_in_less_fee / (reserve_in + amount_in_less_fee);

    let min_amount_out = amount_out * slippage.denominator as u128
        / (slippage.denominator as u128 + slippage.numerator as u128);

    Ok(ForwardQuote {
        amount_out: u64::try_from(amount_out).map_err(|_| QuoteError::Overflow)?,
        min_amount_out: u64::try_from(min_amount_out).map_err(|_| QuoteError::Overflow)?,
    })
}

/// Lamports required to receive exactly `amount_out` tokens, and the
/// slippage-adjusted maximum.
pub fn compute_amount_in(
    pool: &PoolInfo,
    amount_out: u64,
    slippage: Slippage,
) -> Result<ReverseQuote, QuoteError> {
    check_common(pool, amount_out, slippage)?;

    if amount_out >= pool.base_reserve {
        return Err(QuoteError::InsufficientLiquidity {
            requested: amount_out,
            available: pool.base_reserve,
        });
    }

    let fee_num = pool.fee_numerator as u128;
    let fee_den = pool.fee_denominator as u128;
    let reserve_in = pool.quote_reserve as u128;
    let reserve_out = pool.base_reserve as u128;

    let amount_in_less_fee = reserve_in * amount_out as u128 / (reserve_out - amount_out as u128);
    let amount_in = amount_in_less_fee * fee_den / (fee_den - fee_num);

    let max_amount_in = amount_in
        * (slippage.denominator as u128 + slippage.numerator as u128)
        / slippage.denominator as u128;

    Ok(ReverseQuote {
        amount_in: u64::try_from(amount_in).map_err(|_| QuoteError::Overflow)?,
        max_amount_in: u64::try_from(max_amount_in).map_err(|_| QuoteError::Overflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(base: u64, quote: u64) -> PoolInfo {
        PoolInfo {
            base_reserve: base,
            quote_reserve: quote,
            fee_numerator: 25,
            fee_denominator: 10_000,
        }
    }

    #[test]
    fn test_fee_adjusted_output_on_balanced_pool() {
        // 1:1 reserves, 0.25% fee, 100_000 lamports in: output must be below
        // the fee-adjusted input (99_750) and above zero.
        let p = pool(1_000_000_000, 1_000_000_000);
        let q = compute_amount_out(&p, 100_000, Slippage::new(100, 100)).unwrap();
        assert!(q.amount_out > 0);
        assert!(q.amount_out < 99_750);
        assert!(q.min_amount_out <= q.amount_out);
    }

    #[test]
    fn test_full_slippage_halves_minimum() {
        let p = pool(1_000_000_000, 1_000_000_000);
        let q = compute_amount_out(&p, 100_000, Slippage::new(100, 100)).unwrap();
        assert_eq!(q.min_amount_out, q.amount_out / 2);
    }

    #[test]
    fn test_zero_amount_is_an_error() {
        let p = pool(1_000_000_000, 1_000_000_000);
        assert_eq!(
            compute_amount_out(&p, 0, Slippage::new(1, 100)),
            Err(QuoteError::ZeroAmount)
        );
        assert_eq!(
            compute_amount_in(&p, 0, Slippage::new(1, 100)),
            Err(QuoteError::ZeroAmount)
        );
    }

    #[test]
    fn test_empty_reserves_are_an_error() {
        assert_eq!(
            compute_amount_out(&pool(0, 1), 10, Slippage::new(1, 100)),
            Err(QuoteError::EmptyReserves)
        );
        assert_eq!(
            compute_amount_out(&pool(1, 0), 10, Slippage::new(1, 100)),
            Err(QuoteError::EmptyReserves)
        );
    }

    #[test]
    fn test_reverse_requires_available_liquidity() {
        let p = pool(1_000, 1_000_000);
        assert!(matches!(
            compute_amount_in(&p, 1_000, Slippage::new(1, 100)),
            Err(QuoteError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_degenerate_fee_is_an_error() {
        let mut p = pool(1_000_000, 1_000_000);
        p.fee_denominator = 0;
        assert!(matches!(
            compute_amount_out(&p, 10, Slippage::new(1, 100)),
            Err(QuoteError::BadFee { .. })
        ));
    }

    #[test]
    fn test_zero_slippage_denominator_is_an_error() {
        let p = pool(1_000_000, 1_000_000);
        assert_eq!(
            compute_amount_out(&p, 10, Slippage::new(1, 0)),
            Err(QuoteError::BadSlippage)
        );
    }

    proptest! {
        /// Reverse-quoting the forward quote's output never requires more
        /// input than was originally offered.
        #[test]
        fn prop_round_trip_input_bound(
            base in 1_000_000u64..1_000_000_000_000,
            quote in 1_000_000u64..1_000_000_000_000,
            amount_in in 1_000u64..1_000_000_000,
        ) {
            let p = pool(base, quote);
            let slippage = Slippage::new(100, 100);
            let forward = compute_amount_out(&p, amount_in, slippage).unwrap();
            prop_assume!(forward.amount_out > 0);

            let reverse = compute_amount_in(&p, forward.amount_out, slippage).unwrap();
            prop_assert!(reverse.amount_in <= amount_in);
            prop_assert!(reverse.amount_in <= reverse.max_amount_in);
        }

        /// A wider tolerance never improves the worst-case output.
        #[test]
        fn prop_slippage_monotonicity(
            base in 1_000_000u64..1_000_000_000_000,
            quote in 1_000_000u64..1_000_000_000_000,
            amount_in in 1_000u64..1_000_000_000,
            s1 in 0u64..500,
            widen in 1u64..500,
        ) {
            let p = pool(base, quote);
            let narrow = compute_amount_out(&p, amount_in, Slippage::new(s1, 100)).unwrap();
            let wide = compute_amount_out(&p, amount_in, Slippage::new(s1 + widen, 100)).unwrap();
            prop_assert!(wide.min_amount_out <= narrow.min_amount_out);
            prop_assert_eq!(wide.amount_out, narrow.amount_out);
        }

        /// Invariants from the data model: the slippage bound is always on
        /// the adverse side.
        #[test]
        fn prop_quote_invariants(
            base in 1_000u64..1_000_000_000_000,
            quote in 1_000u64..1_000_000_000_000,
            amount in 1u64..1_000_000_000,
            num in 0u64..1_000,
        ) {
            let p = pool(base, quote);
            let slippage = Slippage::new(num, 100);
            let forward = compute_amount_out(&p, amount, slippage).unwrap();
            prop_assert!(forward.min_amount_out <= forward.amount_out);

            // Near-total drains may overflow u64; the invariant applies to
            // every quote the engine actually produces.
            if amount < base {
                if let Ok(reverse) = compute_amount_in(&p, amount, slippage) {
                    prop_assert!(reverse.amount_in <= reverse.max_amount_in);
                }
            }
        }
    }
}
