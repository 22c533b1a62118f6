//! Proportional fee distribution
//!
//! Splitting an integer fee across change outputs in proportion to their
//! values cannot be done exactly in general, so the distributor rounds.
//! The rounding is engineered so that the rounded shares still sum to the
//! fee exactly, every share is within one unit of its ideal value, and
//! the result is identical on every platform.

use crate::coin::{Coin, Fee};

/// Distribute `fee` across `coins` in proportion to their values.
///
/// Returns one `(share, coin)` pair per input coin, in the original
/// order. The shares sum to `fee` exactly.
///
/// The ideal share of a coin `c` is the rational `fee * c / total`. Each
/// share is the floor of its ideal value, and the leftover units - one
/// per fractional part lost to flooring - go to the coins with the
/// largest fractional parts. Ties prefer the earlier coin, which makes
/// the rounding fully deterministic.
///
/// All intermediate products use 128-bit integers, so the computation is
/// exact for any pair of 64-bit fee and coin values.
///
/// # Panics
///
/// Panics when `coins` is empty or when the coins sum to zero; callers
/// distribute over the positive change of a selection.
pub fn distribute_fee(fee: Fee, coins: &[Coin]) -> Vec<(Fee, Coin)> {
    assert!(
        !coins.is_empty(),
        "fee distribution requires at least one coin"
    );
    let total: u128 = coins.iter().map(|c| u128::from(c.to_u64())).sum();
    assert!(
        total > 0,
        "fee distribution requires a positive total coin value"
    );

    let fee = u128::from(fee.to_u64());

    // Floor of each ideal share, plus the numerator of its fractional
    // part (all fractions share the denominator `total`, so comparing
    // numerators compares fractions).
    let mut shares: Vec<u64> = Vec::with_capacity(coins.len());
    let mut fractions: Vec<u128> = Vec::with_capacity(coins.len());
    for coin in coins {
        let product = fee * u128::from(coin.to_u64());
        shares.push((product / total) as u64);
        fractions.push(product % total);
    }

    // The flooring shortfall is strictly less than the coin count; hand
    // one leftover unit to each of the coins with the largest fractional
    // parts. The sort is stable, so equal fractions resolve to the
    // earlier original index.
    let floored: u128 = shares.iter().map(|s| u128::from(*s)).sum();
    let shortfall = (fee - floored) as usize;
    let mut order: Vec<usize> = (0..coins.len()).collect();
    order.sort_by(|a, b| fractions[*b].cmp(&fractions[*a]));
    for index in order.into_iter().take(shortfall) {
        shares[index] += 1;
    }

    shares
        .into_iter()
        .zip(coins.iter().copied())
        .map(|(share, coin)| (Fee::new(Coin::new(share)), coin))
        .collect()
}
