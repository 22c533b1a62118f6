//! Even splitting and dust coalescing
//!
//! Two value-preserving list surgeries used when change is reshaped:
//! [`split_coin`] spreads a coin evenly over a list, and
//! [`coalesce_dust`] removes dust coins and folds their value back into
//! the survivors.

use crate::coin::{Coin, DustThreshold};

/// Add `value`, split as evenly as possible, to the coins of `coins`.
///
/// With `n` coins, each receives `value div n`, and the remainder is
/// handed out one unit at a time to the last coins of the list, so
/// per-coin increments differ by at most one. With no coins at all, a
/// positive `value` becomes a singleton list and a zero value vanishes:
///
/// - `split_coin(10, [1,1,1,1])` = `[3,3,4,4]`
/// - `split_coin(10, [])` = `[10]`
/// - `split_coin(0, [])` = `[]`
///
/// The total of the result always exceeds the total of `coins` by exactly
/// `value`.
pub fn split_coin(value: Coin, coins: &[Coin]) -> Vec<Coin> {
    if coins.is_empty() {
        return if value.is_zero() {
            Vec::new()
        } else {
            vec![value]
        };
    }
    let parts = coins.len() as u64;
    // Non-zero length, so the division cannot fail.
    let (quotient, remainder) = match value.div_rem(parts) {
        Some(result) => result,
        None => return coins.to_vec(),
    };
    let first_bonus = coins.len() - remainder.to_u64() as usize;
    coins
        .iter()
        .enumerate()
        .map(|(index, coin)| {
            let bonus = if index >= first_bonus {
                Coin::new(1)
            } else {
                Coin::ZERO
            };
            coin.saturating_add(quotient).saturating_add(bonus)
        })
        .collect()
}

/// Remove dust coins and redistribute their combined value over the
/// surviving coins.
///
/// Coins at or below the threshold are dropped; their total is split
/// evenly over the remaining coins via [`split_coin`]. The total value of
/// the list is preserved. When every coin is dust, the entire value
/// collapses into a single coin (which may itself still be dust); the
/// result is empty only when the dust total is zero.
///
/// # Panics
///
/// Panics on an empty input list: dust coalescing is only meaningful for
/// a change list that exists.
pub fn coalesce_dust(threshold: DustThreshold, coins: &[Coin]) -> Vec<Coin> {
    assert!(
        !coins.is_empty(),
        "dust coalescing requires a non-empty coin list"
    );
    let (keep, drop): (Vec<Coin>, Vec<Coin>) = coins
        .iter()
        .copied()
        .partition(|coin| !threshold.is_dust(*coin));
    let dust_total: Coin = drop.iter().sum();
    split_coin(dust_total, &keep)
}
