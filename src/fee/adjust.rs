//! The iterative fee adjuster
//!
//! # Overview
//!
//! [`adjust_for_fee`] receives a balanced selection draft (inputs covering
//! outputs and change) and iterates towards the fixed point where the
//! implicit fee equals the estimated fee:
//!
//! 1. estimate the fee of the current draft
//! 2. make the change outputs pay it
//! 3. measure the residual between the implicit fee of the reduced draft
//!    and a fresh estimate
//! 4. when change alone could not absorb the fee, recruit extra inputs at
//!    random from the caller's pool, fold their value into fresh change,
//!    and go again
//!
//! Each pass either terminates or removes at least one entry from the
//! pool, so the loop runs at most `pool size + 1` times.
//!
//! # The dangling-change decision
//!
//! A draft can end up with a surplus too small to be worth keeping: the
//! estimator would charge more for carrying an extra change output than
//! the surplus is worth. The adjuster then keeps the reduced draft as-is
//! and lets the surplus go to the network as extra fee. This is the only
//! branch where the result's implicit fee intentionally exceeds the
//! estimate.
//!
//! # State
//!
//! The iteration state is exactly `(selection, pool)`, two owned values
//! threaded through the loop. The pool is surrendered by the caller on
//! entry and shrinks monotonically as entries are drawn.

use crate::coin::{Coin, Fee};
use crate::error::FeeError;
use crate::fee::dust::split_coin;
use crate::fee::reduce::reduce_change_outputs;
use crate::fee::{calculate_fee, FeeEstimator, FeeOptions};
use crate::logging::{log_fee, LogLevel};
use crate::random::RandomSource;
use crate::selection::{CoinMap, CoinMapEntry, CoinSelection};
use serde_json::json;
use std::fmt::Debug;

/// What a reduced draft still owes, if anything.
enum FeeResidual {
    /// The implicit fee matches the estimate exactly.
    Balanced,
    /// The draft still owes this much; more inputs are needed.
    Needed(Fee),
    /// The draft overpays, but a change output for the surplus would cost
    /// more than the surplus itself. Terminal.
    DanglingChange,
}

/// Adjust a selection until its implicit fee pays the estimated fee.
///
/// `extra_utxo` is the pool of wallet entries not already consumed by the
/// selection; the adjuster draws from it uniformly at random whenever the
/// existing change cannot absorb the estimated fee. Ownership of the pool
/// transfers to the adjuster; entries left undrawn are dropped with it.
///
/// On success, the returned selection satisfies
/// `inputs = outputs + change + estimate(result)` exactly (or overpays
/// only in the dangling-change case described in the module docs).
/// Surviving change coins exceed the dust threshold, except that a
/// remainder made entirely of dust collapses into one coin.
///
/// # Errors
///
/// [`FeeError::CannotCoverFee`] when the pool is exhausted before the fee
/// is met; the error carries the uncovered remainder.
///
/// # Panics
///
/// Panics when the estimator returns a zero fee for the input selection -
/// a zero-fee draft needs no adjustment, so such a call is a caller bug.
pub fn adjust_for_fee<I, O, E, R>(
    options: &FeeOptions<E>,
    extra_utxo: CoinMap<I>,
    random: &mut R,
    selection: CoinSelection<I, O>,
) -> Result<CoinSelection<I, O>, FeeError>
where
    I: Ord + Clone + Debug,
    O: Ord + Clone + Debug,
    E: FeeEstimator<I, O>,
    R: RandomSource,
{
    let initial_fee = options.fee_estimator.estimate_fee(&selection);
    assert!(
        !initial_fee.is_zero(),
        "fee adjustment requires a non-zero initial fee estimate; selection: {:?}",
        selection
    );
    sender_pays_fee(options, extra_utxo, random, selection)
}

/// The adjustment loop. Change pays what it can; the pool covers the
/// rest.
fn sender_pays_fee<I, O, E, R>(
    options: &FeeOptions<E>,
    mut pool: CoinMap<I>,
    random: &mut R,
    mut selection: CoinSelection<I, O>,
) -> Result<CoinSelection<I, O>, FeeError>
where
    I: Ord + Clone + Debug,
    O: Ord + Clone + Debug,
    E: FeeEstimator<I, O>,
    R: RandomSource,
{
    loop {
        let upper_bound = options.fee_estimator.estimate_fee(&selection);
        let reduced = selection.clone().with_change(reduce_change_outputs(
            options.dust_threshold,
            upper_bound,
            &selection.change,
        ));
        log_fee(
            LogLevel::Trace,
            "fee_adjustment_iteration",
            Some(json!({
                "upper_bound": upper_bound.to_u64(),
                "pool_size": pool.len(),
                "selection": reduced.summary(),
            })),
        );
        match remaining_fee(options, &reduced) {
            FeeResidual::Balanced => return Ok(reduced),
            FeeResidual::DanglingChange => {
                log_fee(
                    LogLevel::Debug,
                    "fee_adjustment_dangling_change",
                    Some(json!({ "selection": reduced.summary() })),
                );
                return Ok(reduced);
            }
            FeeResidual::Needed(remainder) => {
                let drawn = cover_remaining_fee(remainder.coin(), &mut pool, random)?;
                let drawn_total: Coin = drawn.iter().map(|entry| entry.value).sum();
                // Split over the pre-reduction change: the fresh value
                // re-seeds the absorption capacity the reduction just
                // consumed.
                selection.change = split_coin(drawn_total, &selection.change);
                for entry in drawn {
                    selection.inputs.insert(entry.key, entry.value);
                }
            }
        }
    }
}

/// Measure what a reduced draft still owes.
///
/// `raw` is a fresh estimate for the reduced draft and `actual` its
/// implicit fee. Owing `raw - actual` is the normal case; when the draft
/// instead overpays, the surplus is only worth keeping if a change output
/// carrying it would not cost more than it contains.
fn remaining_fee<I, O, E>(
    options: &FeeOptions<E>,
    selection: &CoinSelection<I, O>,
) -> FeeResidual
where
    I: Ord + Clone + Debug,
    O: Ord + Clone + Debug,
    E: FeeEstimator<I, O>,
{
    let raw = options.fee_estimator.estimate_fee(selection).coin();
    let actual = match calculate_fee(selection) {
        Some(fee) => fee.coin(),
        None => panic!(
            "underfunded selection reached fee measurement; selection: {:?}",
            selection
        ),
    };
    if let Some(needed) = raw.checked_sub(actual) {
        return if needed.is_zero() {
            FeeResidual::Balanced
        } else {
            FeeResidual::Needed(Fee::new(needed))
        };
    }
    // The draft overpays by `actual - raw`. Price a hypothetical change
    // output carrying the surplus.
    let surplus = actual.distance(raw);
    let dangling = options
        .fee_estimator
        .estimate_fee(&selection.clone().with_change(vec![surplus]))
        .coin();
    if dangling >= actual {
        FeeResidual::DanglingChange
    } else {
        panic!(
            "fee estimator produced an unresolvable surplus \
             (estimate {}, implicit fee {}, dangling estimate {}); selection: {:?}",
            raw, actual, dangling, selection
        );
    }
}

/// Draw random pool entries until their combined value covers
/// `remainder`.
fn cover_remaining_fee<I, R>(
    remainder: Coin,
    pool: &mut CoinMap<I>,
    random: &mut R,
) -> Result<Vec<CoinMapEntry<I>>, FeeError>
where
    I: Ord + Clone,
    R: RandomSource,
{
    let mut drawn: Vec<CoinMapEntry<I>> = Vec::new();
    let mut covered = Coin::ZERO;
    while covered < remainder {
        match pool.draw_random(random) {
            Some(entry) => {
                covered = covered.saturating_add(entry.value);
                drawn.push(entry);
            }
            None => {
                let shortfall = remainder.distance(covered);
                log_fee(
                    LogLevel::Debug,
                    "fee_adjustment_pool_exhausted",
                    Some(json!({
                        "remainder": remainder.to_u64(),
                        "covered": covered.to_u64(),
                        "shortfall": shortfall.to_u64(),
                    })),
                );
                return Err(FeeError::CannotCoverFee(shortfall));
            }
        }
    }
    log_fee(
        LogLevel::Debug,
        "fee_adjustment_inputs_drawn",
        Some(json!({
            "drawn_count": drawn.len(),
            "drawn_total": covered.to_u64(),
            "remainder": remainder.to_u64(),
        })),
    );
    Ok(drawn)
}
