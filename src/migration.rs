//! UTxO migration
//!
//! Migration empties a wallet into itself: the whole UTxO set is spent in
//! batches as self-send transactions with no payment outputs, the change
//! carrying everything the fee does not consume. Hosts use this to move
//! funds between wallets or to consolidate a fragmented UTxO set.
//!
//! Batches are capped by an input-count limit because every change coin
//! becomes an output of the migration transaction, and the host's
//! transaction size limit bounds how many inputs fit alongside them.
//! [`ideal_batch_size`] derives the largest safe cap from the host's own
//! input/output capacity function.
//!
//! Each batch is balanced by a direct fee-diff loop rather than the full
//! adjuster: with no payment outputs and no pool to draw from, the only
//! degree of freedom is the change list itself.

use crate::coin::Coin;
use crate::fee::{FeeEstimator, FeeOptions};
use crate::logging::{log_migration, LogLevel};
use crate::selection::{CoinMap, CoinMapEntry, CoinSelection};
use serde_json::json;

/// Host capacity limits consulted when sizing migration batches.
pub struct CoinSelectionOptions<F>
where
    F: Fn(usize) -> usize,
{
    /// The maximum number of inputs a transaction can carry when it has
    /// the given number of outputs.
    pub maximum_inputs_for_outputs: F,
}

impl<F> CoinSelectionOptions<F>
where
    F: Fn(usize) -> usize,
{
    /// Wrap a host capacity function.
    pub fn new(maximum_inputs_for_outputs: F) -> Self {
        CoinSelectionOptions {
            maximum_inputs_for_outputs,
        }
    }
}

/// The largest batch size that stays feasible when every input's change
/// becomes an output.
///
/// Finds the smallest `n >= 1` with `maximum_inputs_for_outputs(n) <= n`,
/// capped at 255. Below that point a batch of `n` inputs could produce
/// more change outputs than a transaction with `n` inputs may carry.
pub fn ideal_batch_size<F>(options: &CoinSelectionOptions<F>) -> u8
where
    F: Fn(usize) -> usize,
{
    let mut batch_size: u8 = 1;
    loop {
        let max_inputs = (options.maximum_inputs_for_outputs)(batch_size as usize);
        if max_inputs <= batch_size as usize || batch_size == u8::MAX {
            return batch_size;
        }
        batch_size += 1;
    }
}

/// Spend an entire UTxO set as a sequence of self-send selections.
///
/// Entries are consumed in key order, at most `batch_size` per
/// selection. Every returned selection has no payment outputs, inputs
/// drawn from `utxo` (each entry appearing in at most one selection), and
/// change balanced so that the implicit fee equals the estimated fee
/// exactly.
///
/// A batch whose change is consumed entirely by the fee cannot be
/// balanced; migration stops there and the remaining entries are left
/// unspent.
///
/// # Panics
///
/// Panics when `batch_size` is zero.
pub fn deplete_utxo<I, O, E>(
    options: &FeeOptions<E>,
    batch_size: u8,
    mut utxo: CoinMap<I>,
) -> Vec<CoinSelection<I, O>>
where
    I: Ord + Clone,
    O: Ord + Clone,
    E: FeeEstimator<I, O>,
{
    assert!(batch_size >= 1, "migration batch size must be at least 1");
    let mut selections = Vec::new();
    loop {
        let mut batch: Vec<CoinMapEntry<I>> = Vec::new();
        while batch.len() < batch_size as usize {
            match utxo.pop_first() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }
        let provisional = mk_selection(options, batch);
        match balance_selection(options, provisional) {
            Some(selection) => {
                log_migration(
                    LogLevel::Debug,
                    "migration_batch_balanced",
                    Some(json!({ "selection": selection.summary() })),
                );
                selections.push(selection);
            }
            None => {
                log_migration(
                    LogLevel::Debug,
                    "migration_batch_abandoned",
                    Some(json!({ "remaining_entries": utxo.len() })),
                );
                break;
            }
        }
    }
    selections
}

/// A provisional self-send selection for one batch: change mirrors the
/// non-dust input values, or holds a single threshold-sized coin when
/// the whole batch is dust.
fn mk_selection<I, O, E>(
    options: &FeeOptions<E>,
    batch: Vec<CoinMapEntry<I>>,
) -> CoinSelection<I, O>
where
    I: Ord + Clone,
    O: Ord + Clone,
{
    let mut change: Vec<Coin> = batch
        .iter()
        .map(|entry| entry.value)
        .filter(|value| !options.dust_threshold.is_dust(*value))
        .collect();
    if change.is_empty() {
        change = vec![options.dust_threshold.coin()];
    }
    CoinSelection::new(CoinMap::from_entries(batch), CoinMap::new(), change)
}

/// Absorb the fee directly into the change list.
///
/// Repeatedly measures `inputs - change - fee` and adds the signed
/// difference to the first change coin. A first coin pushed to dust (or
/// below zero) is dropped and the measurement repeats with one output
/// fewer. An exhausted change list means the batch cannot pay its fee.
fn balance_selection<I, O, E>(
    options: &FeeOptions<E>,
    mut selection: CoinSelection<I, O>,
) -> Option<CoinSelection<I, O>>
where
    I: Ord + Clone,
    O: Ord + Clone,
    E: FeeEstimator<I, O>,
{
    loop {
        let fee = options.fee_estimator.estimate_fee(&selection);
        let diff = selection.input_total().to_signed()
            - selection.change_total().to_signed()
            - fee.coin().to_signed();
        if diff == 0 {
            return Some(selection);
        }
        if selection.change.is_empty() {
            return None;
        }
        let adjusted = selection.change[0].to_signed() + diff;
        match Coin::from_signed(adjusted) {
            Some(value) if !options.dust_threshold.is_dust(value) => {
                selection.change[0] = value;
            }
            _ => {
                selection.change.remove(0);
            }
        }
    }
}
