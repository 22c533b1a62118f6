//! CoinVault Core Library
//!
//! This crate provides coin selection support for UTxO-based wallets:
//! given a transaction draft produced by any input-picking heuristic, it
//! balances inputs and change until the implicit fee matches an externally
//! estimated target, and it migrates whole UTxO sets between wallets in
//! fee-balanced batches.
//!
//! # Modules
//!
//! - `coin`: Non-negative money arithmetic (`Coin`, `Fee`, `DustThreshold`)
//! - `selection`: Keyed coin maps and the `CoinSelection` draft type
//! - `fee`: The fee-balancing engine (distribution, dust handling,
//!   change reduction, the iterative adjuster)
//! - `migration`: Whole-wallet migration in fee-balanced batches
//! - `random`: The randomness capability used to sample extra inputs
//! - `error`: The public error surface
//! - `logging`: Structured logging infrastructure
//!
//! # Entry Points
//!
//! - [`adjust_for_fee`] - balance a selection against a fee estimator
//! - [`deplete_utxo`] - migrate a UTxO set as self-send batches
//! - [`calculate_fee`] - the implicit fee of a selection
//! - [`coalesce_dust`] - fold dust coins into their surviving peers
//!
//! # What this crate is not
//!
//! Input-picking heuristics, fee formulas, signing, serialization of
//! transactions and network submission all live in the host wallet. The
//! crate consumes a [`FeeEstimator`] and a [`RandomSource`] and touches
//! nothing else: no I/O, no global state, no threads.
//!
//! # Security Considerations
//!
//! - Amounts never wrap silently; arithmetic that could leave the domain
//!   is checked and impossible states abort rather than producing an
//!   unbalanced transaction
//! - The library handles no key material, and its log records contain
//!   only counts and totals
//! - Results are bit-for-bit reproducible for a fixed input, estimator
//!   and random seed

/// Money arithmetic for UTxO-based wallets
pub mod coin;

/// Public error surface
pub mod error;

/// The fee-balancing engine
pub mod fee;

/// Structured logging infrastructure
pub mod logging;

/// Whole-wallet UTxO migration
pub mod migration;

/// Randomness capability for input sampling
pub mod random;

/// Coin maps and selection drafts
pub mod selection;

/// Re-export core money types
pub use coin::{Coin, DustThreshold, Fee};

/// Re-export selection types
pub use selection::{CoinMap, CoinMapEntry, CoinSelection, OutPointMap};

/// Re-export the fee-balancing entry points
pub use fee::{
    adjust_for_fee, calculate_fee, coalesce_dust, distribute_fee, reduce_change_outputs,
    split_coin, FeeEstimator, FeeOptions,
};

/// Re-export migration entry points
pub use migration::{deplete_utxo, ideal_batch_size, CoinSelectionOptions};

/// Re-export the error and randomness surface
pub use error::FeeError;
pub use random::RandomSource;
