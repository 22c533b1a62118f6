//! Error types for fee balancing
//!
//! The library distinguishes three classes of failure:
//!
//! 1. **Recoverable, user-visible** - the wallet genuinely cannot pay the
//!    estimated fee. Reported as [`FeeError`] through `Result`.
//! 2. **Precondition violations** - a caller handed the adjuster an
//!    invalid selection (zero initial fee estimate, outputs exceeding
//!    inputs, an empty list where a non-empty one is required). These are
//!    caller bugs and abort with a diagnostic naming the offending
//!    selection.
//! 3. **Unreachable invariants** - states a well-behaved fee estimator
//!    can never produce. These abort as internal errors.
//!
//! Only the first class appears in function signatures.

use crate::coin::Coin;
use thiserror::Error;

/// Failures the caller is expected to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeeError {
    /// The extra-input pool was exhausted before the estimated fee was
    /// covered. Carries the amount still unpaid after consuming the
    /// entire pool.
    #[error("not enough available inputs to cover the fee: {0} short")]
    CannotCoverFee(Coin),
}
