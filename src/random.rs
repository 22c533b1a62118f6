//! Randomness capability for input sampling
//!
//! The fee adjuster recruits extra inputs by drawing entries uniformly at
//! random from the caller's UTxO pool. Rather than reaching for an ambient
//! generator, the draw goes through the [`RandomSource`] capability so that
//! the caller decides where randomness comes from:
//!
//! - production code passes `rand::thread_rng()` (or an OS-backed
//!   generator of its choice)
//! - tests pass a seeded `rand::rngs::StdRng`, making every run of the
//!   adjuster bit-for-bit reproducible
//!
//! Every [`rand::Rng`] is a `RandomSource`, so both of the above work
//! without adapter types.
//!
//! # Example
//!
//! ```
//! use coinvault_core::random::RandomSource;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let index = rng.pick(10);
//! assert!(index < 10);
//! ```

use rand::Rng;

/// A capability for drawing uniformly random indices.
///
/// The single operation keeps the surface small enough that deterministic
/// test doubles are trivial to write, while the blanket implementation
/// lets any `rand` generator be passed directly.
pub trait RandomSource {
    /// A uniformly distributed index in `0..bound`.
    ///
    /// # Panics
    ///
    /// Panics when `bound` is zero. Callers sample from collections they
    /// have already checked to be non-empty.
    fn pick(&mut self, bound: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn pick(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}
