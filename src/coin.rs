//! Coin arithmetic for UTxO-based wallets
//!
//! This module defines the fundamental money types used throughout the
//! library: [`Coin`], [`Fee`] and [`DustThreshold`]. All three are thin
//! wrappers around a non-negative 64-bit integer amount.
//!
//! # Arithmetic Policy
//!
//! Balancing a transaction must never produce a silently wrong amount, so
//! every operation that could leave the legal domain is explicit about it:
//!
//! - `checked_sub` returns `None` when the subtrahend exceeds the minuend
//! - `checked_div` / `checked_rem` return `None` for a zero divisor
//! - `from_signed` rejects negative quantities
//! - `saturating_add` clamps at the top of the domain and is the only
//!   total form of addition; summing a wallet cannot overflow in practice,
//!   but the clamp keeps the operation total on the full domain
//!
//! No floating-point arithmetic is used anywhere in this crate. Callers
//! that need proportional division should use the fee distributor, which
//! works with exact 128-bit integer products.
//!
//! # Example
//!
//! ```
//! use coinvault_core::coin::Coin;
//!
//! let a = Coin::new(70);
//! let b = Coin::new(30);
//!
//! assert_eq!(a.checked_sub(b), Some(Coin::new(40)));
//! assert_eq!(b.checked_sub(a), None);
//! assert_eq!(a.distance(b), Coin::new(40));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// A non-negative integer amount of currency, in the smallest unit.
///
/// `Coin` is a value type: it is `Copy`, has no aliasing, and all
/// operations return new values. The interpretation of the unit (satoshi,
/// lovelace, ...) is up to the host wallet; conversions to and from
/// `bitcoin::Amount` are provided for Bitcoin-based hosts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Coin(u64);

impl Coin {
    /// The zero amount.
    pub const ZERO: Coin = Coin(0);

    /// The largest representable amount.
    pub const MAX: Coin = Coin(u64::MAX);

    /// Create a coin from a raw amount.
    pub fn new(value: u64) -> Self {
        Coin(value)
    }

    /// The raw amount carried by this coin.
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Whether this coin carries no value.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two coins, returning `None` if the result would overflow.
    pub fn checked_add(self, other: Coin) -> Option<Coin> {
        self.0.checked_add(other.0).map(Coin)
    }

    /// Add two coins, clamping at [`Coin::MAX`] on overflow.
    pub fn saturating_add(self, other: Coin) -> Coin {
        Coin(self.0.saturating_add(other.0))
    }

    /// Subtract `other` from this coin, returning `None` when `other`
    /// is larger.
    pub fn checked_sub(self, other: Coin) -> Option<Coin> {
        self.0.checked_sub(other.0).map(Coin)
    }

    /// The absolute difference between two coins.
    pub fn distance(self, other: Coin) -> Coin {
        Coin(self.0.abs_diff(other.0))
    }

    /// Divide this coin evenly between `parts` recipients, returning
    /// `None` when `parts` is zero.
    pub fn checked_div(self, parts: u64) -> Option<Coin> {
        self.0.checked_div(parts).map(Coin)
    }

    /// The remainder left over after dividing between `parts` recipients,
    /// or `None` when `parts` is zero.
    pub fn checked_rem(self, parts: u64) -> Option<Coin> {
        self.0.checked_rem(parts).map(Coin)
    }

    /// Quotient and remainder of an even division, or `None` when `parts`
    /// is zero.
    pub fn div_rem(self, parts: u64) -> Option<(Coin, Coin)> {
        Some((self.checked_div(parts)?, self.checked_rem(parts)?))
    }

    /// Convert a signed quantity into a coin, rejecting negative values
    /// and values beyond the 64-bit domain.
    pub fn from_signed(value: i128) -> Option<Coin> {
        u64::try_from(value).ok().map(Coin)
    }

    /// This coin as a signed quantity, for balance arithmetic that can go
    /// through negative intermediate values.
    pub fn to_signed(self) -> i128 {
        i128::from(self.0)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summing a wallet's coins saturates at the top of the domain rather
/// than wrapping.
impl Sum for Coin {
    fn sum<I: Iterator<Item = Coin>>(iter: I) -> Coin {
        iter.fold(Coin::ZERO, Coin::saturating_add)
    }
}

impl<'a> Sum<&'a Coin> for Coin {
    fn sum<I: Iterator<Item = &'a Coin>>(iter: I) -> Coin {
        iter.copied().sum()
    }
}

impl From<bitcoin::Amount> for Coin {
    fn from(amount: bitcoin::Amount) -> Self {
        Coin(amount.to_sat())
    }
}

impl From<Coin> for bitcoin::Amount {
    fn from(coin: Coin) -> Self {
        bitcoin::Amount::from_sat(coin.0)
    }
}

/// A coin in the fee role.
///
/// The distinction from [`Coin`] is purely one of intent: a `Fee` is money
/// leaving the wallet towards the network. Fees form a monoid under
/// [`Fee::add`] with [`Fee::ZERO`] as identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Fee(Coin);

impl Fee {
    /// The identity fee.
    pub const ZERO: Fee = Fee(Coin::ZERO);

    /// Wrap a coin amount as a fee.
    pub fn new(coin: Coin) -> Self {
        Fee(coin)
    }

    /// The fee amount as a coin.
    pub fn coin(self) -> Coin {
        self.0
    }

    /// The raw fee amount.
    pub fn to_u64(self) -> u64 {
        self.0.to_u64()
    }

    /// Whether this fee is the identity.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Combine two fees, clamping at the top of the domain.
    pub fn add(self, other: Fee) -> Fee {
        Fee(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Fee {
    fn sum<I: Iterator<Item = Fee>>(iter: I) -> Fee {
        iter.fold(Fee::ZERO, Fee::add)
    }
}

/// The value at or below which an output is classified as dust.
///
/// Dust outputs cost more in fees to spend than they are worth; the change
/// reducer removes them and folds their value back into surviving change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DustThreshold(Coin);

impl DustThreshold {
    /// A threshold that classifies nothing as dust.
    pub const ZERO: DustThreshold = DustThreshold(Coin::ZERO);

    /// Create a threshold from a coin amount.
    pub fn new(coin: Coin) -> Self {
        DustThreshold(coin)
    }

    /// The threshold amount.
    pub fn coin(self) -> Coin {
        self.0
    }

    /// Whether `coin` is dust under this threshold.
    ///
    /// A coin equal to the threshold is dust; only strictly larger coins
    /// survive dust removal.
    pub fn is_dust(self, coin: Coin) -> bool {
        coin <= self.0
    }
}

impl fmt::Display for DustThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
