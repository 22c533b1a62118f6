//! Core types for coin selections
//!
//! This module defines the structures a selection is made of:
//!
//! - [`CoinMapEntry`]: a single keyed coin (typically a UTxO entry)
//! - [`CoinMap`]: a collection of keyed coins with unique keys
//! - [`CoinSelection`]: a transaction draft of inputs, outputs and change
//!
//! # Key Types
//!
//! Keys are opaque to this library. Inputs are usually identified by a
//! transaction outpoint and outputs by an address, but any `Ord + Clone`
//! type works. For Bitcoin-based hosts the [`OutPointMap`] alias fixes the
//! input key to `bitcoin::OutPoint`.
//!
//! # Ordering
//!
//! A [`CoinMap`] iterates in key-sorted order, so for a given set of
//! entries every traversal is reproducible. Callers must not depend on any
//! particular order beyond that guarantee. Change coins, by contrast, are
//! an ordered sequence: their order drives the deterministic rounding of
//! the fee distributor and is significant.
//!
//! # Example
//!
//! ```
//! use coinvault_core::coin::Coin;
//! use coinvault_core::selection::{CoinMap, CoinSelection};
//!
//! let mut inputs = CoinMap::new();
//! inputs.insert("utxo-1", Coin::new(70_000));
//! inputs.insert("utxo-2", Coin::new(30_000));
//!
//! let mut outputs = CoinMap::new();
//! outputs.insert("payment", Coin::new(80_000));
//!
//! let selection = CoinSelection::new(inputs, outputs, vec![Coin::new(20_000)]);
//! assert_eq!(selection.input_total(), Coin::new(100_000));
//! assert_eq!(selection.change_total(), Coin::new(20_000));
//! ```

use crate::coin::Coin;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// A Bitcoin-flavoured coin map keyed by transaction outpoint.
pub type OutPointMap = CoinMap<bitcoin::OutPoint>;

/// A single keyed coin.
///
/// For wallet inputs the key is typically a UTxO outpoint; for payment
/// outputs it is typically an address. The library never inspects keys
/// beyond comparing them for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMapEntry<K> {
    /// Opaque identifier, unique within its map.
    pub key: K,
    /// The value carried by this entry.
    pub value: Coin,
}

impl<K> CoinMapEntry<K> {
    /// Create an entry from a key and a value.
    pub fn new(key: K, value: Coin) -> Self {
        CoinMapEntry { key, value }
    }
}

/// A mapping from opaque keys to coins with unique keys.
///
/// Iteration is in key-sorted order, which makes every traversal of the
/// same map reproducible across runs and platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMap<K: Ord>(BTreeMap<K, Coin>);

impl<K: Ord> CoinMap<K> {
    /// Create an empty map.
    pub fn new() -> Self {
        CoinMap(BTreeMap::new())
    }

    /// Build a map from entries. When two entries share a key, the later
    /// one wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CoinMapEntry<K>>,
    {
        let mut map = CoinMap::new();
        for entry in entries {
            map.insert(entry.key, entry.value);
        }
        map
    }

    /// Insert a keyed coin, returning the previous value for the key if
    /// one was present.
    pub fn insert(&mut self, key: K, value: Coin) -> Option<Coin> {
        self.0.insert(key, value)
    }

    /// Remove the entry for `key`, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<Coin> {
        self.0.remove(key)
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &K) -> Option<Coin> {
        self.0.get(key).copied()
    }

    /// Whether `key` is present in this map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    /// The number of entries in this map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The total value of all entries.
    pub fn total_value(&self) -> Coin {
        self.0.values().sum()
    }

    /// Iterate over keys and values in key-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Coin)> + '_ {
        self.0.iter().map(|(key, value)| (key, *value))
    }

    /// The keys of this map in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    /// The values of this map in key-sorted order.
    pub fn values(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0.values().copied()
    }

    /// Absorb all entries of `other` into this map. Entries of `other`
    /// win on key collisions.
    pub fn extend(&mut self, other: CoinMap<K>) {
        self.0.extend(other.0);
    }

    /// Remove and return the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<CoinMapEntry<K>> {
        self.0
            .pop_first()
            .map(|(key, value)| CoinMapEntry { key, value })
    }

    /// Remove and return a uniformly random entry, or `None` when the map
    /// is empty.
    ///
    /// This is the only operation in the library that consumes
    /// randomness; everything downstream of a fixed sequence of draws is
    /// deterministic.
    pub fn draw_random<R>(&mut self, random: &mut R) -> Option<CoinMapEntry<K>>
    where
        K: Clone,
        R: RandomSource,
    {
        if self.0.is_empty() {
            return None;
        }
        let index = random.pick(self.0.len());
        let key = self.0.keys().nth(index)?.clone();
        let value = self.0.remove(&key)?;
        Some(CoinMapEntry { key, value })
    }
}

impl<K: Ord> Default for CoinMap<K> {
    fn default() -> Self {
        CoinMap::new()
    }
}

impl<K: Ord> FromIterator<CoinMapEntry<K>> for CoinMap<K> {
    fn from_iter<I: IntoIterator<Item = CoinMapEntry<K>>>(iter: I) -> Self {
        CoinMap::from_entries(iter)
    }
}

impl<K: Ord> IntoIterator for CoinMap<K> {
    type Item = CoinMapEntry<K>;
    type IntoIter = std::vec::IntoIter<CoinMapEntry<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .into_iter()
            .map(|(key, value)| CoinMapEntry { key, value })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// A transaction draft: consumed inputs, payment outputs, and the change
/// coins that return the difference to the sender.
///
/// Change coins carry no keys; the host assigns change addresses after
/// balancing. Their order is significant because the fee distributor's
/// rounding is defined over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSelection<I: Ord, O: Ord> {
    /// UTxO entries consumed by the transaction.
    pub inputs: CoinMap<I>,
    /// Payment outputs requested by the caller.
    pub outputs: CoinMap<O>,
    /// Change coins, in distribution order.
    pub change: Vec<Coin>,
}

impl<I: Ord, O: Ord> CoinSelection<I, O> {
    /// Create a selection from its parts.
    pub fn new(inputs: CoinMap<I>, outputs: CoinMap<O>, change: Vec<Coin>) -> Self {
        CoinSelection {
            inputs,
            outputs,
            change,
        }
    }

    /// A selection with no inputs, outputs or change.
    pub fn empty() -> Self {
        CoinSelection {
            inputs: CoinMap::new(),
            outputs: CoinMap::new(),
            change: Vec::new(),
        }
    }

    /// Total value entering the transaction.
    pub fn input_total(&self) -> Coin {
        self.inputs.total_value()
    }

    /// Total value paid to recipients.
    pub fn output_total(&self) -> Coin {
        self.outputs.total_value()
    }

    /// Total value returned to the sender.
    pub fn change_total(&self) -> Coin {
        self.change.iter().sum()
    }

    /// This selection with its change replaced.
    pub fn with_change(mut self, change: Vec<Coin>) -> Self {
        self.change = change;
        self
    }

    /// A JSON summary of counts and totals, safe for logging.
    ///
    /// Keys are never included; only aggregate amounts and counts.
    pub fn summary(&self) -> serde_json::Value {
        json!({
            "input_count": self.inputs.len(),
            "output_count": self.outputs.len(),
            "change_count": self.change.len(),
            "input_total": self.input_total().to_u64(),
            "output_total": self.output_total().to_u64(),
            "change_total": self.change_total().to_u64(),
        })
    }
}
