//! Fx hash map and set aliases.
//!
//! The ignore rule sets and the suppression tally are keyed by short paths
//! and formatted messages, so they use the `rustc-hash` Fx hasher rather than
//! std's SipHash. None of the keys come from an untrusted network peer.
//!
//! # Examples
//!
//! ```
//! use nr_core::{FxHashMap, fx_hash_map};
//!
//! let mut tally: FxHashMap<String, u64> = fx_hash_map();
//! *tally.entry("accept event".to_owned()).or_default() += 1;
//! assert_eq!(tally.get("accept event"), Some(&1));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}
