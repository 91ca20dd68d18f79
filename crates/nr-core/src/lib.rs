//! Core types, errors, and configuration for notifyrun.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Change notification types ([`ChangeKind`], [`ChangeKinds`], [`ChangeNotification`])
//! - Ignore rules applied to every notification ([`IgnoreRules`])
//! - Session configuration ([`SessionConfig`]) and its [`ConfigError`]
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod rules;
pub mod types;

pub use config::{DEFAULT_FLUSH_INTERVAL_MS, SessionConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use rules::IgnoreRules;
pub use types::{ChangeKind, ChangeKinds, ChangeNotification};
