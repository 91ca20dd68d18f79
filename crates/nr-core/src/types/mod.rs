//! Domain types for change notifications.
//!
//! - [`kind`] - Elementary change operations and small sets of them
//! - [`notification`] - A single reported change to a watched subject
//!
//! All public types are re-exported at the crate root:
//!
//! ```
//! use nr_core::{ChangeKind, ChangeKinds, ChangeNotification};
//! ```

mod kind;
mod notification;

pub use kind::{ChangeKind, ChangeKinds};
pub use notification::ChangeNotification;
