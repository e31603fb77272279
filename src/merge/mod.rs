//! Three-way metadata merge.
//!
//! - `deep`: recursive object merge with override precedence
//! - `diff`: structural diff between two JSON values
//! - `reconcile`: default + last known + fresh fetch => merged record

pub mod deep;
pub mod diff;
pub mod reconcile;

pub use deep::deep_merge;
pub use diff::{Change, ChangeKind, diff};
pub use reconcile::{Fetched, Outcome, Reconciled, reconcile};
