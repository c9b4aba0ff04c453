//! Error classification for retry eligibility.
//!
//! ## Contents
//! - [`ErrorClass`] a named descriptor of an error family
//! - [`Classifier`] allow-list / deny-list rule over error classes
//! - [`retryable`] the classification function over raw lists
//!
//! ## Precedence
//! ```text
//! allow-list non-empty ─► retryable iff the error matches some entry
//! deny-list non-empty  ─► retryable iff the error matches no entry
//! neither              ─► always retryable
//! ```

mod class;
mod classifier;

pub use class::{DynError, ErrorClass};
pub use classifier::{retryable, Classifier};
