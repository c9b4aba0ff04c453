//! Retry policy configuration.
//!
//! ## Contents
//! - [`RetryOptions`] typed configuration surface (limit, delays, lists, multipliers)
//! - [`RetryLimit`], [`StrategyKind`] option value types
//! - [`validate`] construction-time validation of an options set
//! - [`RetryConfig`], [`PoliciesFile`], [`ErrorRegistry`] file-based configuration (TOML)
//!
//! ## Quick wiring
//! ```text
//! RetryConfig (toml) ──► ErrorRegistry resolves names ──► RetryOptions
//!                                                           │
//!                                           choose(kind, options)
//!                                                           │ validate(kind, options)?
//!                                                           ▼
//!                                                      RetryPolicy
//! ```

mod file;
mod options;
mod validate;

pub use file::{ErrorRegistry, PoliciesFile, RetryConfig, TaskTypeConfig};
pub use options::{RetryLimit, RetryOptions, StrategyKind};
pub use validate::validate;
pub(crate) use validate::check_multiplier_range;
