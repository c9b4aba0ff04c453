//! Error types used by the retry engine.
//!
//! This module defines the setup-time and payload errors of the engine:
//!
//! - [`ConfigError`]: an invalid retry policy configuration (fatal to setup).
//! - [`UnsupportedHostError`]: the host cannot re-schedule with a delay.
//! - [`PayloadError`]: a task payload cannot be decoded.
//! - [`AttemptTimeout`]: an execution ran past the worker's timeout.
//!
//! Task failures themselves are carried as [`TaskError`] and are never wrapped
//! by the engine: an error that is not retried reaches the host unchanged.
//!
//! Every enum provides `as_label` for logs/metrics.

use std::time::Duration;

use thiserror::Error;

/// Error produced by a task execution.
///
/// The engine only ever borrows it for classification, so the host
/// propagates exactly the value the task returned.
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Invalid retry policy configuration.
///
/// Raised synchronously while a strategy or policy is being constructed.
/// It signals a programming mistake and is never recovered by the retry machinery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `limit` was a negative count.
    #[error("limit must be an integer >= 0, or `unlimited` (got {limit})")]
    NegativeLimit {
        /// The rejected value.
        limit: i64,
    },

    /// `limit = unlimited` without the explicit opt-in flag.
    #[error("you must set `unlimited_retries = true` to use an unlimited limit")]
    UnlimitedNotConfirmed,

    /// `unlimited_retries = true` without `limit = unlimited`.
    #[error("you must set `limit = unlimited` to have unlimited retries")]
    UnlimitedFlagWithoutLimit,

    /// `delay` was negative or not a finite number.
    #[error("delay must be a non-negative number of seconds (got {delay})")]
    InvalidDelay {
        /// The rejected value in seconds.
        delay: f64,
    },

    /// An entry of `delays` was negative or not finite.
    #[error("delays[{index}] must be a non-negative number of seconds (got {delay})")]
    InvalidDelayEntry {
        /// Position of the rejected entry.
        index: usize,
        /// The rejected value in seconds.
        delay: f64,
    },

    /// Both the allow-list and the deny-list were supplied.
    #[error("allow_list and deny_list cannot be used together")]
    ConflictingErrorLists,

    /// An error list was supplied but empty.
    #[error("{key} must be a non-empty list of error classes")]
    EmptyErrorList {
        /// `allow_list` or `deny_list`.
        key: &'static str,
    },

    /// An error list named something that is not a registered error class.
    #[error("{key} must contain error classes; `{name}` is not a registered error class")]
    UnknownErrorClass {
        /// `allow_list` or `deny_list`.
        key: &'static str,
        /// The unresolved name.
        name: String,
    },

    /// A key that the selected strategy does not accept.
    #[error("cannot use `{key}` with the {strategy} strategy")]
    UnsupportedOption {
        /// The offending option.
        key: &'static str,
        /// The strategy that rejected it.
        strategy: &'static str,
    },

    /// The variable strategy needs its delay table.
    #[error("you must define a list of delays between attempts")]
    MissingDelays,

    /// Only one of `min_multiplier` / `max_multiplier` was given.
    #[error("if one of min_multiplier/max_multiplier is supplied, both are required")]
    UnpairedMultiplier,

    /// A multiplier was negative or not finite.
    #[error("{key} must be a non-negative number (got {value})")]
    InvalidMultiplier {
        /// `min_multiplier` or `max_multiplier`.
        key: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// `min_multiplier > max_multiplier`.
    #[error("min_multiplier ({min}) must be less than or equal to max_multiplier ({max})")]
    InvertedMultipliers {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// The configuration file could not be parsed.
    #[error("invalid retry configuration: {0}")]
    Parse(String),

    /// A task type was registered twice.
    #[error("task type `{name}` is already defined")]
    DuplicateTaskType {
        /// The task type name.
        name: String,
    },

    /// A task type names a parent that was never defined.
    #[error("task type `{name}` inherits from unknown type `{parent}`")]
    UnknownParent {
        /// The task type name.
        name: String,
        /// The missing parent.
        parent: String,
    },

    /// Task types inherit from each other in a loop.
    #[error("task type `{name}` has a cyclic inheritance chain")]
    InheritanceCycle {
        /// A task type on the cycle.
        name: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskretry::ConfigError;
    ///
    /// let err = ConfigError::ConflictingErrorLists;
    /// assert_eq!(err.as_label(), "config_conflicting_error_lists");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NegativeLimit { .. } => "config_negative_limit",
            ConfigError::UnlimitedNotConfirmed => "config_unlimited_not_confirmed",
            ConfigError::UnlimitedFlagWithoutLimit => "config_unlimited_flag_without_limit",
            ConfigError::InvalidDelay { .. } => "config_invalid_delay",
            ConfigError::InvalidDelayEntry { .. } => "config_invalid_delay_entry",
            ConfigError::ConflictingErrorLists => "config_conflicting_error_lists",
            ConfigError::EmptyErrorList { .. } => "config_empty_error_list",
            ConfigError::UnknownErrorClass { .. } => "config_unknown_error_class",
            ConfigError::UnsupportedOption { .. } => "config_unsupported_option",
            ConfigError::MissingDelays => "config_missing_delays",
            ConfigError::UnpairedMultiplier => "config_unpaired_multiplier",
            ConfigError::InvalidMultiplier { .. } => "config_invalid_multiplier",
            ConfigError::InvertedMultipliers { .. } => "config_inverted_multipliers",
            ConfigError::Parse(_) => "config_parse",
            ConfigError::DuplicateTaskType { .. } => "config_duplicate_task_type",
            ConfigError::UnknownParent { .. } => "config_unknown_parent",
            ConfigError::InheritanceCycle { .. } => "config_inheritance_cycle",
        }
    }
}

/// # Host cannot honor delayed re-scheduling.
///
/// Without a delayed re-schedule primitive the retry contract is meaningless,
/// so strict deployments refuse to attach a policy to such a host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("host `{host}` does not support delayed re-scheduling; retries cannot be honored")]
pub struct UnsupportedHostError {
    /// Name of the detected host transport.
    pub host: String,
}

impl UnsupportedHostError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "host_unsupported"
    }
}

/// # Task payload cannot be decoded.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// The reserved field holds something other than a positive integer.
    #[error("field `{field}` must be a positive integer (got {value})")]
    InvalidAttempt {
        /// The reserved field name.
        field: &'static str,
        /// The rejected JSON value, rendered.
        value: String,
    },

    /// A host-level field is missing or has the wrong type.
    #[error("payload field `{field}` is missing or malformed")]
    MissingField {
        /// The field name.
        field: &'static str,
    },

    /// The payload names a task type the worker does not know.
    #[error("no task registered under `{name}`")]
    UnknownTask {
        /// The task type name from the payload.
        name: String,
    },
}

impl PayloadError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PayloadError::InvalidAttempt { .. } => "payload_invalid_attempt",
            PayloadError::MissingField { .. } => "payload_missing_field",
            PayloadError::UnknownTask { .. } => "payload_unknown_task",
        }
    }
}

/// # An execution exceeded the worker's per-attempt timeout.
///
/// Returned to the failure pipeline like any task error, so policies can
/// allow or deny it with `ErrorClass::of::<AttemptTimeout>()`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("attempt timed out after {timeout:?}")]
pub struct AttemptTimeout {
    /// The configured timeout.
    pub timeout: Duration,
}
