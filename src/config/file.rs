//! # File configuration (TOML).
//!
//! Error lists in a file are names, not types. An [`ErrorRegistry`] maps those
//! names to [`ErrorClass`]es; a name that is not registered fails the build
//! with [`ConfigError::UnknownErrorClass`].
//!
//! ## Single policy
//! ```toml
//! strategy = "exponential"
//! limit = 8
//! allow_list = ["io", "Timeout"]
//! min_multiplier = 0.5
//! max_multiplier = 1.5
//! ```
//!
//! ## Policies per task type
//! ```toml
//! compatibility = "lenient"
//!
//! [tasks.Import.retry]
//! strategy = "fixed"
//! limit = 3
//! delay = 60
//!
//! [tasks.CsvImport]
//! parent = "Import"
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::ErrorClass;
use crate::config::options::{RetryLimit, RetryOptions, StrategyKind};
use crate::error::ConfigError;
use crate::intercept::{Compatibility, RetryPolicy};
use crate::registry::{PolicyRegistry, PolicyRegistryBuilder};

/// Name → [`ErrorClass`] table used to resolve error lists from files.
///
/// A new registry already knows `"any"` (every error).
#[derive(Clone, Debug)]
pub struct ErrorRegistry {
    classes: HashMap<String, ErrorClass>,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        let mut classes = HashMap::new();
        let any = ErrorClass::any();
        classes.insert(any.name().to_string(), any);
        Self { classes }
    }
}

impl ErrorRegistry {
    /// Creates a registry holding only `"any"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` under its own name, replacing a previous entry.
    pub fn register(mut self, class: ErrorClass) -> Self {
        self.classes.insert(class.name().to_string(), class);
        self
    }

    /// Registers `class` under an alias.
    pub fn register_as(mut self, name: impl Into<String>, class: ErrorClass) -> Self {
        self.classes.insert(name.into(), class);
        self
    }

    /// Looks up one name.
    pub fn get(&self, name: &str) -> Option<&ErrorClass> {
        self.classes.get(name)
    }

    /// Resolves every name of list `key`.
    pub fn resolve(
        &self,
        key: &'static str,
        names: &[String],
    ) -> Result<Vec<ErrorClass>, ConfigError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownErrorClass {
                        key,
                        name: name.clone(),
                    })
            })
            .collect()
    }
}

/// One retry policy as written in a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Built-in strategy. Defaults to `fixed`.
    pub strategy: StrategyKind,
    /// Attempt limit: an integer or `"unlimited"`.
    pub limit: Option<RetryLimit>,
    /// Opt-in for `limit = "unlimited"`.
    pub unlimited_retries: bool,
    /// Constant delay in seconds.
    pub delay: Option<f64>,
    /// Per-attempt delays in seconds.
    pub delays: Option<Vec<f64>>,
    /// Error class names to retry.
    pub allow_list: Option<Vec<String>>,
    /// Error class names never to retry.
    pub deny_list: Option<Vec<String>>,
    /// Lower jitter multiplier.
    pub min_multiplier: Option<f64>,
    /// Upper jitter multiplier.
    pub max_multiplier: Option<f64>,
}

impl RetryConfig {
    /// Parses a TOML document holding one policy.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Converts to typed options, resolving error names through `errors`.
    pub fn to_options(&self, errors: &ErrorRegistry) -> Result<RetryOptions, ConfigError> {
        let allow_list = self
            .allow_list
            .as_deref()
            .map(|names| errors.resolve("allow_list", names))
            .transpose()?;
        let deny_list = self
            .deny_list
            .as_deref()
            .map(|names| errors.resolve("deny_list", names))
            .transpose()?;

        Ok(RetryOptions {
            limit: self.limit,
            unlimited_retries: self.unlimited_retries,
            delay: self.delay,
            delays: self.delays.clone(),
            allow_list,
            deny_list,
            min_multiplier: self.min_multiplier,
            max_multiplier: self.max_multiplier,
        })
    }

    /// Builds the validated policy.
    pub fn build(&self, errors: &ErrorRegistry) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::new(self.strategy, self.to_options(errors)?)
    }
}

/// A task type entry of a [`PoliciesFile`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskTypeConfig {
    /// Parent task type to inherit from.
    pub parent: Option<String>,
    /// Own policy; absent means "inherit".
    pub retry: Option<RetryConfig>,
}

/// Policies for a whole set of task types.
///
/// Host compatibility is a property of the whole file; per-task `retry`
/// tables do not accept a `compatibility` key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoliciesFile {
    /// Applied when the registry is attached to a host.
    pub compatibility: Compatibility,
    /// Task types by name.
    pub tasks: BTreeMap<String, TaskTypeConfig>,
}

impl PoliciesFile {
    /// Parses a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Builds every policy and resolves inheritance.
    pub fn build(&self, errors: &ErrorRegistry) -> Result<PolicyRegistry, ConfigError> {
        let mut builder = PolicyRegistryBuilder::new().with_compatibility(self.compatibility);
        for (name, entry) in &self.tasks {
            let policy = entry.retry.as_ref().map(|r| r.build(errors)).transpose()?;
            builder = builder.define(name.as_str(), entry.parent.as_deref(), policy);
        }
        builder.build()
    }
}
