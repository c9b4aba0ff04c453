//! # Policy registry: one immutable policy per task type.
//!
//! Task types form an inheritance tree. A type either defines its own
//! [`RetryPolicy`] or inherits the one of its nearest ancestor that does.
//! Resolution happens once in [`PolicyRegistryBuilder::build`]; afterwards
//! lookups are plain map reads and every instance of a type shares the same
//! `Arc<RetryPolicy>`.
//!
//! ```text
//! define("Import",    None,           Some(fixed))   ──► Import    → fixed
//! define("CsvImport", Some("Import"), None)          ──► CsvImport → fixed (shared Arc)
//! define("XmlImport", Some("Import"), Some(exp))     ──► XmlImport → exp   (override)
//! ```
//!
//! ## Rules
//! - Definitions may arrive in any order; parents are resolved at build time.
//! - A duplicate name, an unknown parent or a cycle fails the build.
//! - A type with no policy anywhere on its chain has no retry behavior.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigError, UnsupportedHostError};
use crate::intercept::{check_host, Compatibility, HostCapabilities, HostWarning, RetryPolicy};

struct Definition {
    parent: Option<String>,
    policy: Option<Arc<RetryPolicy>>,
}

/// Collects task type definitions and resolves inheritance.
///
/// ## Example
/// ```rust
/// use taskretry::{PolicyRegistry, RetryOptions, RetryPolicy};
///
/// let registry = PolicyRegistry::builder()
///     .define("Import", None, Some(RetryPolicy::fixed(RetryOptions::new().with_limit(3)).unwrap()))
///     .define("CsvImport", Some("Import"), None)
///     .build()
///     .unwrap();
///
/// assert!(registry.policy_for("CsvImport").is_some());
/// assert!(registry.policy_for("Unknown").is_none());
/// ```
#[derive(Default)]
pub struct PolicyRegistryBuilder {
    order: Vec<String>,
    defs: HashMap<String, Definition>,
    duplicate: Option<String>,
    compatibility: Compatibility,
}

impl PolicyRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a task type, optionally under `parent`, optionally with its own policy.
    pub fn define(
        mut self,
        task_type: impl Into<String>,
        parent: Option<&str>,
        policy: Option<RetryPolicy>,
    ) -> Self {
        let name = task_type.into();
        if self.defs.contains_key(&name) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.order.push(name.clone());
        self.defs.insert(
            name,
            Definition {
                parent: parent.map(str::to_string),
                policy: policy.map(Arc::new),
            },
        );
        self
    }

    /// Sets how [`PolicyRegistry::attach`] treats an incompatible host.
    pub fn with_compatibility(mut self, mode: Compatibility) -> Self {
        self.compatibility = mode;
        self
    }

    /// Resolves inheritance and freezes the registry.
    pub fn build(self) -> Result<PolicyRegistry, ConfigError> {
        if let Some(name) = &self.duplicate {
            return Err(ConfigError::DuplicateTaskType { name: name.clone() });
        }

        let mut policies = HashMap::with_capacity(self.defs.len());
        for name in &self.order {
            if let Some(policy) = self.resolve(name)? {
                policies.insert(name.clone(), policy);
            }
        }

        debug!(
            types = self.order.len(),
            with_policy = policies.len(),
            "policy registry built"
        );
        Ok(PolicyRegistry {
            policies,
            compatibility: self.compatibility,
        })
    }

    /// Walks up from `name` to the first definition carrying a policy.
    fn resolve(&self, name: &str) -> Result<Option<Arc<RetryPolicy>>, ConfigError> {
        let mut seen = HashSet::new();
        let mut child = name;
        let mut current = name;

        loop {
            if !seen.insert(current) {
                return Err(ConfigError::InheritanceCycle {
                    name: name.to_string(),
                });
            }
            let def = self
                .defs
                .get(current)
                .ok_or_else(|| ConfigError::UnknownParent {
                    name: child.to_string(),
                    parent: current.to_string(),
                })?;

            if let Some(policy) = &def.policy {
                return Ok(Some(Arc::clone(policy)));
            }
            match &def.parent {
                Some(parent) => {
                    child = current;
                    current = parent;
                }
                None => return Ok(None),
            }
        }
    }
}

/// Frozen map from task type to its effective policy.
#[derive(Clone, Debug, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<RetryPolicy>>,
    compatibility: Compatibility,
}

impl PolicyRegistry {
    /// Starts a new builder.
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::new()
    }

    /// Returns the effective policy of `task_type`, if any.
    pub fn policy_for(&self, task_type: &str) -> Option<Arc<RetryPolicy>> {
        self.policies.get(task_type).cloned()
    }

    /// Returns the configured compatibility mode.
    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// Returns the number of task types with an effective policy.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` when no task type retries.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Checks the host once for the whole registry.
    ///
    /// An empty registry never needs delayed re-scheduling and always passes.
    pub fn attach(
        &self,
        host: &HostCapabilities,
    ) -> Result<Option<HostWarning>, UnsupportedHostError> {
        if self.policies.is_empty() {
            return Ok(None);
        }
        check_host(host, self.compatibility)
    }
}
