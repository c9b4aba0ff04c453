//! # Host contract.
//!
//! The host owns scheduling and transport. The engine needs exactly one thing
//! from it at failure time, [`Reschedule::reschedule`], and one thing at setup
//! time, a description of what the transport can do ([`HostCapabilities`]).
//!
//! [`check_host`] is called explicitly when a policy is attached to a host. It
//! never logs or mutates global state; it returns a typed result and the
//! caller decides what to do with a warning.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UnsupportedHostError;

/// Delayed re-scheduling primitive exposed by the host.
///
/// Fire-and-forget: the engine calls it exactly once per retry decision and
/// does not observe its durability or delivery.
pub trait Reschedule<T: ?Sized> {
    /// Hands `task` back to the host to run again after `delay`.
    fn reschedule(&self, task: &T, delay: Duration);
}

/// What the host transport supports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Transport name, used in messages.
    pub name: String,
    /// Whether the transport can run a task after a delay.
    pub supports_delay: bool,
}

impl HostCapabilities {
    /// Creates a capability description.
    pub fn new(name: impl Into<String>, supports_delay: bool) -> Self {
        Self {
            name: name.into(),
            supports_delay,
        }
    }
}

/// How an incompatible host is treated at attachment time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    /// Incompatible host is a fatal setup error.
    #[default]
    Strict,
    /// Incompatible host yields a [`HostWarning`].
    Lenient,
}

/// Non-fatal compatibility finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostWarning {
    /// Transport name.
    pub host: String,
}

impl fmt::Display for HostWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host `{}` does not support delayed re-scheduling; retry delays will not be honored",
            self.host
        )
    }
}

/// Checks that `host` can honor the retry contract.
///
/// - compatible host → `Ok(None)`
/// - incompatible, [`Compatibility::Lenient`] → `Ok(Some(warning))`
/// - incompatible, [`Compatibility::Strict`] → `Err(UnsupportedHostError)`
///
/// ## Example
/// ```rust
/// use taskretry::{check_host, Compatibility, HostCapabilities};
///
/// let inline = HostCapabilities::new("inline", false);
/// assert!(check_host(&inline, Compatibility::Strict).is_err());
/// assert!(check_host(&inline, Compatibility::Lenient).unwrap().is_some());
/// ```
pub fn check_host(
    host: &HostCapabilities,
    mode: Compatibility,
) -> Result<Option<HostWarning>, UnsupportedHostError> {
    if host.supports_delay {
        return Ok(None);
    }
    match mode {
        Compatibility::Strict => Err(UnsupportedHostError {
            host: host.name.clone(),
        }),
        Compatibility::Lenient => Ok(Some(HostWarning {
            host: host.name.clone(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delayed_host_is_compatible_in_any_mode() {
        let host = HostCapabilities::new("memory", true);
        assert_eq!(check_host(&host, Compatibility::Strict), Ok(None));
        assert_eq!(check_host(&host, Compatibility::Lenient), Ok(None));
    }

    #[test]
    fn strict_mode_rejects_inline_host() {
        let host = HostCapabilities::new("inline", false);
        let err = check_host(&host, Compatibility::Strict).unwrap_err();
        assert_eq!(err.host, "inline");
    }

    #[test]
    fn lenient_mode_warns() {
        let host = HostCapabilities::new("inline", false);
        let warning = check_host(&host, Compatibility::Lenient).unwrap().unwrap();
        assert!(warning.to_string().contains("inline"));
    }
}
