//! # Error classes.
//!
//! An [`ErrorClass`] names a family of errors. Membership follows the way Rust
//! errors refine each other: an error belongs to the family of type `E` when it
//! *is* an `E`, or when an `E` appears anywhere in its [`source`] chain (a
//! wrapper that carries an `E` as its cause is a more specific `E`).
//!
//! Families that do not map onto a single type (a subset of enum variants, an
//! [`std::io::ErrorKind`], ...) are built from a predicate with [`ErrorClass::new`].
//!
//! [`source`]: std::error::Error::source

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Borrowed, type-erased error as seen by classifiers and strategies.
pub type DynError = dyn std::error::Error + 'static;

type Matcher = Arc<dyn Fn(&DynError) -> bool + Send + Sync>;

/// Named descriptor of an error family.
///
/// Cheap to clone; the matcher is shared.
///
/// ## Example
/// ```rust
/// use std::io;
/// use taskretry::ErrorClass;
///
/// let io = ErrorClass::of::<io::Error>();
/// let timeouts = ErrorClass::new("io-timeout", |e| {
///     e.downcast_ref::<io::Error>()
///         .is_some_and(|e| e.kind() == io::ErrorKind::TimedOut)
/// });
///
/// let err = io::Error::new(io::ErrorKind::TimedOut, "slow");
/// assert!(io.matches(&err));
/// assert!(timeouts.matches(&err));
/// assert!(ErrorClass::any().matches(&err));
/// ```
#[derive(Clone)]
pub struct ErrorClass {
    name: Cow<'static, str>,
    matcher: Matcher,
}

impl ErrorClass {
    /// Family defined by an arbitrary predicate.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&DynError) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Arc::new(predicate),
        }
    }

    /// Family of the concrete error type `E`, including errors caused by an `E`.
    pub fn of<E>() -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::new(short_type_name::<E>(), |err| {
            chain(err).any(|e| e.is::<E>())
        })
    }

    /// Root family: every error is a member.
    pub fn any() -> Self {
        Self::new("any", |_| true)
    }

    /// Returns the display name of the family.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when `error` belongs to this family.
    pub fn matches(&self, error: &DynError) -> bool {
        (self.matcher)(error)
    }
}

impl fmt::Debug for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorClass").field(&self.name).finish()
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Iterates an error followed by its causes.
fn chain(err: &DynError) -> impl Iterator<Item = &DynError> {
    std::iter::successors(Some(err), |e| e.source())
}

/// `std::any::type_name` without the module path.
fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
