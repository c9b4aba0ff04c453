//! # Construction-time policy validation.
//!
//! [`validate`] checks an options set against the rules of one strategy and
//! returns the first violated rule as a [`ConfigError`]. Strategy constructors
//! call it before building anything, so no task can ever run with an
//! inconsistent policy.
//!
//! ## Rules
//! ```text
//!                     fixed      variable     exponential
//! limit               checked    rejected     checked
//! unlimited_retries   paired     rejected     paired
//! delay               >= 0       rejected     rejected
//! delays              rejected   required     rejected
//! multipliers         rejected   paired       paired
//! allow / deny        exclusive, non-empty (all strategies)
//! ```

use crate::config::options::{RetryLimit, RetryOptions, StrategyKind};
use crate::error::ConfigError;

/// Validates `options` for the strategy `kind`.
///
/// ## Example
/// ```rust
/// use taskretry::{validate, ConfigError, RetryOptions, StrategyKind};
///
/// let opts = RetryOptions::new().with_limit(-1);
/// assert_eq!(
///     validate(StrategyKind::Fixed, &opts),
///     Err(ConfigError::NegativeLimit { limit: -1 })
/// );
/// ```
pub fn validate(kind: StrategyKind, options: &RetryOptions) -> Result<(), ConfigError> {
    match kind {
        StrategyKind::Fixed => validate_fixed(options),
        StrategyKind::Variable => validate_variable(options),
        StrategyKind::Exponential => validate_exponential(options),
    }
}

fn validate_fixed(options: &RetryOptions) -> Result<(), ConfigError> {
    const NAME: &str = "fixed";
    check_limit(options)?;
    check_delay(options)?;
    if options.delays.is_some() {
        return Err(unsupported("delays", NAME));
    }
    if options.min_multiplier.is_some() {
        return Err(unsupported("min_multiplier", NAME));
    }
    if options.max_multiplier.is_some() {
        return Err(unsupported("max_multiplier", NAME));
    }
    check_error_lists(options)
}

fn validate_variable(options: &RetryOptions) -> Result<(), ConfigError> {
    const NAME: &str = "variable";
    if options.limit.is_some() {
        return Err(unsupported("limit", NAME));
    }
    if options.unlimited_retries {
        return Err(unsupported("unlimited_retries", NAME));
    }
    if options.delay.is_some() {
        return Err(unsupported("delay", NAME));
    }
    let delays = options.delays.as_ref().ok_or(ConfigError::MissingDelays)?;
    for (index, &delay) in delays.iter().enumerate() {
        if !is_non_negative(delay) {
            return Err(ConfigError::InvalidDelayEntry { index, delay });
        }
    }
    check_multipliers(options)?;
    check_error_lists(options)
}

fn validate_exponential(options: &RetryOptions) -> Result<(), ConfigError> {
    const NAME: &str = "exponential";
    check_limit(options)?;
    if options.delay.is_some() {
        return Err(unsupported("delay", NAME));
    }
    if options.delays.is_some() {
        return Err(unsupported("delays", NAME));
    }
    check_multipliers(options)?;
    check_error_lists(options)
}

/// Limit must be a count >= 0, or unlimited with the explicit opt-in.
fn check_limit(options: &RetryOptions) -> Result<(), ConfigError> {
    match (options.limit, options.unlimited_retries) {
        (Some(RetryLimit::Count(limit)), _) if limit < 0 => {
            Err(ConfigError::NegativeLimit { limit })
        }
        (Some(RetryLimit::Unlimited), false) => Err(ConfigError::UnlimitedNotConfirmed),
        (Some(RetryLimit::Count(_)) | None, true) => Err(ConfigError::UnlimitedFlagWithoutLimit),
        _ => Ok(()),
    }
}

fn check_delay(options: &RetryOptions) -> Result<(), ConfigError> {
    match options.delay {
        Some(delay) if !is_non_negative(delay) => Err(ConfigError::InvalidDelay { delay }),
        _ => Ok(()),
    }
}

fn check_multipliers(options: &RetryOptions) -> Result<(), ConfigError> {
    let (min, max) = match (options.min_multiplier, options.max_multiplier) {
        (None, None) => return Ok(()),
        (Some(min), Some(max)) => (min, max),
        _ => return Err(ConfigError::UnpairedMultiplier),
    };
    check_multiplier_range(min, max)
}

/// Bounds must be finite, non-negative and ordered.
pub(crate) fn check_multiplier_range(min: f64, max: f64) -> Result<(), ConfigError> {
    if !is_non_negative(min) {
        return Err(ConfigError::InvalidMultiplier {
            key: "min_multiplier",
            value: min,
        });
    }
    if !is_non_negative(max) {
        return Err(ConfigError::InvalidMultiplier {
            key: "max_multiplier",
            value: max,
        });
    }
    if min > max {
        return Err(ConfigError::InvertedMultipliers { min, max });
    }
    Ok(())
}

fn check_error_lists(options: &RetryOptions) -> Result<(), ConfigError> {
    if options.allow_list.is_some() && options.deny_list.is_some() {
        return Err(ConfigError::ConflictingErrorLists);
    }
    if options.allow_list.as_ref().is_some_and(Vec::is_empty) {
        return Err(ConfigError::EmptyErrorList { key: "allow_list" });
    }
    if options.deny_list.as_ref().is_some_and(Vec::is_empty) {
        return Err(ConfigError::EmptyErrorList { key: "deny_list" });
    }
    Ok(())
}

fn unsupported(key: &'static str, strategy: &'static str) -> ConfigError {
    ConfigError::UnsupportedOption { key, strategy }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorClass;

    fn io() -> ErrorClass {
        ErrorClass::of::<std::io::Error>()
    }

    #[test]
    fn fixed_accepts_valid_options() {
        let ok = [
            RetryOptions::new(),
            RetryOptions::new().unlimited(),
            RetryOptions::new().with_limit(0),
            RetryOptions::new().with_limit(3),
            RetryOptions::new().with_delay(0.0),
            RetryOptions::new().with_deny_list(vec![io()]),
            RetryOptions::new().with_allow_list(vec![io(), ErrorClass::any()]),
            RetryOptions::new()
                .with_limit(3)
                .with_delay(10.0)
                .with_allow_list(vec![io()]),
        ];
        for opts in &ok {
            assert_eq!(validate(StrategyKind::Fixed, opts), Ok(()), "{opts:?}");
        }
    }

    #[test]
    fn fixed_rejects_negative_limit() {
        let opts = RetryOptions::new().with_limit(-2);
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::NegativeLimit { limit: -2 })
        );
    }

    #[test]
    fn unlimited_requires_both_keys() {
        let opts = RetryOptions::new().with_unlimited_limit();
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::UnlimitedNotConfirmed)
        );

        let opts = RetryOptions::new().with_unlimited_retries(true);
        assert_eq!(
            validate(StrategyKind::Exponential, &opts),
            Err(ConfigError::UnlimitedFlagWithoutLimit)
        );

        let opts = RetryOptions::new().with_limit(4).with_unlimited_retries(true);
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::UnlimitedFlagWithoutLimit)
        );
    }

    #[test]
    fn fixed_rejects_negative_or_nan_delay() {
        for delay in [-1.0, f64::NAN, f64::INFINITY] {
            let opts = RetryOptions::new().with_delay(delay);
            assert!(matches!(
                validate(StrategyKind::Fixed, &opts),
                Err(ConfigError::InvalidDelay { .. })
            ));
        }
    }

    #[test]
    fn fixed_rejects_variable_only_keys() {
        let opts = RetryOptions::new().with_delays([1.0]);
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::UnsupportedOption {
                key: "delays",
                strategy: "fixed"
            })
        );
        let opts = RetryOptions::new().with_multipliers(1.0, 2.0);
        assert!(matches!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::UnsupportedOption {
                key: "min_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn error_lists_are_exclusive_and_non_empty() {
        let opts = RetryOptions::new()
            .with_allow_list(vec![io()])
            .with_deny_list(vec![ErrorClass::any()]);
        for kind in [StrategyKind::Fixed, StrategyKind::Exponential] {
            assert_eq!(
                validate(kind, &opts),
                Err(ConfigError::ConflictingErrorLists)
            );
        }

        let opts = RetryOptions::new()
            .with_deny_list(vec![io()])
            .with_allow_list(vec![]);
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::ConflictingErrorLists)
        );

        let opts = RetryOptions::new().with_deny_list(vec![]);
        assert_eq!(
            validate(StrategyKind::Fixed, &opts),
            Err(ConfigError::EmptyErrorList { key: "deny_list" })
        );
    }

    #[test]
    fn variable_requires_delays() {
        assert_eq!(
            validate(StrategyKind::Variable, &RetryOptions::new()),
            Err(ConfigError::MissingDelays)
        );
        assert_eq!(
            validate(
                StrategyKind::Variable,
                &RetryOptions::new().with_delays(Vec::<f64>::new())
            ),
            Ok(())
        );
        assert_eq!(
            validate(
                StrategyKind::Variable,
                &RetryOptions::new().with_delays([0.0, 3.0, 6.0, 10_000.0])
            ),
            Ok(())
        );
    }

    #[test]
    fn variable_rejects_limit_and_delay() {
        let opts = RetryOptions::new().with_delays(Vec::<f64>::new()).with_limit(3);
        assert_eq!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::UnsupportedOption {
                key: "limit",
                strategy: "variable"
            })
        );
        let opts = RetryOptions::new().with_delays([1.0]).with_delay(5.0);
        assert!(matches!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::UnsupportedOption { key: "delay", .. })
        ));
        let opts = RetryOptions::new().with_delays([1.0]).unlimited();
        assert!(matches!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::UnsupportedOption { key: "limit", .. })
        ));
    }

    #[test]
    fn variable_rejects_bad_delay_entries() {
        let opts = RetryOptions::new().with_delays([1.0, -3.0]);
        assert_eq!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::InvalidDelayEntry {
                index: 1,
                delay: -3.0
            })
        );
    }

    #[test]
    fn multipliers_must_be_paired_and_ordered() {
        let mut opts = RetryOptions::new().with_delays([1.0]);
        opts.min_multiplier = Some(0.8);
        assert_eq!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::UnpairedMultiplier)
        );

        let mut opts = RetryOptions::new().with_limit(3);
        opts.max_multiplier = Some(0.8);
        assert_eq!(
            validate(StrategyKind::Exponential, &opts),
            Err(ConfigError::UnpairedMultiplier)
        );

        let opts = RetryOptions::new().with_delays([1.0]).with_multipliers(1.5, 0.8);
        assert_eq!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::InvertedMultipliers { min: 1.5, max: 0.8 })
        );

        let opts = RetryOptions::new().with_delays([1.0]).with_multipliers(-1.0, 0.8);
        assert!(matches!(
            validate(StrategyKind::Variable, &opts),
            Err(ConfigError::InvalidMultiplier {
                key: "min_multiplier",
                ..
            })
        ));

        let opts = RetryOptions::new().with_delays([1.0]).with_multipliers(0.8, 0.8);
        assert_eq!(validate(StrategyKind::Variable, &opts), Ok(()));
    }

    #[test]
    fn exponential_rejects_explicit_delay() {
        let opts = RetryOptions::new().with_limit(2).with_delay(3.0);
        assert_eq!(
            validate(StrategyKind::Exponential, &opts),
            Err(ConfigError::UnsupportedOption {
                key: "delay",
                strategy: "exponential"
            })
        );
        let opts = RetryOptions::new().with_limit(2).with_delays([1.0, 2.0]);
        assert_eq!(
            validate(StrategyKind::Exponential, &opts),
            Err(ConfigError::UnsupportedOption {
                key: "delays",
                strategy: "exponential"
            })
        );
        let opts = RetryOptions::new().with_limit(-1);
        assert!(validate(StrategyKind::Exponential, &opts).is_err());
        let opts = RetryOptions::new().unlimited();
        assert_eq!(validate(StrategyKind::Exponential, &opts), Ok(()));
    }
}
