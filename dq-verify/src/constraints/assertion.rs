//! Assertions evaluated against a metric value.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type AssertionFn = Arc<dyn Fn(f64) -> Result<bool, String> + Send + Sync>;

/// An assertion that can be evaluated against a numeric value.
///
/// # Examples
///
/// ```rust
/// use dq_verify::constraints::Assertion;
///
/// // Value must equal 100
/// let assertion = Assertion::Equals(100.0);
/// assert_eq!(assertion.evaluate(100.0), Ok(true));
///
/// // Value must be between 10 and 20
/// let assertion = Assertion::Between(10.0, 20.0);
/// assert_eq!(assertion.evaluate(15.0), Ok(true));
///
/// // Any closure over the value
/// let assertion = Assertion::custom("is even", |v| v % 2.0 == 0.0);
/// assert_eq!(assertion.evaluate(3.0), Ok(false));
/// ```
#[derive(Clone)]
pub enum Assertion {
    /// Value must equal the specified value (with epsilon tolerance)
    Equals(f64),
    /// Value must not equal the specified value
    NotEquals(f64),
    /// Value must be greater than the specified value
    GreaterThan(f64),
    /// Value must be greater than or equal to the specified value
    GreaterThanOrEqual(f64),
    /// Value must be less than the specified value
    LessThan(f64),
    /// Value must be less than or equal to the specified value
    LessThanOrEqual(f64),
    /// Value must be between the specified range (inclusive)
    Between(f64, f64),
    /// Value must not be between the specified range
    NotBetween(f64, f64),
    /// A user supplied predicate with a description.
    Custom {
        description: String,
        predicate: AssertionFn,
    },
}

impl Assertion {
    /// Wraps an infallible predicate.
    pub fn custom<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            description: description.into(),
            predicate: Arc::new(move |value| Ok(predicate(value))),
        }
    }

    /// Wraps a predicate that may refuse to judge a value.
    pub fn fallible<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(f64) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self::Custom {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluates the assertion against a value.
    ///
    /// Returns `Err` when a custom predicate fails or panics.
    pub fn evaluate(&self, value: f64) -> Result<bool, String> {
        const EPSILON: f64 = 1e-10;

        let outcome = match self {
            Assertion::Equals(expected) => (value - expected).abs() < EPSILON,
            Assertion::NotEquals(expected) => (value - expected).abs() >= EPSILON,
            Assertion::GreaterThan(threshold) => value > *threshold,
            Assertion::GreaterThanOrEqual(threshold) => value >= *threshold,
            Assertion::LessThan(threshold) => value < *threshold,
            Assertion::LessThanOrEqual(threshold) => value <= *threshold,
            Assertion::Between(min, max) => value >= *min && value <= *max,
            Assertion::NotBetween(min, max) => value < *min || value > *max,
            Assertion::Custom { predicate, .. } => {
                return catch_unwind(AssertUnwindSafe(|| predicate(value)))
                    .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
            }
        };
        Ok(outcome)
    }

    /// Returns a human-readable description of the assertion.
    pub fn description(&self) -> String {
        match self {
            Assertion::Equals(v) => format!("equals {v}"),
            Assertion::NotEquals(v) => format!("not equals {v}"),
            Assertion::GreaterThan(v) => format!("greater than {v}"),
            Assertion::GreaterThanOrEqual(v) => format!("greater than or equal to {v}"),
            Assertion::LessThan(v) => format!("less than {v}"),
            Assertion::LessThanOrEqual(v) => format!("less than or equal to {v}"),
            Assertion::Between(min, max) => format!("between {min} and {max}"),
            Assertion::NotBetween(min, max) => format!("not between {min} and {max}"),
            Assertion::Custom { description, .. } => description.clone(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "assertion panicked".to_string()
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assertion({})", self.description())
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl Default for Assertion {
    /// Value must be exactly one.
    fn default() -> Self {
        Assertion::Equals(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        let assertion = Assertion::Equals(10.0);
        assert_eq!(assertion.evaluate(10.0), Ok(true));
        assert_eq!(assertion.evaluate(10.1), Ok(false));
    }

    #[test]
    fn test_greater_than() {
        let assertion = Assertion::GreaterThan(10.0);
        assert_eq!(assertion.evaluate(10.1), Ok(true));
        assert_eq!(assertion.evaluate(10.0), Ok(false));
    }

    #[test]
    fn test_between_is_inclusive() {
        let assertion = Assertion::Between(10.0, 20.0);
        assert_eq!(assertion.evaluate(10.0), Ok(true));
        assert_eq!(assertion.evaluate(20.0), Ok(true));
        assert_eq!(assertion.evaluate(20.1), Ok(false));
    }

    #[test]
    fn test_custom() {
        let assertion = Assertion::custom("at most 3", |v| v <= 3.0);
        assert_eq!(assertion.evaluate(3.0), Ok(true));
        assert_eq!(assertion.evaluate(4.0), Ok(false));
        assert_eq!(assertion.to_string(), "at most 3");
    }

    #[test]
    fn test_fallible_and_panicking_predicates() {
        let refusing = Assertion::fallible("no negatives", |v| {
            if v < 0.0 {
                Err(format!("cannot judge {v}"))
            } else {
                Ok(true)
            }
        });
        assert_eq!(refusing.evaluate(-1.0), Err("cannot judge -1".to_string()));

        let panicking = Assertion::custom("panics", |_| panic!("boom"));
        assert_eq!(panicking.evaluate(1.0), Err("boom".to_string()));
    }

    #[test]
    fn test_description() {
        assert_eq!(Assertion::Equals(10.0).description(), "equals 10");
        assert_eq!(
            Assertion::Between(1.0, 10.0).description(),
            "between 1 and 10"
        );
        assert_eq!(Assertion::default().description(), "equals 1");
    }
}
