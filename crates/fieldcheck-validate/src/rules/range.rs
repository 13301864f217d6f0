//! Length, magnitude and digit-count rules.
//!
//! Strings are measured in characters, sequences and maps by item count,
//! numbers by value. Integer bounds are the truncation of the parsed bound.

use super::patterns;
use crate::error::RuleResult;
use crate::rule::RuleInput;
use crate::value::Value;

fn within(n: i128, min: i64, max: i64) -> bool {
    n >= i128::from(min) && n <= i128::from(max)
}

/// `between:min,max`
pub(crate) fn between(input: &RuleInput<'_>) -> RuleResult {
    let (min_f, max_f) = input.expr().bounds()?;
    let (min, max) = (min_f as i64, max_f as i64);
    let whole = || {
        format!(
            "The {} field must be between {} and {}",
            input.field, min, max
        )
    };

    match input.value.inner() {
        Value::Int(i) => input.check(within(i128::from(*i), min, max), whole),
        Value::UInt(u) => input.check(within(i128::from(*u), min, max), whole),
        Value::Float(f) => input.check(*f >= min_f && *f <= max_f, || {
            format!(
                "The {} field must be between {:.6} and {:.6}",
                input.field, min_f, max_f
            )
        }),
        other => match other.length() {
            Some(len) => input.check(within(len as i128, min, max), whole),
            None => Ok(()),
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum Limit {
    Min,
    Max,
}

impl Limit {
    fn extreme(self) -> &'static str {
        match self {
            Limit::Min => "minimum",
            Limit::Max => "maximum",
        }
    }

    fn comparison(self) -> &'static str {
        match self {
            Limit::Min => "less",
            Limit::Max => "greater",
        }
    }

    fn holds<T: PartialOrd>(self, value: T, bound: T) -> bool {
        match self {
            Limit::Min => value >= bound,
            Limit::Max => value <= bound,
        }
    }
}

fn limit(input: &RuleInput<'_>, kind: Limit) -> RuleResult {
    let bound_f = input.expr().single_number()?;
    let bound = bound_f as i64;
    let value_msg = || {
        format!(
            "The {} field value can not be {} than {}",
            input.field,
            kind.comparison(),
            bound
        )
    };

    match input.value.inner() {
        Value::String(s) => input.check(kind.holds(s.chars().count() as i128, bound.into()), || {
            format!("The {} field must be {} {} char", input.field, kind.extreme(), bound)
        }),
        Value::Seq(_) | Value::Map(_) => {
            let len = input.value.length().unwrap_or_default() as i128;
            input.check(kind.holds(len, bound.into()), || {
                format!(
                    "The {} field must be {} {} in size",
                    input.field,
                    kind.extreme(),
                    bound
                )
            })
        }
        Value::Int(i) => input.check(kind.holds(i128::from(*i), bound.into()), value_msg),
        Value::UInt(u) => input.check(kind.holds(i128::from(*u), bound.into()), value_msg),
        Value::Float(f) => input.check(kind.holds(*f, bound_f), || {
            format!(
                "The {} field value can not be {} than {:.6}",
                input.field,
                kind.comparison(),
                bound_f
            )
        }),
        _ => Ok(()),
    }
}

/// `min:n`
pub(crate) fn min(input: &RuleInput<'_>) -> RuleResult {
    limit(input, Limit::Min)
}

/// `max:n`
pub(crate) fn max(input: &RuleInput<'_>) -> RuleResult {
    limit(input, Limit::Max)
}

/// `len:n`: exact length; scalars are measured by their text.
pub(crate) fn len(input: &RuleInput<'_>) -> RuleResult {
    let want = input.expr().single_usize()?;
    let actual = input
        .value
        .length()
        .unwrap_or_else(|| input.text().chars().count());
    input.check(actual == want, || {
        format!("The {} field must be length of {}", input.field, want)
    })
}

/// `digits:n`: exactly `n` decimal digits. Floats are truncated first.
pub(crate) fn digits(input: &RuleInput<'_>) -> RuleResult {
    let want = input.expr().single_usize()?;
    let text = match input.value.inner() {
        Value::Float(f) => (f.trunc() as i64).to_string(),
        _ => input.text().into_owned(),
    };
    input.check(
        text.len() == want && patterns::digits().is_match(&text),
        || {
            if want == 1 {
                format!("The {} field must be 1 digit", input.field)
            } else {
                format!("The {} field must be {} digits", input.field, want)
            }
        },
    )
}

/// `digits_between:min,max`
pub(crate) fn digits_between(input: &RuleInput<'_>) -> RuleResult {
    let expr = input.expr();
    let (lo, hi) = expr.pair()?;
    let parse = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| crate::error::ConfigError::InvalidNumber {
                rule: input.rule.to_string(),
                value: s.to_string(),
            })
    };
    let (min, max) = (parse(lo)?, parse(hi)?);
    let text = input.text();
    input.check(
        patterns::numeric().is_match(&text) && (min..=max).contains(&text.len()),
        || {
            format!(
                "The {} field must be digits between {} and {}",
                input.field, min, max
            )
        },
    )
}

/// `numeric_between:min,max`; either bound may be left empty, not both.
///
/// When either bound is written without a decimal point the text must also
/// parse as an integer within the truncated bounds.
pub(crate) fn numeric_between(input: &RuleInput<'_>) -> RuleResult {
    let expr = input.expr();
    let (lo, hi) = expr.pair()?;
    if lo.is_empty() && hi.is_empty() {
        return Err(expr.invalid_argument().into());
    }
    let min_f = if lo.is_empty() {
        None
    } else {
        Some(expr.number(lo)?)
    };
    let max_f = if hi.is_empty() {
        None
    } else {
        Some(expr.number(hi)?)
    };
    let text = input.text();

    if !lo.contains('.') || !hi.contains('.') {
        let min = min_f.map_or(i64::MIN, |f| f as i64);
        let max = max_f.map_or(i64::MAX, |f| f as i64);
        let passed = text
            .parse::<i64>()
            .is_ok_and(|n| (min..=max).contains(&n));
        if !passed {
            return Err(input.fail(|| match (min_f, max_f) {
                (None, _) => format!(
                    "The {} field value can not be greater than {}",
                    input.field, max
                ),
                (_, None) => format!(
                    "The {} field value can not be less than {}",
                    input.field, min
                ),
                _ => format!(
                    "The {} field must be numeric value between {} and {}",
                    input.field, min, max
                ),
            }));
        }
    }

    let min = min_f.unwrap_or(f64::MIN);
    let max = max_f.unwrap_or(f64::MAX);
    let passed = text
        .parse::<f64>()
        .is_ok_and(|n| n >= min && n <= max);
    input.check(passed, || match (min_f, max_f) {
        (None, _) => format!(
            "The {} field value can not be greater than {:.6}",
            input.field, max
        ),
        (_, None) => format!(
            "The {} field value can not be less than {:.6}",
            input.field, min
        ),
        _ => format!(
            "The {} field must be numeric value between {:.6} and {:.6}",
            input.field, min, max
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, RuleFailure};

    fn run(rule: fn(&RuleInput<'_>) -> RuleResult, expr: &str, value: Value) -> Option<String> {
        match rule(&RuleInput::new("field", expr, &value)) {
            Ok(()) => None,
            Err(RuleFailure::Invalid(e)) => Some(e.message),
            Err(RuleFailure::Config(e)) => panic!("unexpected config error: {e}"),
        }
    }

    fn config_error(rule: fn(&RuleInput<'_>) -> RuleResult, expr: &str) -> ConfigError {
        let value = Value::from("1");
        match rule(&RuleInput::new("field", expr, &value)) {
            Err(RuleFailure::Config(e)) => e,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn between_measures_by_kind() {
        assert!(run(between, "between:3,5", "abcd".into()).is_none());
        assert_eq!(
            run(between, "between:3,5", "ab".into()).as_deref(),
            Some("The field field must be between 3 and 5")
        );
        assert!(run(between, "between:3,5", 4.into()).is_none());
        assert!(run(between, "between:3,5", 6u8.into()).is_some());
        assert!(run(between, "between:3,5", vec![1, 2, 3].into()).is_none());
        assert_eq!(
            run(between, "between:3.5,5.9", 2.0.into()).as_deref(),
            Some("The field field must be between 3.500000 and 5.900000")
        );
        assert!(run(between, "between:3,5", Value::Null).is_none());
    }

    #[test]
    fn between_counts_characters() {
        assert!(run(between, "between:3,3", "héé".into()).is_none());
    }

    #[test]
    fn between_rejects_malformed_bounds() {
        assert!(matches!(
            config_error(between, "between:3"),
            ConfigError::InvalidArgument { .. }
        ));
        assert!(matches!(
            config_error(between, "between:x,5"),
            ConfigError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn min_and_max() {
        assert_eq!(
            run(min, "min:5", "abc".into()).as_deref(),
            Some("The field field must be minimum 5 char")
        );
        assert_eq!(
            run(max, "max:2", vec!["a", "b", "c"].into()).as_deref(),
            Some("The field field must be maximum 2 in size")
        );
        assert_eq!(
            run(min, "min:18", 17.into()).as_deref(),
            Some("The field field value can not be less than 18")
        );
        assert_eq!(
            run(max, "max:10", 10.5.into()).as_deref(),
            Some("The field field value can not be greater than 10.000000")
        );
        assert!(run(max, "max:10", 10.into()).is_none());
        assert!(run(min, "min:1", true.into()).is_none());
    }

    #[test]
    fn exact_length() {
        assert!(run(len, "len:4", "abcd".into()).is_none());
        assert!(run(len, "len:2", vec![1, 2].into()).is_none());
        assert!(run(len, "len:3", 123.into()).is_none());
        assert_eq!(
            run(len, "len:3", "ab".into()).as_deref(),
            Some("The field field must be length of 3")
        );
        assert!(matches!(
            config_error(len, "len:x"),
            ConfigError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn digit_count() {
        assert!(run(digits, "digits:5", "12345".into()).is_none());
        assert_eq!(
            run(digits, "digits:5", "123".into()).as_deref(),
            Some("The field field must be 5 digits")
        );
        assert_eq!(
            run(digits, "digits:1", "12".into()).as_deref(),
            Some("The field field must be 1 digit")
        );
        assert!(run(digits, "digits:3", 123.9.into()).is_none());
        assert!(run(digits, "digits:3", "12a".into()).is_some());
    }

    #[test]
    fn digit_range() {
        assert!(run(digits_between, "digits_between:4,5", "8887".into()).is_none());
        assert!(run(digits_between, "digits_between:4,5", "123".into()).is_some());
        assert!(run(digits_between, "digits_between:4,5", "12a4".into()).is_some());
        assert!(matches!(
            config_error(digits_between, "digits_between:4"),
            ConfigError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn numeric_range() {
        assert!(run(numeric_between, "numeric_between:18,60", "18".into()).is_none());
        assert_eq!(
            run(numeric_between, "numeric_between:18,60", "17".into()).as_deref(),
            Some("The field field must be numeric value between 18 and 60")
        );
        assert!(run(numeric_between, "numeric_between:18,60", 17.into()).is_some());
        assert_eq!(
            run(numeric_between, "numeric_between:,10", "11".into()).as_deref(),
            Some("The field field value can not be greater than 10")
        );
        assert!(run(numeric_between, "numeric_between:10,", "1000".into()).is_none());
        assert!(run(numeric_between, "numeric_between:1.5,2.5", "2.25".into()).is_none());
        assert_eq!(
            run(numeric_between, "numeric_between:1.5,2.5", "3.5".into()).as_deref(),
            Some("The field field must be numeric value between 1.500000 and 2.500000")
        );
        // Integer bounds reject fractional input.
        assert!(run(numeric_between, "numeric_between:1,5", "2.5".into()).is_some());
    }

    #[test]
    fn numeric_range_needs_a_bound() {
        assert!(matches!(
            config_error(numeric_between, "numeric_between:,"),
            ConfigError::InvalidArgument { .. }
        ));
        assert!(matches!(
            config_error(numeric_between, "numeric_between:a,3"),
            ConfigError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn override_replaces_float_message() {
        let value = Value::from(1.0);
        let input = RuleInput::new("field", "min:2", &value).with_message(Some("too small"));
        match min(&input) {
            Err(RuleFailure::Invalid(e)) => assert_eq!(e.message, "too small"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
