//! Rules that inspect the textual form of a value.

use super::patterns;
use crate::error::{ConfigError, RuleResult};
use crate::rule::RuleInput;
use crate::value::Value;
use regex::Regex;

fn matches(input: &RuleInput<'_>, re: &Regex, default: impl FnOnce() -> String) -> RuleResult {
    input.check(re.is_match(&input.text()), default)
}

fn satisfies(
    input: &RuleInput<'_>,
    predicate: fn(&str) -> bool,
    default: impl FnOnce() -> String,
) -> RuleResult {
    input.check(predicate(&input.text()), default)
}

/// `regex:<pattern>`: the pattern is everything after the first colon.
pub(crate) fn pattern(input: &RuleInput<'_>) -> RuleResult {
    let expr = input.expr();
    let pattern = expr.params().ok_or_else(|| expr.invalid_argument())?;
    let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        rule: input.rule.to_string(),
        source,
    })?;
    matches(input, &re, || {
        format!("The {} field format is invalid", input.field)
    })
}

pub(crate) fn alpha(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::alpha(), || {
        format!("The {} may only contain letters", input.field)
    })
}

pub(crate) fn alpha_dash(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::alpha_dash(), || {
        format!(
            "The {} may only contain letters, numbers, and dashes",
            input.field
        )
    })
}

pub(crate) fn alpha_space(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::alpha_space(), || {
        format!(
            "The {} may only contain letters, numbers, dashes, space",
            input.field
        )
    })
}

pub(crate) fn alpha_num(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::alpha_numeric(), || {
        format!("The {} may only contain letters and numbers", input.field)
    })
}

/// Booleans pass; strings must be a boolean literal; numbers must be 0 or 1.
/// Other kinds pass untouched.
pub(crate) fn boolean(input: &RuleInput<'_>) -> RuleResult {
    let passed = match input.value.inner() {
        Value::String(s) => patterns::is_boolean(s),
        Value::Int(i) => *i == 0 || *i == 1,
        Value::UInt(u) => *u == 0 || *u == 1,
        Value::Float(f) => *f == 0.0 || *f == 1.0,
        _ => true,
    };
    input.check(passed, || {
        format!(
            "The {} may only contain boolean value, string or int 0, 1",
            input.field
        )
    })
}

pub(crate) fn credit_card(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::credit_card(), || {
        format!("The {} field must be a valid credit card number", input.field)
    })
}

pub(crate) fn coordinate(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::coordinate(), || {
        format!("The {} field must be a valid coordinate", input.field)
    })
}

pub(crate) fn css_color(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::css_color(), || {
        format!("The {} field must be a valid CSS color code", input.field)
    })
}

/// `date` accepts `yyyy-mm-dd`; `date:dd-mm-yyyy` accepts day-first dates.
/// Either form takes `/` or `-` as separator.
pub(crate) fn date(input: &RuleInput<'_>) -> RuleResult {
    if input.rule == "date:dd-mm-yyyy" {
        matches(input, patterns::date_dmy(), || {
            format!(
                "The {} field must be a valid date format. e.g: dd-mm-yyyy, dd/mm/yyyy etc",
                input.field
            )
        })
    } else {
        matches(input, patterns::date_ymd(), || {
            format!(
                "The {} field must be a valid date format. e.g: yyyy-mm-dd, yyyy/mm/dd etc",
                input.field
            )
        })
    }
}

pub(crate) fn email(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::email(), || {
        format!("The {} field must be a valid email address", input.field)
    })
}

pub(crate) fn float(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::float(), || {
        format!("The {} field must be a float number", input.field)
    })
}

pub(crate) fn ip(input: &RuleInput<'_>) -> RuleResult {
    satisfies(input, patterns::is_ip, || {
        format!("The {} field must be a valid IP address", input.field)
    })
}

pub(crate) fn ip_v4(input: &RuleInput<'_>) -> RuleResult {
    satisfies(input, patterns::is_ipv4, || {
        format!("The {} field must be a valid IPv4 address", input.field)
    })
}

pub(crate) fn ip_v6(input: &RuleInput<'_>) -> RuleResult {
    satisfies(input, patterns::is_ipv6, || {
        format!("The {} field must be a valid IPv6 address", input.field)
    })
}

pub(crate) fn json(input: &RuleInput<'_>) -> RuleResult {
    satisfies(input, patterns::is_json, || {
        format!("The {} field must contain valid JSON string", input.field)
    })
}

pub(crate) fn lat(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::latitude(), || {
        format!("The {} field must contain valid latitude", input.field)
    })
}

pub(crate) fn lon(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::longitude(), || {
        format!("The {} field must contain valid longitude", input.field)
    })
}

pub(crate) fn mac_address(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::mac_address(), || {
        format!("The {} field must be a valid Mac Address", input.field)
    })
}

pub(crate) fn numeric(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::numeric(), || {
        format!("The {} field must be numeric", input.field)
    })
}

pub(crate) fn url(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::url(), || {
        format!("The {} field format is invalid", input.field)
    })
}

pub(crate) fn uuid(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::uuid(), || {
        format!("The {} field must contain valid UUID", input.field)
    })
}

pub(crate) fn uuid_v3(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::uuid_v3(), || {
        format!("The {} field must contain valid UUID V3", input.field)
    })
}

pub(crate) fn uuid_v4(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::uuid_v4(), || {
        format!("The {} field must contain valid UUID V4", input.field)
    })
}

pub(crate) fn uuid_v5(input: &RuleInput<'_>) -> RuleResult {
    matches(input, patterns::uuid_v5(), || {
        format!("The {} field must contain valid UUID V5", input.field)
    })
}

/// `in:a,b,c`
pub(crate) fn one_of(input: &RuleInput<'_>) -> RuleResult {
    let options = input.expr().list()?;
    let text = input.text();
    input.check(options.iter().any(|o| *o == text), || {
        format!("The {} field must be one of {}", input.field, options.join(", "))
    })
}

/// `not_in:a,b,c`
pub(crate) fn none_of(input: &RuleInput<'_>) -> RuleResult {
    let options = input.expr().list()?;
    let text = input.text();
    input.check(!options.iter().any(|o| *o == text), || {
        format!(
            "The {} field must not be any of {}",
            input.field,
            options.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleFailure;

    fn run(rule: fn(&RuleInput<'_>) -> RuleResult, expr: &str, value: Value) -> Option<String> {
        match rule(&RuleInput::new("field", expr, &value)) {
            Ok(()) => None,
            Err(RuleFailure::Invalid(e)) => Some(e.message),
            Err(RuleFailure::Config(e)) => panic!("unexpected config error: {e}"),
        }
    }

    #[test]
    fn pattern_rule() {
        assert!(run(pattern, "regex:^[a-zA-Z]+$", "Jane".into()).is_none());
        assert_eq!(
            run(pattern, "regex:^[0-9]+$", "john".into()).as_deref(),
            Some("The field field format is invalid")
        );
        // Colons after the first belong to the pattern.
        assert!(run(pattern, "regex:^a:b$", "a:b".into()).is_none());
    }

    #[test]
    fn pattern_rule_rejects_bad_pattern() {
        let value = Value::from("x");
        let result = pattern(&RuleInput::new("field", "regex:(", &value));
        assert!(matches!(
            result,
            Err(RuleFailure::Config(ConfigError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn boolean_rule() {
        assert!(run(boolean, "bool", true.into()).is_none());
        assert!(run(boolean, "bool", false.into()).is_none());
        assert!(run(boolean, "bool", "1".into()).is_none());
        assert!(run(boolean, "bool", 0.into()).is_none());
        assert!(run(boolean, "bool", "abc".into()).is_some());
        assert!(run(boolean, "bool", 90.into()).is_some());
    }

    #[test]
    fn date_variants() {
        assert!(run(date, "date", "2016-10-14".into()).is_none());
        assert!(run(date, "date:dd-mm-yyyy", "14/10/2016".into()).is_none());
        assert_eq!(
            run(date, "date:dd-mm-yyyy", "2016-10-14".into()).as_deref(),
            Some("The field field must be a valid date format. e.g: dd-mm-yyyy, dd/mm/yyyy etc")
        );
    }

    #[test]
    fn membership() {
        assert!(run(one_of, "in:admin,user", "admin".into()).is_none());
        assert_eq!(
            run(one_of, "in:admin,user", "guest".into()).as_deref(),
            Some("The field field must be one of admin, user")
        );
        assert!(run(none_of, "not_in:root", "admin".into()).is_none());
        assert!(run(none_of, "not_in:root,admin", "root".into()).is_some());
        // Numbers compare by their text.
        assert!(run(one_of, "in:1,2,3", 2.into()).is_none());
    }

    #[test]
    fn membership_needs_options() {
        let value = Value::from("x");
        assert!(matches!(
            one_of(&RuleInput::new("f", "in", &value)),
            Err(RuleFailure::Config(ConfigError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn numbers_are_checked_by_text() {
        assert!(run(numeric, "numeric", 42.into()).is_none());
        assert!(run(float, "float", 4.5.into()).is_none());
        assert!(run(numeric, "numeric", "4.5".into()).is_some());
    }

    #[test]
    fn network_rules() {
        assert!(run(ip, "ip", "127.0.0.1".into()).is_none());
        assert!(run(ip_v4, "ip_v4", "::1".into()).is_some());
        assert!(run(ip_v6, "ip_v6", "::1".into()).is_none());
        assert!(run(mac_address, "mac_address", "00:1B:44:11:3A:B7".into()).is_none());
    }
}
