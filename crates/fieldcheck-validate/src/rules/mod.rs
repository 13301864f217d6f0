//! Built-in rule catalogue.
//!
//! Every rule follows the same contract as a caller-registered rule: it
//! receives a [`RuleInput`] and either passes, fails with a message (the
//! field's override message when one is configured) or reports a malformed
//! rule expression.

mod file;
mod format;
mod patterns;
mod range;

use crate::error::RuleResult;
use crate::registry::RuleRegistry;
use crate::rule::RuleInput;
use crate::value::Value;

type Builtin = fn(&RuleInput<'_>) -> RuleResult;

const BUILTINS: &[(&str, Builtin)] = &[
    ("required", required),
    ("regex", format::pattern),
    ("alpha", format::alpha),
    ("alpha_dash", format::alpha_dash),
    ("alpha_space", format::alpha_space),
    ("alpha_num", format::alpha_num),
    ("bool", format::boolean),
    ("between", range::between),
    ("credit_card", format::credit_card),
    ("coordinate", format::coordinate),
    ("css_color", format::css_color),
    ("digits", range::digits),
    ("digits_between", range::digits_between),
    ("date", format::date),
    ("email", format::email),
    ("float", format::float),
    ("ip", format::ip),
    ("ip_v4", format::ip_v4),
    ("ip_v6", format::ip_v6),
    ("json", format::json),
    ("lat", format::lat),
    ("lon", format::lon),
    ("len", range::len),
    ("min", range::min),
    ("max", range::max),
    ("mac_address", format::mac_address),
    ("numeric", format::numeric),
    ("numeric_between", range::numeric_between),
    ("url", format::url),
    ("uuid", format::uuid),
    ("uuid_v3", format::uuid_v3),
    ("uuid_v4", format::uuid_v4),
    ("uuid_v5", format::uuid_v5),
    ("in", format::one_of),
    ("not_in", format::none_of),
    ("size", file::size),
    ("ext", file::ext),
    ("mime", file::mime),
];

pub(crate) fn register_builtins(registry: &mut RuleRegistry) {
    for (name, rule) in BUILTINS {
        if let Err(err) = registry.register(*name, *rule) {
            tracing::error!(rule = *name, error = %err, "failed to register built-in rule");
        }
    }
}

/// Names of the built-in rules, in registration order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Fails on null, empty strings and collections, zero numbers, `false` and
/// unset nullable scalars. Uploaded files always pass.
pub(crate) fn required(input: &RuleInput<'_>) -> RuleResult {
    let present = match input.value {
        Value::Nullable { is_set, .. } => *is_set,
        Value::File(_) => true,
        other => !other.is_empty(),
    };
    input.check(present, || format!("The {} field is required", input.field))
}
