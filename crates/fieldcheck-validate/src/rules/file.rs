//! Rules for uploaded files. Values that are not files pass.

use crate::error::{ConfigError, RuleResult};
use crate::rule::RuleInput;

/// `size:bytes`: upper bound on the file size.
pub(crate) fn size(input: &RuleInput<'_>) -> RuleResult {
    let expr = input.expr();
    let raw = expr.params().ok_or_else(|| expr.invalid_argument())?.trim();
    let limit: u64 = raw.parse().map_err(|_| ConfigError::InvalidNumber {
        rule: input.rule.to_string(),
        value: raw.to_string(),
    })?;
    let Some(file) = input.value.as_file() else {
        return Ok(());
    };
    input.check(file.size() <= limit, || {
        format!(
            "The {} field size can not be greater than {} bytes",
            input.field, limit
        )
    })
}

/// `ext:jpg,png`: allow-list of filename extensions, compared exactly.
pub(crate) fn ext(input: &RuleInput<'_>) -> RuleResult {
    let allowed = input.expr().list()?;
    let Some(file) = input.value.as_file() else {
        return Ok(());
    };
    let ext = file.extension();
    input.check(allowed.contains(&ext), || {
        format!("The {} field file extension {} is invalid", input.field, ext)
    })
}

/// `mime:image/png,image/jpeg`: allow-list of sniffed MIME types.
pub(crate) fn mime(input: &RuleInput<'_>) -> RuleResult {
    let allowed = input.expr().list()?;
    let Some(file) = input.value.as_file() else {
        return Ok(());
    };
    let mime = file.mime();
    input.check(allowed.contains(&mime), || {
        format!("The {} field file mime {} is invalid", input.field, mime)
    })
}
