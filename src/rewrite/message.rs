use std::borrow::Cow;

use serde_json::Value;

use super::gate::should_apply;
use super::url::rewrite_message;
use crate::errors::RewriteError;
use crate::models::rkey::TokenPayload;

/// Refresh rkeys in every `items[].message` of a JSON payload.
///
/// Fail-open: a missing payload, a payload without tokens, text that is not
/// JSON, or JSON without an `items` array all return `text` unchanged. When
/// no message actually changes the original text is returned borrowed, so
/// callers never see formatting drift from a needless reserialization.
pub fn apply<'a>(text: &'a str, payload: Option<&TokenPayload>) -> Cow<'a, str> {
    let payload = match payload {
        Some(p) if p.has_token() => p,
        _ => return Cow::Borrowed(text),
    };

    match rewrite_items(text, payload) {
        Ok(Some(rewritten)) => Cow::Owned(rewritten),
        Ok(None) => Cow::Borrowed(text),
        Err(e) => {
            tracing::debug!(error = %e, "rkey: payload left untouched");
            Cow::Borrowed(text)
        }
    }
}

/// [`apply`] behind the [`should_apply`] pre-filter. `force` skips the
/// filter and always parses.
pub fn apply_gated<'a>(text: &'a str, payload: &TokenPayload, force: bool) -> Cow<'a, str> {
    if force || should_apply(text) {
        apply(text, Some(payload))
    } else {
        tracing::debug!("rkey: payload has no media urls of interest, skipping parse");
        Cow::Borrowed(text)
    }
}

/// Returns `Ok(None)` when no message changed.
///
/// JSON text holding a lone surrogate escape (`"\ud83d"`) cannot be decoded
/// into Rust strings, so such a payload is rejected as a whole and every
/// item keeps its old rkey.
fn rewrite_items(text: &str, payload: &TokenPayload) -> Result<Option<String>, RewriteError> {
    let mut container: Value = serde_json::from_str(text)?;
    let items = container
        .get_mut("items")
        .and_then(Value::as_array_mut)
        .ok_or(RewriteError::MissingItems)?;

    let mut changed = 0usize;
    for item in items.iter_mut() {
        let Some(message) = item.get_mut("message") else {
            continue;
        };
        let Value::String(current) = message else {
            continue;
        };
        let next = match rewrite_message(current, payload) {
            Cow::Owned(next) if next != *current => next,
            _ => continue,
        };
        *current = next;
        changed += 1;
    }

    if changed == 0 {
        return Ok(None);
    }
    tracing::debug!(messages = changed, "rkey: rewrote media urls");
    Ok(Some(serde_json::to_string(&container)?))
}
