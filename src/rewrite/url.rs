//! Media URL rewriting: host migration and rkey injection.
//!
//! Two textual encodings carry media URLs inside a message:
//! - **key-value**: `url=<url>` / `file=<url>` inside CQ-style segments
//! - **bracket**: `[image:<url>]` / `[图:<url>]`
//!
//! Every failure here is local to one URL. A malformed URL is left as it was
//! and the rest of the message is still processed.

use std::borrow::Cow;

use regex::Captures;
use url::Url;

use super::hosts::{
    is_new_media_appid, MediaHost, BRACKET_URL_RE, GROUP_APPID, KEY_VALUE_URL_RE, NEW_MEDIA_HOST,
};
use crate::errors::RewriteError;
use crate::models::rkey::TokenPayload;

/// Pick the rkey for a URL by appid.
///
/// Group media (`1407`) prefers the group token; everything else prefers the
/// private token. Falls back to the other token when the preferred one is
/// empty. An empty result means no token is available.
pub fn select_token<'a>(payload: &'a TokenPayload, appid: &str) -> &'a str {
    let (preferred, fallback) = if appid == GROUP_APPID {
        (payload.group(), payload.private())
    } else {
        (payload.private(), payload.group())
    };
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Rewrite a single media URL.
///
/// Any existing `rkey` is dropped. URLs on the new media host, and legacy
/// host URLs carrying a new-media appid (moved to the new host over https),
/// get the selected token as their `rkey`. Unparseable input comes back
/// unchanged.
pub fn rewrite_url(raw: &str, payload: &TokenPayload) -> String {
    match Url::parse(raw) {
        Ok(url) => rewrite_parsed(raw, url, payload),
        Err(e) => {
            let err = RewriteError::from(e);
            tracing::debug!(error = %err, "rkey: leaving url untouched");
            raw.to_string()
        }
    }
}

/// Rewrite every media URL embedded in `message`.
///
/// The key-value encoding is processed first, then the bracket encoding over
/// the result. Returns the input borrowed when neither pattern matches.
pub fn rewrite_message<'a>(message: &'a str, payload: &TokenPayload) -> Cow<'a, str> {
    let key_value = KEY_VALUE_URL_RE.replace_all(message, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], rewrite_embedded(&caps[2], payload))
    });

    let bracket = |caps: &Captures<'_>| {
        format!("{}{}{}", &caps[1], rewrite_embedded(&caps[2], payload), &caps[3])
    };

    match key_value {
        Cow::Borrowed(s) => BRACKET_URL_RE.replace_all(s, bracket),
        Cow::Owned(s) => Cow::Owned(BRACKET_URL_RE.replace_all(&s, bracket).into_owned()),
    }
}

/// Rewrite a URL found by one of the message patterns. The patterns only
/// anchor on the host prefix, so the parsed host must be an exact match
/// before anything is touched.
fn rewrite_embedded<'u>(raw: &'u str, payload: &TokenPayload) -> Cow<'u, str> {
    match Url::parse(raw) {
        Ok(url) if url.host_str().and_then(MediaHost::classify).is_some() => {
            Cow::Owned(rewrite_parsed(raw, url, payload))
        }
        Ok(url) => {
            tracing::trace!(host = ?url.host_str(), "rkey: not a media host, skipping");
            Cow::Borrowed(raw)
        }
        Err(e) => {
            let err = RewriteError::from(e);
            tracing::debug!(error = %err, "rkey: leaving embedded url untouched");
            Cow::Borrowed(raw)
        }
    }
}

fn rewrite_parsed(raw: &str, mut url: Url, payload: &TokenPayload) -> String {
    let appid = query_param(&url, "appid").unwrap_or_default();
    let stripped = remove_query_param(&mut url, "rkey");

    let needs_rkey = match url.host_str().and_then(MediaHost::classify) {
        Some(MediaHost::New) => true,
        Some(MediaHost::Legacy) if is_new_media_appid(&appid) => match migrate_host(&mut url) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "rkey: host migration failed");
                return raw.to_string();
            }
        },
        _ => false,
    };

    if needs_rkey {
        match inject_rkey(&mut url, payload, &appid) {
            Ok(()) => return url.into(),
            Err(e) => tracing::debug!(error = %e, "rkey: no token injected"),
        }
    }

    // Nothing injected: only reserialize if an rkey was actually removed or
    // the host moved, so untouched URLs keep their original spelling.
    if stripped || needs_rkey {
        url.into()
    } else {
        raw.to_string()
    }
}

fn migrate_host(url: &mut Url) -> Result<(), RewriteError> {
    url.set_host(Some(NEW_MEDIA_HOST))?;
    url.set_scheme("https")
        .map_err(|()| RewriteError::SchemeRejected {
            from: url.scheme().to_string(),
        })?;
    Ok(())
}

fn inject_rkey(url: &mut Url, payload: &TokenPayload, appid: &str) -> Result<(), RewriteError> {
    let rkey = select_token(payload, appid);
    if rkey.is_empty() {
        return Err(RewriteError::MissingToken {
            appid: appid.to_string(),
        });
    }
    tracing::trace!(appid = %appid, host = ?url.host_str(), "rkey: injecting token");
    url.query_pairs_mut().append_pair("rkey", rkey);
    Ok(())
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.into_owned())
}

/// Drop every `name` parameter. Returns true if any was present.
fn remove_query_param(url: &mut Url, name: &str) -> bool {
    if !url.query_pairs().any(|(k, _)| k == name) {
        return false;
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| *k != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    true
}
