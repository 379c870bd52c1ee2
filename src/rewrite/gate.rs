use super::hosts::NEW_MEDIA_HOST;

/// Cheap pre-filter: true when `text` may hold a media URL worth rewriting.
///
/// Pure substring checks, so callers can run it on every payload before
/// paying for a JSON parse.
pub fn should_apply(text: &str) -> bool {
    text.contains(NEW_MEDIA_HOST) || text.contains("appid=1406") || text.contains("appid=1407")
}
