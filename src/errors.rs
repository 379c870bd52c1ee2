use thiserror::Error;

/// Reasons a rewrite step left its input untouched.
///
/// None of these reach callers of the public API: every variant maps to
/// "return the input unchanged" at the boundary that produced it.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload has no `items` array")]
    MissingItems,

    #[error("invalid media url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("cannot switch '{from}' url to https")]
    SchemeRejected { from: String },

    #[error("no rkey available for appid '{appid}'")]
    MissingToken { appid: String },
}
