use serde::{Deserialize, Serialize};

/// Fresh media access tokens handed to the rewriter by the caller.
///
/// Accepts the upstream wire names (`private_rkey`, `group_rkey`,
/// `expired_time`) as aliases so a token-service response can be
/// deserialized directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default, alias = "private_rkey", skip_serializing_if = "Option::is_none")]
    pub private_token: Option<String>,
    #[serde(default, alias = "group_rkey", skip_serializing_if = "Option::is_none")]
    pub group_token: Option<String>,
    /// Unix timestamp after which the tokens are stale. Carried along but
    /// never consulted when rewriting.
    #[serde(default, alias = "expired_time", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl TokenPayload {
    /// Private-chat token, or `""` when absent.
    pub fn private(&self) -> &str {
        self.private_token.as_deref().unwrap_or_default()
    }

    /// Group-chat token, or `""` when absent.
    pub fn group(&self) -> &str {
        self.group_token.as_deref().unwrap_or_default()
    }

    /// True when at least one of the two tokens is a non-empty string.
    pub fn has_token(&self) -> bool {
        !self.private().is_empty() || !self.group().is_empty()
    }
}
