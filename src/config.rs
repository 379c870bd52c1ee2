use serde::Deserialize;

use crate::models::rkey::TokenPayload;

/// Log output format for the binary's subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Tokens from `RKEY_PRIVATE` / `RKEY_GROUP` / `RKEY_EXPIRED_TIME`.
    /// CLI flags and `--payload` files take precedence.
    pub tokens: TokenPayload,
    /// Set via RKEY_LOG_FORMAT (`text` or `json`). Default: text.
    pub log_format: LogFormat,
}

impl Config {
    /// Layer explicit tokens over the environment ones. A non-empty field in
    /// `overrides` wins; unset or empty fields fall back to the environment.
    pub fn merged_tokens(&self, overrides: TokenPayload) -> TokenPayload {
        TokenPayload {
            private_token: non_empty_token(overrides.private_token)
                .or_else(|| self.tokens.private_token.clone()),
            group_token: non_empty_token(overrides.group_token)
                .or_else(|| self.tokens.group_token.clone()),
            expiry: overrides.expiry.or(self.tokens.expiry),
        }
    }

    /// Resolve the tokens for one run. Precedence, highest first: flags,
    /// payload file, environment.
    pub fn resolve_tokens(
        &self,
        file: Option<TokenPayload>,
        private_rkey: Option<String>,
        group_rkey: Option<String>,
    ) -> TokenPayload {
        let file = file.unwrap_or_default();
        let overrides = TokenPayload {
            private_token: non_empty_token(private_rkey)
                .or_else(|| non_empty_token(file.private_token)),
            group_token: non_empty_token(group_rkey).or_else(|| non_empty_token(file.group_token)),
            expiry: file.expiry,
        };
        self.merged_tokens(overrides)
    }
}

fn non_empty_token(token: Option<String>) -> Option<String> {
    token.filter(|v| !v.is_empty())
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a `Config` from an arbitrary variable source.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let expiry = match non_empty("RKEY_EXPIRED_TIME") {
        Some(raw) => Some(raw.trim().parse::<i64>().map_err(|e| {
            anyhow::anyhow!("RKEY_EXPIRED_TIME must be a unix timestamp, got '{}': {}", raw, e)
        })?),
        None => None,
    };

    let log_format = match non_empty("RKEY_LOG_FORMAT").as_deref().map(str::trim) {
        None => LogFormat::Text,
        Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        Some(other) => anyhow::bail!("RKEY_LOG_FORMAT must be 'text' or 'json', got '{}'", other),
    };

    Ok(Config {
        tokens: TokenPayload {
            private_token: non_empty("RKEY_PRIVATE"),
            group_token: non_empty("RKEY_GROUP"),
            expiry,
        },
        log_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults_when_env_empty() {
        let cfg = from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.tokens, TokenPayload::default());
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn test_config_reads_tokens() {
        let cfg = from_lookup(lookup_from(&[
            ("RKEY_PRIVATE", "P"),
            ("RKEY_GROUP", ""),
            ("RKEY_EXPIRED_TIME", "1700000000"),
            ("RKEY_LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(cfg.tokens.private_token.as_deref(), Some("P"));
        assert_eq!(cfg.tokens.group_token, None);
        assert_eq!(cfg.tokens.expiry, Some(1_700_000_000));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(from_lookup(lookup_from(&[("RKEY_EXPIRED_TIME", "soon")])).is_err());
        assert!(from_lookup(lookup_from(&[("RKEY_LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_overrides_win_over_env_tokens() {
        let cfg = from_lookup(lookup_from(&[("RKEY_PRIVATE", "env-p"), ("RKEY_GROUP", "env-g")]))
            .unwrap();
        let merged = cfg.merged_tokens(TokenPayload {
            group_token: Some("flag-g".into()),
            ..Default::default()
        });
        assert_eq!(merged.private(), "env-p");
        assert_eq!(merged.group(), "flag-g");
    }

    #[test]
    fn test_empty_override_does_not_clear_env_token() {
        let cfg = from_lookup(lookup_from(&[("RKEY_PRIVATE", "env-p")])).unwrap();
        let merged = cfg.merged_tokens(TokenPayload {
            private_token: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(merged.private(), "env-p");
    }

    #[test]
    fn test_resolve_tokens_precedence() {
        let cfg = from_lookup(lookup_from(&[
            ("RKEY_PRIVATE", "env-p"),
            ("RKEY_GROUP", "env-g"),
            ("RKEY_EXPIRED_TIME", "100"),
        ]))
        .unwrap();
        let file = TokenPayload {
            private_token: Some("file-p".into()),
            group_token: Some("file-g".into()),
            expiry: Some(200),
        };

        let tokens = cfg.resolve_tokens(Some(file.clone()), Some("flag-p".into()), None);
        assert_eq!(tokens.private(), "flag-p");
        assert_eq!(tokens.group(), "file-g");
        assert_eq!(tokens.expiry, Some(200));

        let tokens = cfg.resolve_tokens(None, None, None);
        assert_eq!(tokens.private(), "env-p");
        assert_eq!(tokens.group(), "env-g");
        assert_eq!(tokens.expiry, Some(100));
    }

    #[test]
    fn test_resolve_tokens_skips_empty_flags_and_file_fields() {
        let cfg = from_lookup(lookup_from(&[("RKEY_GROUP", "env-g")])).unwrap();
        let file = TokenPayload {
            private_token: Some("file-p".into()),
            group_token: Some(String::new()),
            expiry: None,
        };
        let tokens = cfg.resolve_tokens(Some(file), Some(String::new()), Some(String::new()));
        assert_eq!(tokens.private(), "file-p");
        assert_eq!(tokens.group(), "env-g");
    }
}
