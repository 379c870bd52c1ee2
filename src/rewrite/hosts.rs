use once_cell::sync::Lazy;
use regex::Regex;

// ── Hosts and appids ─────────────────────────────────────────

/// Media host that requires an `rkey` on every download.
pub const NEW_MEDIA_HOST: &str = "multimedia.nt.qq.com.cn";

/// Older media host. URLs here migrate to [`NEW_MEDIA_HOST`] when their
/// appid belongs to the new media stack.
pub const LEGACY_MEDIA_HOST: &str = "gchat.qpic.cn";

/// appid used for private-chat media.
pub const PRIVATE_APPID: &str = "1406";

/// appid used for group-chat media.
pub const GROUP_APPID: &str = "1407";

pub fn is_new_media_appid(appid: &str) -> bool {
    appid == PRIVATE_APPID || appid == GROUP_APPID
}

/// Which of the two known media hosts a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaHost {
    New,
    Legacy,
}

impl MediaHost {
    /// Classify a host name exactly (case-insensitive). Subdomains and
    /// look-alike suffixes do not match.
    pub fn classify(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        if host == NEW_MEDIA_HOST {
            Some(MediaHost::New)
        } else if host == LEGACY_MEDIA_HOST {
            Some(MediaHost::Legacy)
        } else {
            None
        }
    }
}

// ── Message patterns ─────────────────────────────────────────

/// `url=<media url>` / `file=<media url>`, ending at `,`, `]` or whitespace.
pub static KEY_VALUE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(url=|file=)(https?://(?:multimedia\.nt\.qq\.com\.cn|gchat\.qpic\.cn)[^,\]\s]+)")
        .unwrap()
});

/// `[image:<media url>]` / `[图:<media url>]`, ending at the closing bracket.
pub static BRACKET_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\[(?:image|图):)(https?://(?:multimedia\.nt\.qq\.com\.cn|gchat\.qpic\.cn)[^\]]+)(\])")
        .unwrap()
});
