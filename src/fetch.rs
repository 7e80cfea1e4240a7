use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FetchConfig;
use crate::error::FetchError;

static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").unwrap());

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static TITLE_END_PATTERN: Lazy<regex::bytes::Regex> =
    Lazy::new(|| regex::bytes::Regex::new(r"(?i)</title\s*>").unwrap());

/// Most of a page that is read while looking for its title.
pub const MAX_BODY_BYTES: usize = 512 * 1024;

/// Best-effort lookup of a page's `<title>`, used to fill in missing titles.
#[derive(Clone)]
pub struct TitleFetcher {
    client: reqwest::Client,
}

impl TitleFetcher {
    pub fn new(cfg: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(TitleFetcher { client })
    }

    /// Returns `None` on any failure. Errors are logged, never raised.
    pub async fn fetch_title(&self, url: &str) -> Option<String> {
        match self.try_fetch_title(url).await {
            Ok(title) => {
                tracing::info!(url = %url, title = %title, "fetched page title");
                Some(title)
            }
            Err(e) => {
                tracing::info!(url = %url, error = %crate::unpack_error(&e), "could not fetch page title");
                None
            }
        }
    }

    async fn try_fetch_title(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        // Stop at the closing title tag or the size cap, whichever comes first.
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let scan_from = body.len().saturating_sub(16);
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_BODY_BYTES || TITLE_END_PATTERN.is_match(&body[scan_from..]) {
                break;
            }
        }
        body.truncate(MAX_BODY_BYTES);

        let html = String::from_utf8_lossy(&body);
        extract_title(&html).ok_or_else(|| FetchError::NoTitle(url.to_owned()))
    }
}

/// Text content of the first `<title>` element, entity-decoded and with
/// whitespace collapsed. Empty titles count as missing.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_PATTERN.captures(html)?.get(1)?.as_str();
    let text = decode_entities(raw);
    let text = WHITESPACE_PATTERN.replace_all(text.trim(), " ").into_owned();
    if text.is_empty() { None } else { Some(text) }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
