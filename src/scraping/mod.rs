// Web scraping module for fetching pages and capturing screenshots
// Plain HTTP for news and calendar pages, headless Chrome for the finviz map

pub mod finviz;

use anyhow::{anyhow, Context, Result};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

pub use finviz::MapCapture;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-]+)"#)
        .expect("static charset regex")
});

/// Fetch a page and decode it to UTF-8.
///
/// Korean portals still serve EUC-KR, sometimes announcing it only in a
/// `<meta>` tag, so the charset is taken from the Content-Type header,
/// then from the document head, then defaults to UTF-8.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching page {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| e.without_url())
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!("{} returned status {}", url, response.status()));
    }

    let header_charset = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_from_content_type);

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;

    Ok(decode_html(&bytes, header_charset.as_deref()))
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Decode raw page bytes using the declared or sniffed charset.
pub fn decode_html(bytes: &[u8], declared_charset: Option<&str>) -> String {
    let encoding = declared_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Page contained bytes invalid for {}", encoding.name());
    }
    text.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(2048)];
    let head = String::from_utf8_lossy(head);
    let label = META_CHARSET.captures(&head)?.get(1)?.as_str().to_string();
    Encoding::for_label(label.as_bytes())
}

/// Resolve a possibly relative link against the page it was found on.
pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let base = reqwest::Url::parse(base).ok()?;
    base.join(href.trim()).ok().map(|u| u.to_string())
}
