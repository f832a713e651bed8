//! Economic headlines from an RSS 2.0 feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{FetchContext, SectionSource, MAX_ITEMS};
use crate::error::BriefingError;
use crate::scraping::fetch_html;
use crate::utils::{escape_html, squash_whitespace, truncate_chars, UNKNOWN};

/// Title budget for feed headlines.
pub const TITLE_BUDGET: usize = 70;

static ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("static item regex"));
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("static title regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").expect("static link regex"));
static PUB_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<pubDate\b[^>]*>(.*?)</pubDate>").expect("static pubDate regex")
});
static CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("static CDATA regex"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").expect("static entity regex")
});

/// One parsed feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
}

/// Extract items from an RSS document.
///
/// Items without a title or link are skipped.
pub fn parse_feed(xml: &str) -> Vec<FeedItem> {
    ITEM.captures_iter(xml)
        .filter_map(|item| {
            let body = item.get(1)?.as_str();
            let title = element_text(&TITLE, body)?;
            let link = element_text(&LINK, body)?;
            let published = element_text(&PUB_DATE, body);
            Some(FeedItem {
                title,
                link,
                published,
            })
        })
        .collect()
}

fn element_text(pattern: &Regex, body: &str) -> Option<String> {
    let raw = pattern.captures(body)?.get(1)?.as_str();
    let text = match CDATA.captures(raw) {
        Some(cdata) => cdata.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
        None => decode_entities(raw),
    };
    let text = squash_whitespace(&text);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode the XML predefined entities and numeric character references.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Render feed items as linked bullet lines with their publish time.
pub fn render_items(items: &[FeedItem]) -> String {
    if items.is_empty() {
        return "(RSS 항목 없음)".to_string();
    }
    items
        .iter()
        .take(MAX_ITEMS)
        .map(|item| {
            format!(
                "• <a href=\"{}\">{}</a>\n  {}",
                escape_html(&item.link),
                escape_html(&truncate_chars(&item.title, TITLE_BUDGET)),
                escape_html(item.published.as_deref().unwrap_or(UNKNOWN))
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Latest economy headlines from the configured RSS feed.
#[derive(Debug, Clone, Default)]
pub struct HeadlinesSection;

impl HeadlinesSection {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SectionSource for HeadlinesSection {
    fn title(&self) -> &str {
        "🔥 오늘의 주요 경제 헤드라인 (최근 5개)"
    }

    fn name(&self) -> &str {
        "뉴스"
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<String> {
        let xml = fetch_html(&ctx.http, &ctx.endpoints.news_rss)
            .await
            .context("Failed to fetch news feed")?;
        if !xml.contains("<rss") && !xml.contains("<channel") {
            return Err(BriefingError::Parse("response is not an RSS feed".to_string()).into());
        }

        let items = parse_feed(&xml);
        debug!("Parsed {} feed items", items.len());
        Ok(render_items(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>연합뉴스 경제</title>
  <item>
    <title><![CDATA[美 증시, 기술주 강세에 상승 마감]]></title>
    <link>https://www.yna.co.kr/view/AKR1</link>
    <pubDate>Fri, 16 Oct 2026 07:10:00 +0900</pubDate>
  </item>
  <item>
    <title>AT&amp;T &lt;실적&gt; 발표</title>
    <link>https://www.yna.co.kr/view/AKR2?a=1&amp;b=2</link>
  </item>
  <item>
    <link>https://www.yna.co.kr/view/no-title</link>
  </item>
</channel></rss>"#;

    #[test]
    fn test_parse_feed_handles_cdata_and_entities() {
        let items = parse_feed(FEED);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "美 증시, 기술주 강세에 상승 마감");
        assert_eq!(
            items[0].published.as_deref(),
            Some("Fri, 16 Oct 2026 07:10:00 +0900")
        );
        assert_eq!(items[1].title, "AT&T <실적> 발표");
        assert_eq!(items[1].link, "https://www.yna.co.kr/view/AKR2?a=1&b=2");
        assert!(items[1].published.is_none());
    }

    #[test]
    fn test_render_escapes_and_marks_missing_date() {
        let rendered = render_items(&parse_feed(FEED));
        assert!(rendered.contains(
            "• <a href=\"https://www.yna.co.kr/view/AKR1\">美 증시, 기술주 강세에 상승 마감</a>\n  Fri, 16 Oct 2026 07:10:00 +0900"
        ));
        assert!(rendered.contains("AT&amp;T &lt;실적&gt; 발표</a>\n  N/A"));
        assert!(rendered.contains("?a=1&amp;b=2"));
    }

    #[test]
    fn test_long_title_is_cut_at_budget() {
        let item = FeedItem {
            title: "가".repeat(71),
            link: "https://example.com".to_string(),
            published: None,
        };
        let rendered = render_items(&[item]);
        assert!(rendered.contains(&format!("{}...</a>", "가".repeat(70))));
    }

    #[test]
    fn test_render_caps_at_five_items() {
        let items: Vec<FeedItem> = (0..8)
            .map(|i| FeedItem {
                title: format!("headline {}", i),
                link: format!("https://example.com/{}", i),
                published: None,
            })
            .collect();
        let rendered = render_items(&items);
        assert_eq!(rendered.matches("• <a").count(), 5);
        assert!(!rendered.contains("headline 5"));
    }

    #[test]
    fn test_empty_feed_message() {
        assert_eq!(render_items(&[]), "(RSS 항목 없음)");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("&#8220;Fed&#x201D; &bogus;"), "\u{201c}Fed\u{201d} &bogus;");
    }
}
