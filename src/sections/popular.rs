//! Most-read finance news, scraped from a ranked list page, with a short
//! snippet of the top article.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::{FetchContext, SectionSource, MAX_ITEMS};
use crate::scraping::{absolute_url, fetch_html};
use crate::utils::{escape_html, squash_whitespace, truncate_chars};

/// Title budget for ranked news entries.
pub const TITLE_BUDGET: usize = 50;

/// Length of the article snippet shown under the top entry.
pub const SNIPPET_BUDGET: usize = 100;

static RANKED_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.simpleNewsList li a, div.hotNewsList li a").expect("static selector")
});

/// Article containers tried in order when extracting a snippet.
static ARTICLE_BODY: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["#newsct_article", "#dic_area", "div.articleCont", "#content"]
        .iter()
        .map(|s| Selector::parse(s).expect("static selector"))
        .collect()
});

/// One ranked news entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArticle {
    pub rank: usize,
    pub title: String,
    pub url: String,
}

/// Parse the ranked list page.
///
/// Anchors without text or a usable href are skipped; duplicates of an
/// already listed URL are dropped.
pub fn parse_ranked_list(html: &str, page_url: &str) -> Vec<RankedArticle> {
    let document = Html::parse_document(html);
    let mut articles: Vec<RankedArticle> = Vec::new();

    for anchor in document.select(&RANKED_LINK) {
        let title = anchor
            .value()
            .attr("title")
            .map(str::to_string)
            .unwrap_or_else(|| anchor.text().collect::<Vec<_>>().join(" "));
        let title = squash_whitespace(&title);
        if title.is_empty() {
            continue;
        }
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| absolute_url(page_url, href))
        else {
            continue;
        };
        if articles.iter().any(|a| a.url == url) {
            continue;
        }
        articles.push(RankedArticle {
            rank: articles.len() + 1,
            title,
            url,
        });
        if articles.len() == MAX_ITEMS {
            break;
        }
    }

    articles
}

/// First words of an article body, or `None` when no container matched.
pub fn extract_snippet(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    ARTICLE_BODY.iter().find_map(|selector| {
        let text = document
            .select(selector)
            .next()
            .map(|node| squash_whitespace(&node.text().collect::<Vec<_>>().join(" ")))?;
        if text.is_empty() {
            None
        } else {
            Some(truncate_chars(&text, SNIPPET_BUDGET))
        }
    })
}

/// Render ranked entries, putting the snippet under the first one.
pub fn render_ranked(articles: &[RankedArticle], snippet: Option<&str>) -> String {
    if articles.is_empty() {
        return "(항목 없음)".to_string();
    }
    let mut lines = Vec::with_capacity(articles.len() + 1);
    for article in articles {
        lines.push(format!(
            "{}. <a href=\"{}\">{}</a>",
            article.rank,
            escape_html(&article.url),
            escape_html(&truncate_chars(&article.title, TITLE_BUDGET))
        ));
        if article.rank == 1 {
            if let Some(snippet) = snippet {
                lines.push(format!("   └ <i>{}</i>", escape_html(snippet)));
            }
        }
    }
    lines.join("\n")
}

/// Most-read finance news.
#[derive(Debug, Clone, Default)]
pub struct PopularNewsSection;

impl PopularNewsSection {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SectionSource for PopularNewsSection {
    fn title(&self) -> &str {
        "👀 많이 본 뉴스 (상위 5개)"
    }

    fn name(&self) -> &str {
        "인기 뉴스"
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<String> {
        let page_url = &ctx.endpoints.popular_news;
        let html = fetch_html(&ctx.http, page_url)
            .await
            .context("Failed to fetch ranked news list")?;
        let articles = parse_ranked_list(&html, page_url);
        debug!("Parsed {} ranked articles", articles.len());

        let snippet = match articles.first() {
            Some(top) => match fetch_html(&ctx.http, &top.url).await {
                Ok(article_html) => extract_snippet(&article_html),
                Err(e) => {
                    warn!("Skipping article snippet: {:#}", e);
                    None
                }
            },
            None => None,
        };

        Ok(render_ranked(&articles, snippet.as_deref()))
    }
}
