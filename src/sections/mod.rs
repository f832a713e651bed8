//! Report sections and the sources that fetch them.
//!
//! Every section of the briefing comes from exactly one external source
//! (the Yahoo chart API, an RSS feed or an HTML page). A source implements
//! [`SectionSource::try_fetch`] and may fail freely; callers go through
//! [`SectionSource::fetch`], which always yields a [`ReportSection`] and
//! turns any failure into an inline placeholder for that section only.

pub mod calendar;
pub mod headlines;
pub mod popular;
pub mod quotes;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::short_cause;
use crate::pricing::YahooClient;

pub use calendar::EarningsCalendarSection;
pub use headlines::HeadlinesSection;
pub use popular::PopularNewsSection;
pub use quotes::{QuoteSection, QuoteSpec, QuoteStyle};

/// Longest failure cause shown inside a placeholder.
const MAX_CAUSE_CHARS: usize = 120;

/// Most items listed by headline-style sections.
pub const MAX_ITEMS: usize = 5;

pub const DEFAULT_NEWS_RSS_URL: &str = "https://www.yna.co.kr/rss/economy.xml";
pub const DEFAULT_POPULAR_NEWS_URL: &str =
    "https://finance.naver.com/news/news_list.naver?mode=RANK";
pub const DEFAULT_EARNINGS_CALENDAR_URL: &str = "https://finance.yahoo.com/calendar/earnings";

/// One formatted fragment of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub fragment: String,
    pub ok: bool,
}

impl ReportSection {
    pub fn ready(title: &str, fragment: String) -> Self {
        Self {
            title: title.to_string(),
            fragment,
            ok: true,
        }
    }

    pub fn failed(title: &str, placeholder: String) -> Self {
        Self {
            title: title.to_string(),
            fragment: placeholder,
            ok: false,
        }
    }
}

/// URLs of the non-quote sources. Overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub news_rss: String,
    pub popular_news: String,
    pub earnings_calendar: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            news_rss: DEFAULT_NEWS_RSS_URL.to_string(),
            popular_news: DEFAULT_POPULAR_NEWS_URL.to_string(),
            earnings_calendar: DEFAULT_EARNINGS_CALENDAR_URL.to_string(),
        }
    }
}

/// Everything a source needs to fetch its data, built once per run.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub http: Client,
    pub yahoo: YahooClient,
    pub endpoints: Endpoints,
    /// Date the briefing is for (Seoul calendar day).
    pub date: NaiveDate,
}

impl FetchContext {
    pub fn new(http: Client, date: NaiveDate) -> Self {
        Self {
            yahoo: YahooClient::new(http.clone()),
            http,
            endpoints: Endpoints::default(),
            date,
        }
    }
}

/// A single report section backed by one external source.
#[async_trait]
pub trait SectionSource: Send + Sync {
    /// Heading printed above the section.
    fn title(&self) -> &str;

    /// Short name used in logs and failure placeholders.
    fn name(&self) -> &str;

    /// Fetch and render the section body.
    async fn try_fetch(&self, ctx: &FetchContext) -> Result<String>;

    /// Fetch the section, converting any failure into a placeholder.
    async fn fetch(&self, ctx: &FetchContext) -> ReportSection {
        match self.try_fetch(ctx).await {
            Ok(fragment) => {
                info!("Section '{}' ready", self.name());
                ReportSection::ready(self.title(), fragment)
            }
            Err(err) => {
                warn!("Section '{}' failed: {:#}", self.name(), err);
                ReportSection::failed(self.title(), placeholder(self.name(), &err))
            }
        }
    }
}

/// Inline text shown in place of a section that could not be fetched.
pub fn placeholder(name: &str, err: &anyhow::Error) -> String {
    format!(
        "({} 로드 실패: {})",
        name,
        crate::utils::escape_html(&short_cause(err, MAX_CAUSE_CHARS))
    )
}

/// The briefing's sections in their fixed report order.
pub fn default_sections() -> Vec<Box<dyn SectionSource>> {
    vec![
        Box::new(QuoteSection::indices()),
        Box::new(QuoteSection::volatility()),
        Box::new(QuoteSection::sectors()),
        Box::new(QuoteSection::currencies()),
        Box::new(QuoteSection::commodities()),
        Box::new(QuoteSection::yields()),
        Box::new(HeadlinesSection::new()),
        Box::new(PopularNewsSection::new()),
        Box::new(EarningsCalendarSection::new()),
    ]
}
