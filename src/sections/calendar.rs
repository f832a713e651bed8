//! Earnings calendar for the briefing date, scraped from the Yahoo Finance
//! calendar table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{FetchContext, SectionSource, MAX_ITEMS};
use crate::scraping::fetch_html;
use crate::utils::{escape_html, squash_whitespace, truncate_chars, UNKNOWN};

/// Budget for company names.
pub const COMPANY_BUDGET: usize = 50;

static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tbody tr").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));

// Column order of the calendar table
const COL_SYMBOL: usize = 0;
const COL_COMPANY: usize = 1;
const COL_CALL_TIME: usize = 3;
const COL_EPS_ESTIMATE: usize = 4;

/// One company reporting on the briefing date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarningsEvent {
    pub symbol: String,
    pub company: String,
    pub call_time: Option<String>,
    pub eps_estimate: Option<String>,
}

/// Calendar page URL for a given day.
pub fn calendar_url(base: &str, date: NaiveDate) -> String {
    format!("{}?day={}", base, date.format("%Y-%m-%d"))
}

fn cell_text(cell: Option<&ElementRef<'_>>) -> Option<String> {
    let text = squash_whitespace(&cell?.text().collect::<Vec<_>>().join(" "));
    match text.as_str() {
        "" | "-" | "--" => None,
        _ => Some(text),
    }
}

/// Parse calendar rows. Rows missing the symbol or company are skipped.
pub fn parse_calendar(html: &str) -> Vec<EarningsEvent> {
    let document = Html::parse_document(html);
    document
        .select(&ROW)
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
            let symbol = cell_text(cells.get(COL_SYMBOL))?;
            let company = cell_text(cells.get(COL_COMPANY))?;
            Some(EarningsEvent {
                symbol,
                company,
                call_time: cell_text(cells.get(COL_CALL_TIME)),
                eps_estimate: cell_text(cells.get(COL_EPS_ESTIMATE)),
            })
        })
        .take(MAX_ITEMS)
        .collect()
}

pub fn render_calendar(events: &[EarningsEvent]) -> String {
    if events.is_empty() {
        return "(예정된 실적 발표 없음)".to_string();
    }
    events
        .iter()
        .map(|event| {
            format!(
                "・<b>{}</b> {} ({}, EPS 예상 {})",
                escape_html(&event.symbol),
                escape_html(&truncate_chars(&event.company, COMPANY_BUDGET)),
                escape_html(event.call_time.as_deref().unwrap_or(UNKNOWN)),
                escape_html(event.eps_estimate.as_deref().unwrap_or(UNKNOWN))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Companies reporting earnings on the briefing date.
#[derive(Debug, Clone, Default)]
pub struct EarningsCalendarSection;

impl EarningsCalendarSection {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SectionSource for EarningsCalendarSection {
    fn title(&self) -> &str {
        "📅 오늘의 실적 발표 일정"
    }

    fn name(&self) -> &str {
        "실적 일정"
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<String> {
        let url = calendar_url(&ctx.endpoints.earnings_calendar, ctx.date);
        let html = fetch_html(&ctx.http, &url)
            .await
            .context("Failed to fetch earnings calendar")?;
        let events = parse_calendar(&html);
        debug!("Parsed {} earnings events for {}", events.len(), ctx.date);
        Ok(render_calendar(&events))
    }
}
