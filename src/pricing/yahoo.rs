use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::Quote;
use crate::error::BriefingError;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "previousClose")]
    previous_close: Option<f64>,
    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Client for the Yahoo Finance v8 chart endpoint.
///
/// The base URL is injectable so tests can point it at a mock server.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Yahoo base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Yahoo base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }

    /// Fetch the latest price and day change for `symbol`.
    ///
    /// Transport, HTTP status and API errors are returned as `Err`. A
    /// response that lacks the price or previous close yields a quote with
    /// the missing values left unknown.
    pub async fn fetch_quote(&self, label: &str, symbol: &str) -> Result<Quote> {
        let url = self.chart_url(symbol)?;
        debug!("Fetching {} ({}) from Yahoo Finance", label, symbol);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Yahoo Finance for {}", symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Yahoo Finance returned error status for {}: {}",
                symbol,
                response.status()
            ));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Yahoo Finance response for {}", symbol))?;

        if let Some(error) = data.chart.error {
            return Err(anyhow!(
                "Yahoo Finance API error for {}: {} - {}",
                symbol,
                error.code,
                error.description
            ));
        }

        let result = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| {
                BriefingError::Parse(format!(
                    "no chart data returned from Yahoo Finance for {}",
                    symbol
                ))
            })?;

        let price = result
            .meta
            .regular_market_price
            .and_then(to_decimal);
        let previous_close = result
            .meta
            .previous_close
            .or(result.meta.chart_previous_close)
            .and_then(to_decimal);

        Ok(Quote::from_close(label, price, previous_close))
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(6))
}
