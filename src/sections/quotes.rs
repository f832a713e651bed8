//! Quote-table sections: indices, VIX, sector ETFs, FX, commodities and
//! Treasury yields. Each is a declared list of `(label, symbol)` pairs
//! fetched one after another from the Yahoo chart API.

use anyhow::Result;
use async_trait::async_trait;

use super::{FetchContext, SectionSource};
use crate::pricing::Quote;
use crate::utils::{escape_html, format_change_percent, format_optional};

/// One row of a quote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteSpec {
    pub label: &'static str,
    pub symbol: &'static str,
}

const fn spec(label: &'static str, symbol: &'static str) -> QuoteSpec {
    QuoteSpec { label, symbol }
}

pub const INDICES: &[QuoteSpec] = &[
    spec("다우존스", "^DJI"),
    spec("S&P 500", "^GSPC"),
    spec("나스닥", "^IXIC"),
    spec("러셀 2000", "^RUT"),
];

pub const VOLATILITY: &[QuoteSpec] = &[spec("VIX", "^VIX")];

pub const SECTORS: &[QuoteSpec] = &[
    spec("기술 (IT)", "XLK"),
    spec("금융", "XLF"),
    spec("에너지", "XLE"),
    spec("소비재", "XLY"),
    spec("헬스케어", "XLV"),
];

pub const CURRENCIES: &[QuoteSpec] = &[
    spec("원/달러", "KRW=X"),
    spec("유로/달러", "EURUSD=X"),
    spec("달러/엔", "JPY=X"),
    spec("달러 인덱스", "DX-Y.NYB"),
];

pub const COMMODITIES: &[QuoteSpec] = &[
    spec("WTI 원유", "CL=F"),
    spec("브렌트유", "BZ=F"),
    spec("금", "GC=F"),
    spec("은", "SI=F"),
    spec("천연가스", "NG=F"),
];

pub const YIELDS: &[QuoteSpec] = &[
    spec("13주", "^IRX"),
    spec("5년물", "^FVX"),
    spec("10년물", "^TNX"),
    spec("30년물", "^TYX"),
];

/// How a quote row is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `label: 1,234.56 (🔺 +0.53%)`
    PriceAndChange,
    /// `label: 🔺 +0.53%`
    ChangeOnly,
    /// `label: 4.123% (🔻 -0.41%)`
    Yield,
}

impl QuoteStyle {
    pub fn render(&self, quote: &Quote) -> String {
        let label = escape_html(&quote.label);
        let change = format_change_percent(quote.change_percent);
        match self {
            QuoteStyle::PriceAndChange => format!(
                "・<b>{}</b>: {} ({})",
                label,
                format_optional(quote.value, 2),
                change
            ),
            QuoteStyle::ChangeOnly => format!("・<b>{}</b>: {}", label, change),
            QuoteStyle::Yield => {
                let value = match quote.value {
                    Some(_) => format!("{}%", format_optional(quote.value, 3)),
                    None => format_optional(None, 3),
                };
                format!("・<b>{}</b>: {} ({})", label, value, change)
            }
        }
    }
}

/// A section rendered from a fixed list of Yahoo symbols.
#[derive(Debug, Clone)]
pub struct QuoteSection {
    title: &'static str,
    name: &'static str,
    specs: &'static [QuoteSpec],
    style: QuoteStyle,
}

impl QuoteSection {
    pub fn new(
        title: &'static str,
        name: &'static str,
        specs: &'static [QuoteSpec],
        style: QuoteStyle,
    ) -> Self {
        Self {
            title,
            name,
            specs,
            style,
        }
    }

    pub fn indices() -> Self {
        Self::new(
            "📊 주요 지수 (최신 종가 / 변화율)",
            "지수",
            INDICES,
            QuoteStyle::PriceAndChange,
        )
    }

    pub fn volatility() -> Self {
        Self::new(
            "😱 변동성 지수",
            "VIX",
            VOLATILITY,
            QuoteStyle::PriceAndChange,
        )
    }

    pub fn sectors() -> Self {
        Self::new(
            "🏭 섹터별 변화율 (최근 종가 기준)",
            "섹터",
            SECTORS,
            QuoteStyle::ChangeOnly,
        )
    }

    pub fn currencies() -> Self {
        Self::new("💱 환율", "환율", CURRENCIES, QuoteStyle::PriceAndChange)
    }

    pub fn commodities() -> Self {
        Self::new(
            "🛢 원자재",
            "원자재",
            COMMODITIES,
            QuoteStyle::PriceAndChange,
        )
    }

    pub fn yields() -> Self {
        Self::new("🏦 미국 국채 금리", "금리", YIELDS, QuoteStyle::Yield)
    }
}

#[async_trait]
impl SectionSource for QuoteSection {
    fn title(&self) -> &str {
        self.title
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn try_fetch(&self, ctx: &FetchContext) -> Result<String> {
        let mut rows = Vec::with_capacity(self.specs.len());
        for spec in self.specs {
            let quote = ctx.yahoo.fetch_quote(spec.label, spec.symbol).await?;
            rows.push(self.style.render(&quote));
        }
        Ok(rows.join("\n"))
    }
}
