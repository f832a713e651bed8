// Reports module - assembles section fragments into the briefing document

use chrono::NaiveDate;
use tracing::info;

use crate::sections::{FetchContext, ReportSection, SectionSource};

/// Closing lines appended to every briefing.
pub const FOOTER: &str = "더 자세한 내용은 Yahoo Finance, CNBC에서 확인하세요!\n#미국장 #경제브리핑";

/// Separator placed between sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// The assembled briefing: dated header, sections in order, static footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub date: NaiveDate,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn header(&self) -> String {
        format!(
            "<b>【미국장 아침 브리핑 - {} (서울 시간 기준)】</b>",
            self.date.format("%Y-%m-%d")
        )
    }

    /// Render the full document as Telegram HTML.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 2);
        parts.push(self.header());
        for section in &self.sections {
            parts.push(format!("<b>{}</b>\n{}", section.title, section.fragment));
        }
        parts.push(FOOTER.to_string());
        parts.join(SECTION_SEPARATOR)
    }

    pub fn failed_sections(&self) -> usize {
        self.sections.iter().filter(|s| !s.ok).count()
    }
}

/// Fetch every section in declared order and collect them into a report.
///
/// Sections are fetched one after another. A failing section contributes
/// its placeholder, so assembly itself never fails.
pub async fn assemble(sources: &[Box<dyn SectionSource>], ctx: &FetchContext) -> Report {
    let mut sections = Vec::with_capacity(sources.len());
    for source in sources {
        sections.push(source.fetch(ctx).await);
    }

    let report = Report {
        date: ctx.date,
        sections,
    };
    info!(
        "Assembled report for {} ({} sections, {} failed)",
        report.date,
        report.sections.len(),
        report.failed_sections()
    );
    report
}
