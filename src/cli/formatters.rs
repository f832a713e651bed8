//! Output formatting module for CLI display
//!
//! Keeps terminal presentation (tables, colored status markers) apart
//! from the report and delivery logic.

use colored::Colorize;
use std::collections::BTreeSet;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::dispatcher::DispatchOutcome;
use crate::reports::Report;
use crate::telegram::Destination;

/// Per-section status table for `preview`.
pub fn format_section_table(report: &Report) -> String {
    #[derive(Tabled)]
    struct SectionRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Section")]
        title: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Lines")]
        lines: usize,
    }

    let rows: Vec<SectionRow> = report
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| SectionRow {
            index: i + 1,
            title: section.title.clone(),
            status: if section.ok {
                "ok".green().to_string()
            } else {
                "failed".red().to_string()
            },
            lines: section.fragment.lines().count(),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .modify(Columns::new(3..4), Alignment::right())
        .to_string()
}

/// Human-readable result of a dispatch run.
pub fn format_dispatch_outcome(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::NothingToDo => format!(
            "{} No chats found yet. Add the bot to a chat and send it a message first.",
            "ℹ".blue().bold()
        ),
        DispatchOutcome::Completed(summary) => {
            let mut lines = Vec::new();
            for destination in &summary.delivered {
                lines.push(format!("{} [{}] sent", "✓".green(), destination));
            }
            for (destination, error) in &summary.failed {
                lines.push(format!("{} [{}] failed: {}", "❌".red(), destination, error));
            }
            lines.push(format!(
                "\n{} Delivered to {} of {} chat(s)",
                "✓".green().bold(),
                summary.delivered.len().to_string().green(),
                summary.delivered.len() + summary.failed.len()
            ));
            lines.join("\n")
        }
    }
}

/// Listing for `chats`.
pub fn format_destinations(destinations: &BTreeSet<Destination>) -> String {
    if destinations.is_empty() {
        return format!("{} No chats found", "ℹ".blue().bold());
    }
    let mut output = format!("{} {} chat(s):\n", "📬".cyan().bold(), destinations.len());
    for destination in destinations {
        output.push_str(&format!("  • {}\n", destination));
    }
    output
}
