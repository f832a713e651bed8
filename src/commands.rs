//! Command handlers shared by the binary
//!
//! Each handler loads configuration, wires the HTTP client, sources and
//! transport together, and prints a human-readable result.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use reqwest::Client;
use std::path::Path;
use tracing::info;

use crate::cli::formatters;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::reports;
use crate::scraping::MapCapture;
use crate::sections::{default_sections, FetchContext};
use crate::telegram::TelegramBot;

/// Sent with every outbound request; several sources reject bare clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Today's calendar date in Seoul.
pub fn seoul_today() -> NaiveDate {
    Utc::now().with_timezone(&chrono_tz::Asia::Seoul).date_naive()
}

fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Options for `send` after CLI flags are merged.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub chat_id: Option<String>,
    pub no_map: bool,
    pub date: Option<NaiveDate>,
}

/// Build the briefing and deliver it.
pub async fn run_send(config_path: Option<&Path>, options: SendOptions) -> Result<()> {
    let config = Config::load(config_path)?;
    send_with_config(&config, options).await
}

/// `send` against an already resolved configuration. A missing token
/// fails here, before any source is fetched.
pub async fn send_with_config(config: &Config, options: SendOptions) -> Result<()> {
    let token = config.require_token()?;

    let date = options.date.unwrap_or_else(seoul_today);
    let ctx = FetchContext::new(http_client(config)?, date);
    let sources = default_sections();
    let bot = TelegramBot::new(token);

    let chat_id = options.chat_id.or_else(|| config.chat_id.clone());
    let map = (config.capture_map && !options.no_map).then(MapCapture::default);

    info!("Building briefing for {}", date);
    let result = Pipeline::new(&ctx, &sources, &bot)
        .with_chat_id(chat_id)
        .with_map(map)
        .with_pacing(config.send_delay())
        .run()
        .await;

    let failed = result.report.failed_sections();
    if failed > 0 {
        println!(
            "{} {} of {} section(s) used a placeholder",
            "⚠".yellow().bold(),
            failed,
            result.report.sections.len()
        );
    }
    println!("{}", formatters::format_dispatch_outcome(&result.outcome));
    Ok(())
}

/// Build the briefing and print it without sending.
pub async fn run_preview(config_path: Option<&Path>, date: Option<NaiveDate>) -> Result<()> {
    let config = Config::load(config_path)?;
    let date = date.unwrap_or_else(seoul_today);
    let ctx = FetchContext::new(http_client(&config)?, date);
    let sources = default_sections();

    let report = reports::assemble(&sources, &ctx).await;

    println!("{}\n", report.render());
    println!("{}", formatters::format_section_table(&report));
    Ok(())
}

/// Print the chats a `send` would currently deliver to.
pub async fn run_chats(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let bot = TelegramBot::new(config.require_token()?);

    let destinations =
        crate::destinations::resolve_destinations(config.chat_id.as_deref(), &bot).await;
    print!("{}", formatters::format_destinations(&destinations));
    if destinations.is_empty() {
        println!();
    }
    Ok(())
}
