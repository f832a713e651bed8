use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use briefing::cli::{Cli, Commands};
use briefing::commands::{self, SendOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the token may come from the environment or config file.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.config.as_deref();
    match cli.command.unwrap_or_default() {
        Commands::Send { chat_id, no_map } => {
            commands::run_send(
                config,
                SendOptions {
                    chat_id,
                    no_map,
                    date: cli.date,
                },
            )
            .await
        }
        Commands::Preview => commands::run_preview(config, cli.date).await,
        Commands::Chats => commands::run_chats(config).await,
    }
}
