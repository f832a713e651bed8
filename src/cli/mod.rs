use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "market-briefing")]
#[command(version, about = "Morning US market briefing for Telegram chats")]
#[command(
    long_about = "Fetch index quotes, sector ETFs, FX, commodities, Treasury yields, news headlines and the earnings calendar, then post a formatted digest (and the finviz sector map) to Telegram."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/market-briefing/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report date, YYYY-MM-DD (defaults to today in Seoul)
    #[arg(long, global = true, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build the briefing and send it to every destination (default)
    Send {
        /// Send only to this chat id or @channel instead of discovering chats
        #[arg(long)]
        chat_id: Option<String>,

        /// Skip the finviz sector map screenshot
        #[arg(long)]
        no_map: bool,
    },

    /// Build the briefing and print it without sending
    Preview,

    /// List the chats the briefing would be sent to
    Chats,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Send {
            chat_id: None,
            no_map: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_send() {
        let cli = Cli::try_parse_from(["market-briefing"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::default());
    }

    #[test]
    fn test_send_flags_and_global_date() {
        let cli = Cli::try_parse_from([
            "market-briefing",
            "send",
            "--chat-id",
            "@briefing",
            "--no-map",
            "--date",
            "2026-10-16",
        ])
        .unwrap();
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(
            cli.command,
            Some(Commands::Send {
                chat_id: Some("@briefing".to_string()),
                no_map: true,
            })
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(
            Cli::try_parse_from(["market-briefing", "--date", "16/10/2026", "preview"]).is_err()
        );
    }
}
