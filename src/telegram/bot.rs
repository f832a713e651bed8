use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, Recipient};
use teloxide::RequestError;
use tracing::debug;

use super::{Destination, Transport, Update};
use crate::error::BriefingError;

/// File name the sector map is uploaded under.
const PHOTO_FILENAME: &str = "sector_map.png";

/// Telegram Bot API client backed by teloxide.
///
/// Built once by the entry point and handed to the resolver and
/// dispatcher. The token is never included in returned errors.
#[derive(Clone)]
pub struct TelegramBot {
    bot: Bot,
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("api_url", &self.bot.api_url().as_str())
            .finish_non_exhaustive()
    }
}

impl TelegramBot {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Point the client at another Bot API server (a local server or a mock).
    pub fn with_api_url(token: impl Into<String>, api_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(api_url).map_err(|e| {
            BriefingError::Config(format!("invalid Bot API URL {}: {}", api_url, e))
        })?;
        Ok(Self {
            bot: Bot::new(token).set_api_url(url),
        })
    }
}

/// Wrap a teloxide error as a transport failure for `method`.
fn transport_error(method: &str, err: RequestError) -> anyhow::Error {
    BriefingError::Transport(format!("{} failed: {}", method, err)).into()
}

#[async_trait]
impl Transport for TelegramBot {
    async fn send_text(&self, chat: &Destination, html: &str) -> Result<()> {
        debug!("sendMessage to {} ({} chars)", chat, html.chars().count());
        self.bot
            .send_message(Recipient::from(chat), html)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| transport_error("sendMessage", e))?;
        Ok(())
    }

    async fn send_photo(&self, chat: &Destination, png: &[u8], caption: &str) -> Result<()> {
        debug!("sendPhoto to {} ({} bytes)", chat, png.len());
        let photo = InputFile::memory(png.to_vec()).file_name(PHOTO_FILENAME);
        self.bot
            .send_photo(Recipient::from(chat), photo)
            .caption(caption)
            .await
            .map_err(|e| transport_error("sendPhoto", e))?;
        Ok(())
    }

    async fn recent_updates(
        &self,
        offset: i64,
        limit: u32,
        timeout_secs: u32,
    ) -> Result<Vec<Update>> {
        let offset = i32::try_from(offset).context("getUpdates offset out of range")?;
        let limit = u8::try_from(limit.min(100)).context("getUpdates limit out of range")?;
        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .limit(limit)
            .timeout(timeout_secs)
            .await
            .map_err(|e| transport_error("getUpdates", e))?;
        debug!("getUpdates returned {} updates", updates.len());
        Ok(updates.iter().map(Update::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_hides_token() {
        let bot = TelegramBot::new("123:secret");
        let debug = format!("{:?}", bot);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("api.telegram.org"));
    }

    #[test]
    fn test_invalid_api_url_is_config_error() {
        let err = TelegramBot::with_api_url("123:abc", "not a url").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
