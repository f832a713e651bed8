//! Error handling for the market briefing bot
//!
//! Defines the typed failures that callers match on and establishes a
//! unified Result type using anyhow for context chaining.

use thiserror::Error;

/// Core error types for the briefing pipeline
#[derive(Error, Debug)]
pub enum BriefingError {
    #[error("TELEGRAM_TOKEN is not set (environment, .env or config file)")]
    MissingToken,

    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for briefing operations
pub type Result<T> = anyhow::Result<T>;

/// Render an error as a short single-line cause for inline placeholders.
///
/// Only the outermost context and its immediate source are kept, newlines
/// are flattened and the text is capped at `max_chars` characters.
pub fn short_cause(err: &anyhow::Error, max_chars: usize) -> String {
    let mut chain = err.chain();
    let mut text = chain.next().map(|e| e.to_string()).unwrap_or_default();
    if let Some(source) = chain.next() {
        text = format!("{}: {}", text, source);
    }
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return "unknown error".to_string();
    }
    crate::utils::truncate_chars(&text, max_chars)
}
