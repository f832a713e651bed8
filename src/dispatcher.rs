//! Delivery of the assembled briefing to every resolved destination.
//!
//! Destinations are served one at a time with a fixed pause between them.
//! A failure for one destination is recorded and the loop moves on; there
//! are no retries.

use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::telegram::{Destination, Transport};

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Pause between destinations.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1500);

/// Image sent after the text, with its caption.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub png: Vec<u8>,
    pub caption: String,
}

/// Per-destination results of one dispatch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: Vec<Destination>,
    pub failed: Vec<(Destination, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No destinations were resolved; nothing was sent.
    NothingToDo,
    Completed(DispatchSummary),
}

pub struct Dispatcher<'a> {
    transport: &'a dyn Transport,
    pacing: Duration,
}

impl<'a> Dispatcher<'a> {
    pub fn new(transport: &'a dyn Transport, pacing: Duration) -> Self {
        Self { transport, pacing }
    }

    /// Send `text` (and `attachment`, if any) to each destination.
    pub async fn dispatch(
        &self,
        text: &str,
        attachment: Option<&Attachment>,
        destinations: &BTreeSet<Destination>,
    ) -> DispatchOutcome {
        if destinations.is_empty() {
            info!("No destinations resolved; nothing to do");
            return DispatchOutcome::NothingToDo;
        }

        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        info!(
            "Dispatching to {} destination(s) in {} message part(s)",
            destinations.len(),
            chunks.len()
        );

        let mut summary = DispatchSummary::default();
        for (i, destination) in destinations.iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            match self.deliver(destination, &chunks, attachment).await {
                Ok(()) => {
                    info!("[{}] delivered", destination);
                    summary.delivered.push(destination.clone());
                }
                Err(e) => {
                    warn!("[{}] delivery failed: {:#}", destination, e);
                    summary.failed.push((destination.clone(), format!("{:#}", e)));
                }
            }
        }

        DispatchOutcome::Completed(summary)
    }

    async fn deliver(
        &self,
        destination: &Destination,
        chunks: &[String],
        attachment: Option<&Attachment>,
    ) -> anyhow::Result<()> {
        for chunk in chunks {
            self.transport.send_text(destination, chunk).await?;
        }
        if let Some(attachment) = attachment {
            self.transport
                .send_photo(destination, &attachment.png, &attachment.caption)
                .await?;
        }
        Ok(())
    }
}

/// Split `text` into parts of at most `limit` characters.
///
/// Breaks fall on blank lines (section boundaries) where possible, then on
/// single newlines, and only as a last resort inside a line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    for block in text.split("\n\n") {
        for piece in split_oversized(block, limit) {
            let joined_len = if current.is_empty() {
                piece.chars().count()
            } else {
                current.chars().count() + 2 + piece.chars().count()
            };
            if joined_len > limit && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn split_oversized(block: &str, limit: usize) -> Vec<String> {
    if block.chars().count() <= limit {
        return vec![block.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for line in block.split('\n') {
        let line_chars: Vec<char> = line.chars().collect();
        for segment in line_chars.chunks(limit) {
            let segment: String = segment.iter().collect();
            let joined_len = current.chars().count() + 1 + segment.chars().count();
            if !current.is_empty() && joined_len > limit {
                pieces.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&segment);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
