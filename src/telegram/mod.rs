//! Telegram transport: chat identifiers, inbound update types and the
//! [`Transport`] seam used by the destination resolver and the dispatcher.

pub mod bot;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use teloxide::types::{self as tg, ChatId, Recipient, UpdateKind};

pub use bot::TelegramBot;

/// A chat the briefing can be delivered to: a numeric chat id or an
/// `@channel` handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for Destination {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for Destination {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
}

/// An inbound event as returned by `getUpdates`, reduced to the kinds
/// that identify a chat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
    pub channel_post: Option<Message>,
    pub my_chat_member: Option<ChatMemberUpdated>,
}

impl Update {
    /// The chat this update refers to, if it is one of the kinds that
    /// identify a destination.
    pub fn chat(&self) -> Option<&Chat> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .or(self.channel_post.as_ref())
            .map(|m| &m.chat)
            .or_else(|| self.my_chat_member.as_ref().map(|m| &m.chat))
    }

    pub fn destination(&self) -> Option<Destination> {
        self.chat().map(|chat| Destination::from(chat.id))
    }
}

impl From<&Destination> for Recipient {
    fn from(destination: &Destination) -> Self {
        match destination.as_str().parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(destination.as_str().to_string()),
        }
    }
}

impl From<&tg::Update> for Update {
    fn from(update: &tg::Update) -> Self {
        let message = |m: &tg::Message| {
            Some(Message {
                chat: Chat { id: m.chat.id.0 },
            })
        };
        match &update.kind {
            UpdateKind::Message(m) => Update {
                message: message(m),
                ..Update::default()
            },
            UpdateKind::EditedMessage(m) => Update {
                edited_message: message(m),
                ..Update::default()
            },
            UpdateKind::ChannelPost(m) => Update {
                channel_post: message(m),
                ..Update::default()
            },
            UpdateKind::MyChatMember(member) => Update {
                my_chat_member: Some(ChatMemberUpdated {
                    chat: Chat {
                        id: member.chat.id.0,
                    },
                }),
                ..Update::default()
            },
            _ => Update::default(),
        }
    }
}

/// Outbound messaging and inbound discovery against a chat service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTML-formatted message with link previews enabled.
    async fn send_text(&self, chat: &Destination, html: &str) -> Result<()>;

    /// Send a PNG image with a caption.
    async fn send_photo(&self, chat: &Destination, png: &[u8], caption: &str) -> Result<()>;

    /// Fetch recent inbound updates.
    async fn recent_updates(
        &self,
        offset: i64,
        limit: u32,
        timeout_secs: u32,
    ) -> Result<Vec<Update>>;
}
