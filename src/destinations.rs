//! Destination resolution: a configured chat, or every chat the bot has
//! recently seen activity from.

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::telegram::{Destination, Transport, Update};

/// `getUpdates` offset that returns the most recent update.
pub const LATEST_OFFSET: i64 = -1;
pub const UPDATE_LIMIT: u32 = 100;
pub const UPDATE_TIMEOUT_SECS: u32 = 30;

/// Collect the unique destinations referenced by a batch of updates.
pub fn collect_destinations(updates: &[Update]) -> BTreeSet<Destination> {
    updates.iter().filter_map(Update::destination).collect()
}

/// Determine where the briefing goes.
///
/// A configured chat id short-circuits discovery. Otherwise recent updates
/// are polled; a transport failure is logged and treated as "no chats".
pub async fn resolve_destinations(
    configured: Option<&str>,
    transport: &dyn Transport,
) -> BTreeSet<Destination> {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        info!("Using configured destination {}", id);
        return BTreeSet::from([Destination::new(id)]);
    }

    match transport
        .recent_updates(LATEST_OFFSET, UPDATE_LIMIT, UPDATE_TIMEOUT_SECS)
        .await
    {
        Ok(updates) => {
            let destinations = collect_destinations(&updates);
            info!(
                "Discovered {} destination(s) from {} update(s)",
                destinations.len(),
                updates.len()
            );
            destinations
        }
        Err(e) => {
            warn!("Failed to fetch recent updates: {:#}", e);
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct UpdatesOnly {
        updates: Result<Vec<Update>, String>,
        polls: Mutex<usize>,
    }

    impl UpdatesOnly {
        fn new(updates: Result<Vec<Update>, String>) -> Self {
            Self {
                updates,
                polls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for UpdatesOnly {
        async fn send_text(&self, _chat: &Destination, _html: &str) -> Result<()> {
            unreachable!("resolver never sends")
        }

        async fn send_photo(&self, _chat: &Destination, _png: &[u8], _caption: &str) -> Result<()> {
            unreachable!("resolver never sends")
        }

        async fn recent_updates(
            &self,
            offset: i64,
            limit: u32,
            _timeout: u32,
        ) -> Result<Vec<Update>> {
            assert_eq!(offset, LATEST_OFFSET);
            assert_eq!(limit, UPDATE_LIMIT);
            *self.polls.lock().unwrap() += 1;
            self.updates.clone().map_err(|e| anyhow!(e))
        }
    }

    fn updates(json: &str) -> Vec<Update> {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_three_updates_from_one_chat_resolve_to_one_destination() {
        let transport = UpdatesOnly::new(Ok(updates(
            r#"[
                {"update_id": 1, "message": {"chat": {"id": 555}}},
                {"update_id": 2, "message": {"chat": {"id": 555}}},
                {"update_id": 3, "my_chat_member": {"chat": {"id": 555}}}
            ]"#,
        )));
        let resolved = resolve_destinations(None, &transport).await;
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains(&Destination::from(555)));
    }

    #[tokio::test]
    async fn test_configured_destination_skips_discovery() {
        let transport = UpdatesOnly::new(Ok(vec![]));
        let resolved = resolve_destinations(Some(" @briefing "), &transport).await;
        assert_eq!(resolved, BTreeSet::from([Destination::new("@briefing")]));
        assert_eq!(*transport.polls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_configured_destination_falls_back_to_discovery() {
        let transport = UpdatesOnly::new(Ok(updates(
            r#"[{"update_id": 9, "channel_post": {"chat": {"id": -100200}}}]"#,
        )));
        let resolved = resolve_destinations(Some("  "), &transport).await;
        assert_eq!(resolved, BTreeSet::from([Destination::from(-100200)]));
    }

    #[tokio::test]
    async fn test_no_updates_yields_empty_set() {
        let transport = UpdatesOnly::new(Ok(vec![]));
        assert!(resolve_destinations(None, &transport).await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_yields_empty_set() {
        let transport = UpdatesOnly::new(Err("401 Unauthorized".to_string()));
        assert!(resolve_destinations(None, &transport).await.is_empty());
    }

    #[test]
    fn test_collect_ignores_updates_without_chat() {
        let batch = updates(
            r#"[
                {"update_id": 1, "inline_query": {"id": "q"}},
                {"update_id": 2, "message": {"chat": {"id": 1}}},
                {"update_id": 3, "edited_message": {"chat": {"id": 2}}}
            ]"#,
        );
        let collected = collect_destinations(&batch);
        assert_eq!(
            collected,
            BTreeSet::from([Destination::from(1), Destination::from(2)])
        );
    }
}
