//! The end-to-end briefing run.
//!
//! Stages advance strictly forward:
//! `Idle → Fetching → Assembling → ResolvingDestinations → Dispatching → Done`.

use std::fmt;
use tracing::{debug, info, warn};

use crate::dispatcher::{Attachment, DispatchOutcome, Dispatcher};
use crate::reports::{self, Report};
use crate::scraping::{finviz::MAP_CAPTION, MapCapture};
use crate::sections::{FetchContext, SectionSource};
use crate::telegram::Transport;

/// Characters of the report logged as a preview.
const PREVIEW_CHARS: usize = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Fetching,
    Assembling,
    ResolvingDestinations,
    Dispatching,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Assembling => "assembling",
            Stage::ResolvingDestinations => "resolving destinations",
            Stage::Dispatching => "dispatching",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunResult {
    pub report: Report,
    pub outcome: DispatchOutcome,
    pub stages: Vec<Stage>,
}

/// One briefing run over injected sources, transport and capture.
pub struct Pipeline<'a> {
    ctx: &'a FetchContext,
    sources: &'a [Box<dyn SectionSource>],
    transport: &'a dyn Transport,
    chat_id: Option<String>,
    map: Option<MapCapture>,
    pacing: std::time::Duration,
    stage: Stage,
    stages: Vec<Stage>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        ctx: &'a FetchContext,
        sources: &'a [Box<dyn SectionSource>],
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            ctx,
            sources,
            transport,
            chat_id: None,
            map: None,
            pacing: crate::dispatcher::DEFAULT_PACING,
            stage: Stage::Idle,
            stages: vec![Stage::Idle],
        }
    }

    /// Deliver only to this chat instead of discovering chats.
    pub fn with_chat_id(mut self, chat_id: Option<String>) -> Self {
        self.chat_id = chat_id;
        self
    }

    /// Capture the sector map and attach it to each delivery.
    pub fn with_map(mut self, map: Option<MapCapture>) -> Self {
        self.map = map;
        self
    }

    pub fn with_pacing(mut self, pacing: std::time::Duration) -> Self {
        self.pacing = pacing;
        self
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "pipeline stages only move forward");
        info!("Pipeline: {} -> {}", self.stage, next);
        self.stage = next;
        self.stages.push(next);
    }

    pub async fn run(mut self) -> RunResult {
        self.advance(Stage::Fetching);
        let report = reports::assemble(self.sources, self.ctx).await;

        self.advance(Stage::Assembling);
        let text = report.render();
        debug!(
            "Report preview:\n{}",
            text.chars().take(PREVIEW_CHARS).collect::<String>()
        );

        self.advance(Stage::ResolvingDestinations);
        let destinations =
            crate::destinations::resolve_destinations(self.chat_id.as_deref(), self.transport)
                .await;

        let attachment = match (&self.map, destinations.is_empty()) {
            (Some(map), false) => capture_map(map.clone()).await,
            _ => None,
        };

        self.advance(Stage::Dispatching);
        let outcome = Dispatcher::new(self.transport, self.pacing)
            .dispatch(&text, attachment.as_ref(), &destinations)
            .await;

        self.advance(Stage::Done);
        RunResult {
            report,
            outcome,
            stages: self.stages,
        }
    }
}

/// Run the blocking browser capture off the async runtime. Failures are
/// logged and produce no attachment.
async fn capture_map(map: MapCapture) -> Option<Attachment> {
    match tokio::task::spawn_blocking(move || map.capture()).await {
        Ok(Ok(png)) => Some(Attachment {
            png,
            caption: MAP_CAPTION.to_string(),
        }),
        Ok(Err(e)) => {
            warn!("Finviz map capture failed: {:#}", e);
            None
        }
        Err(e) => {
            warn!("Finviz map capture task failed: {}", e);
            None
        }
    }
}
