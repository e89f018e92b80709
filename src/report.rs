use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::fetch::ReportClient;
use crate::render::assemble_report;
use crate::responder::{
    OutboundMessage, OutboundSink, Responder, ResponderContext, ResponderResult,
};

/// Reply of last resort when an unexpected failure escapes the flow.
const BUSY_MESSAGE: &str = "系统繁忙，请稍后再试";

/// Correction shown to the user instead of running a fetch.
#[derive(Debug)]
pub struct UsageHint(pub String);

/// One prepared fetch: query parameters and the report header, both derived
/// from the user's arguments.
pub struct ReportRequest {
    pub query: Vec<(String, String)>,
    pub header: String,
}

impl ReportRequest {
    /// Request with no query parameters and a fixed header.
    pub fn bare(header: impl Into<String>) -> Self {
        Self {
            query: Vec::new(),
            header: header.into(),
        }
    }
}

/// Per-command description of one upstream report.
///
/// A source only knows where its data lives and what one item looks like;
/// the shared fetch/validate/render flow lives in [`ReportResponder`].
pub trait ReportSource: Send + Sync {
    /// Responder name for registration and logging.
    fn name(&self) -> &str;

    /// Command word that triggers this report.
    fn command(&self) -> &str;

    /// Endpoint path appended to the API base URL.
    fn path(&self) -> &str;

    /// Maximum number of items rendered per report.
    fn display_cap(&self) -> usize;

    /// Courtesy notice emitted before the fetch starts.
    fn progress_notice(&self) -> &str;

    /// Friendly reply for a successful fetch with zero items.
    fn empty_notice(&self) -> &str {
        "今日暂无数据"
    }

    /// Derive query parameters and the report header from user arguments,
    /// or reject the invocation with a usage correction.
    fn prepare(&self, args: &[&str]) -> Result<ReportRequest, UsageHint>;

    /// Render one item block, or `None` when required fields are missing
    /// (the item is skipped, not fatal).
    fn render_item(&self, item: &Value) -> Option<String>;
}

/// The fetch-validate-render flow shared by every report command.
///
/// Each invocation emits 1–2 messages through the context's outbound sink /
/// return value: an optional progress notice, then exactly one final reply
/// (report, empty notice, usage correction, or error message). No failure
/// propagates to the host.
pub struct ReportResponder<S> {
    source: S,
    client: Arc<ReportClient>,
}

impl<S: ReportSource> ReportResponder<S> {
    pub fn new(source: S, client: Arc<ReportClient>) -> Self {
        Self { source, client }
    }

    async fn run(&self, context: &ResponderContext) -> Result<OutboundMessage> {
        let request_id = Uuid::new_v4();
        let args = context.args();

        let request = match self.source.prepare(&args) {
            Ok(request) => request,
            Err(UsageHint(hint)) => {
                // No fetch happens on a usage error.
                info!(%request_id, source = self.source.name(), "Missing arguments, sending usage hint");
                return Ok(OutboundMessage::markdown(hint));
            }
        };

        // Courtesy notice before the blocking fetch; a delivery failure here
        // propagates like any other I/O failure.
        context
            .outbound
            .send(OutboundMessage::plain(self.source.progress_notice()))
            .await?;

        info!(
            %request_id,
            source = self.source.name(),
            sender = %context.sender,
            "Fetching report"
        );

        let envelope = match self
            .client
            .fetch_report(self.source.path(), &request.query)
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(%request_id, source = self.source.name(), error = %e, "Report fetch failed");
                return Ok(OutboundMessage::plain(e.user_message()));
            }
        };

        // First N items in source order; the upstream ordering is the ranking.
        let items: Vec<Value> = envelope
            .items
            .into_iter()
            .take(self.source.display_cap())
            .collect();

        if items.is_empty() {
            info!(%request_id, source = self.source.name(), "Report came back empty");
            return Ok(OutboundMessage::plain(self.source.empty_notice()));
        }

        let mut blocks = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.source.render_item(item) {
                Some(block) => blocks.push(block),
                None => {
                    warn!(
                        %request_id,
                        source = self.source.name(),
                        index,
                        "Skipping item with missing required fields"
                    );
                }
            }
        }

        let report = assemble_report(&request.header, &blocks, envelope.update_time.as_deref());
        info!(
            %request_id,
            source = self.source.name(),
            rendered = blocks.len(),
            "Report rendered"
        );

        Ok(OutboundMessage::plain(report))
    }
}

#[async_trait]
impl<S: ReportSource> Responder for ReportResponder<S> {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn should_handle(&self, context: &ResponderContext) -> bool {
        context.command() == Some(self.source.command())
    }

    async fn handle(&self, context: &ResponderContext) -> Result<ResponderResult> {
        match self.run(context).await {
            Ok(reply) => Ok(ResponderResult::Handled(Some(reply))),
            Err(e) => {
                // Last-resort catch: nothing unexpected may reach the host.
                let detail = format!("{e:#}");
                error!(
                    source = self.source.name(),
                    error = %detail,
                    "Report invocation failed unexpectedly"
                );
                Ok(ResponderResult::Handled(Some(OutboundMessage::plain(
                    BUSY_MESSAGE,
                ))))
            }
        }
    }
}
