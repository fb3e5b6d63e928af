use crate::backend::BackendProvider;
use crate::coercion::coerce_rows;
use crate::config::AnalystConfig;
use crate::context::AnalysisContext;
use crate::error::{AnalysisError, Result};
use crate::ingestion::{load_table, read_workbook_bytes};
use crate::llm::commentary::{request_commentary, Commentary};
use crate::ratios::RatioCache;
use crate::schema::{FinancialTable, RawRow};
use crate::session::ChatSession;
use crate::AnalysisSnapshot;
use log::info;
use std::path::Path;

/// Session-level state and the command handlers that drive it.
///
/// Each handler is one user action: loading a file, asking for commentary, or
/// submitting a chat message. Loading always clears the chat log first, and a
/// failed load leaves no table behind.
pub struct AnalystApp<P> {
    config: AnalystConfig,
    provider: P,
    cache: RatioCache,
    snapshot: Option<AnalysisSnapshot>,
    session: ChatSession,
}

impl<P: BackendProvider> AnalystApp<P> {
    pub fn new(config: AnalystConfig, provider: P) -> Self {
        let cache = RatioCache::new(config.cache_capacity);
        Self {
            config,
            provider,
            cache,
            snapshot: None,
            session: ChatSession::new(),
        }
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&AnalysisSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn on_file_loaded(&mut self, path: &Path) -> Result<&AnalysisSnapshot> {
        self.clear();
        let table = load_table(path)?;
        self.install(table)
    }

    pub fn on_bytes_loaded(&mut self, bytes: Vec<u8>) -> Result<&AnalysisSnapshot> {
        self.clear();
        let rows = read_workbook_bytes(bytes)?;
        self.install(coerce_rows(&rows))
    }

    pub fn on_table_loaded(&mut self, rows: &[RawRow]) -> Result<&AnalysisSnapshot> {
        self.clear();
        self.install(coerce_rows(rows))
    }

    /// Rebuilds the AI context from the currently loaded table.
    pub fn context(&self) -> Result<AnalysisContext> {
        let snapshot = self.snapshot.as_ref().ok_or(AnalysisError::NoTableLoaded)?;
        Ok(snapshot.context(&self.config.anchors))
    }

    pub async fn on_analyze_requested(&self) -> Result<Commentary> {
        let context = self.context()?;
        let generator = self.provider.connect()?;
        Ok(request_commentary(&generator, &self.config.model, &context).await)
    }

    /// Credential problems are reported before the message is logged.
    pub async fn on_chat_submitted(&mut self, user_text: &str) -> Result<String> {
        let context = self.context()?;
        let generator = self.provider.connect()?;
        let reply = self
            .session
            .ask(&generator, &self.config.model, &context, user_text)
            .await;
        Ok(reply)
    }

    fn clear(&mut self) {
        self.session.reset();
        self.snapshot = None;
    }

    fn install(&mut self, table: FinancialTable) -> Result<&AnalysisSnapshot> {
        let snapshot =
            AnalysisSnapshot::process_cached(&table, &self.config.anchors, &mut self.cache)?;
        info!(
            "Analysis ready: {} rows, {} warnings",
            snapshot.table.len(),
            snapshot.warnings.len()
        );
        Ok(&*self.snapshot.insert(snapshot))
    }
}
