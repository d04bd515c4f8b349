use super::CsvExport;
use crate::session_context::SessionContext;
use chrono::{DateTime, Utc};
use recs_core::Result;
use recs_core::api::ConsoleApi;
use recs_core::audit::{AuditColumn, AuditLogEntry};
use recs_core::table::TableView;
use recs_execution::RequestTracker;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// File name prefix of audit log exports.
pub const AUDIT_EXPORT_PREFIX: &str = "audit_logs";

/// Result of mounting the audit log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Loaded(usize),
    /// 401: the session has been cleared.
    SessionExpired(String),
    /// Any other failure. The table stays empty and nothing is shown to the
    /// user; the failure is logged at WARN.
    Unavailable,
    Superseded,
}

#[derive(Debug, Clone)]
pub struct AuditLogState {
    table: TableView<AuditLogEntry, AuditColumn>,
    loaded: bool,
}

impl AuditLogState {
    pub fn table(&self) -> &TableView<AuditLogEntry, AuditColumn> {
        &self.table
    }

    /// Whether the mount fetch has completed (successfully or not).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// The audit log screen. A fresh instance is mounted each time the screen
/// is opened.
pub struct AuditLogView {
    api: Arc<dyn ConsoleApi>,
    session: Arc<SessionContext>,
    tracker: RequestTracker,
    state: RwLock<AuditLogState>,
}

impl AuditLogView {
    pub fn new(api: Arc<dyn ConsoleApi>, session: Arc<SessionContext>, page_size: NonZeroUsize) -> Self {
        Self {
            api,
            session,
            tracker: RequestTracker::new(),
            state: RwLock::new(AuditLogState {
                table: TableView::new(AuditColumn::Timestamp).with_page_size(page_size),
                loaded: false,
            }),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&AuditLogState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn update_table<R>(&self, f: impl FnOnce(&mut TableView<AuditLogEntry, AuditColumn>) -> R) -> R {
        f(&mut self.state.write().await.table)
    }

    /// Fetches the whole audit log. No retry.
    pub async fn mount(&self) -> Result<AuditOutcome> {
        let token = self.session.require_token().await?;
        let ticket = self.tracker.begin();

        let Some(result) = ticket.run(self.api.fetch_audit_logs(&token)).await else {
            return Ok(AuditOutcome::Superseded);
        };

        let mut state = self.state.write().await;
        if !self.tracker.is_current(&ticket) {
            return Ok(AuditOutcome::Superseded);
        }
        self.tracker.finish(&ticket);
        state.loaded = true;

        match result {
            Ok(entries) => {
                let count = entries.len();
                state.table.replace_rows(entries);
                tracing::info!(count, "Audit log loaded");
                Ok(AuditOutcome::Loaded(count))
            }
            Err(e) if e.is_unauthorized() => {
                state.table.clear();
                drop(state);
                tracing::info!("Audit log fetch unauthorized, ending session");
                self.session.clear().await;
                Ok(AuditOutcome::SessionExpired(e.user_message()))
            }
            Err(e) => {
                state.table.clear();
                tracing::warn!(error = %e, "Failed to fetch audit logs");
                Ok(AuditOutcome::Unavailable)
            }
        }
    }

    /// CSV of every entry in the current sort order. An empty log exports
    /// just the header row.
    pub async fn export(&self, at: DateTime<Utc>) -> CsvExport {
        let state = self.state.read().await;
        CsvExport::from_table(AUDIT_EXPORT_PREFIX, &state.table, at)
    }

    /// Abandons an in-flight fetch.
    pub fn unmount(&self) {
        self.tracker.cancel_all();
    }
}
