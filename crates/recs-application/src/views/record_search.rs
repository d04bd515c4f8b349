use super::CsvExport;
use crate::session_context::SessionContext;
use chrono::{DateTime, Utc};
use recs_core::api::ConsoleApi;
use recs_core::record::{Record, RecordColumn};
use recs_core::search::SearchCriteria;
use recs_core::table::TableView;
use recs_core::Result;
use recs_execution::RequestTracker;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// File name prefix of record exports.
pub const RECORD_EXPORT_PREFIX: &str = "record_search";

/// What a call to [`RecordSearchView::search`] did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// New result set installed, page reset to 0.
    Loaded(usize),
    /// The backend rejected the search; the message is the view's error.
    Failed(String),
    /// 401: the session has been cleared.
    SessionExpired(String),
    /// A newer search (or a logout) took over; this result was discarded.
    Superseded,
}

/// Form, results and status of the record search screen.
#[derive(Debug, Clone)]
pub struct RecordSearchState {
    criteria: SearchCriteria,
    table: TableView<Record, RecordColumn>,
    error: Option<String>,
    loading: bool,
}

impl RecordSearchState {
    fn new(page_size: NonZeroUsize) -> Self {
        Self {
            criteria: SearchCriteria::default(),
            table: TableView::new(RecordColumn::OriginationTime).with_page_size(page_size),
            error: None,
            loading: false,
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn table(&self) -> &TableView<Record, RecordColumn> {
        &self.table
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// The record search screen.
pub struct RecordSearchView {
    api: Arc<dyn ConsoleApi>,
    session: Arc<SessionContext>,
    tracker: RequestTracker,
    page_size: NonZeroUsize,
    state: RwLock<RecordSearchState>,
}

impl RecordSearchView {
    pub fn new(api: Arc<dyn ConsoleApi>, session: Arc<SessionContext>, page_size: NonZeroUsize) -> Self {
        Self {
            api,
            session,
            tracker: RequestTracker::new(),
            page_size,
            state: RwLock::new(RecordSearchState::new(page_size)),
        }
    }

    /// Runs `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&RecordSearchState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn criteria(&self) -> SearchCriteria {
        self.state.read().await.criteria.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Edits the search form. Nothing is fetched until [`Self::search`].
    pub async fn update_criteria(&self, f: impl FnOnce(&mut SearchCriteria)) {
        f(&mut self.state.write().await.criteria);
    }

    /// Sorts or pages the current result set; never touches the network.
    pub async fn update_table<R>(&self, f: impl FnOnce(&mut TableView<Record, RecordColumn>) -> R) -> R {
        f(&mut self.state.write().await.table)
    }

    /// Fetches records for the current criteria.
    ///
    /// Starting a search cancels any search still in flight; only the
    /// newest search may write its result into the view.
    pub async fn search(&self) -> Result<SearchOutcome> {
        let token = self.session.require_token().await?;

        let (ticket, criteria) = {
            let mut state = self.state.write().await;
            state.loading = true;
            (self.tracker.begin(), state.criteria.clone())
        };
        tracing::debug!(
            request = ticket.id(),
            start = criteria.start_epoch(),
            end = criteria.end_epoch(),
            "Searching records"
        );

        let Some(result) = ticket.run(self.api.fetch_records(&token, &criteria)).await else {
            tracing::debug!(request = ticket.id(), "Search cancelled");
            return Ok(SearchOutcome::Superseded);
        };

        let mut state = self.state.write().await;
        if !self.tracker.is_current(&ticket) {
            tracing::debug!(request = ticket.id(), "Discarding superseded search result");
            return Ok(SearchOutcome::Superseded);
        }
        self.tracker.finish(&ticket);
        state.loading = false;

        match result {
            Ok(records) => {
                let count = records.len();
                state.table.replace_rows(records);
                state.error = None;
                tracing::info!(count, "Record search completed");
                Ok(SearchOutcome::Loaded(count))
            }
            Err(e) => {
                let message = e.user_message();
                state.table.clear();
                state.error = Some(message.clone());
                drop(state);

                if e.is_unauthorized() {
                    tracing::info!("Record search unauthorized, ending session");
                    self.session.clear().await;
                    Ok(SearchOutcome::SessionExpired(message))
                } else {
                    tracing::info!(error = %e, "Record search failed");
                    Ok(SearchOutcome::Failed(message))
                }
            }
        }
    }

    /// CSV of every fetched record in the current sort order; `None` while
    /// there are no results to download.
    pub async fn export(&self, at: DateTime<Utc>) -> Option<CsvExport> {
        let state = self.state.read().await;
        if state.table.is_empty() {
            return None;
        }
        Some(CsvExport::from_table(RECORD_EXPORT_PREFIX, &state.table, at))
    }

    /// Back to a fresh form: criteria at "now", no results, no error.
    pub async fn reset(&self) {
        self.tracker.cancel_all();
        *self.state.write().await = RecordSearchState::new(self.page_size);
    }
}
