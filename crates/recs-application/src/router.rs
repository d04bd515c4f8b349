//! Screen selection for the console shell.

use crate::login::LoginUseCase;
use crate::session_context::SessionContext;
use crate::views::{AuditLogView, AuditOutcome, RecordSearchView};
use recs_core::api::ConsoleApi;
use recs_core::session::Credentials;
use recs_core::{RecsError, Result};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Screens the shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Screen {
    #[strum(serialize = "login")]
    Login,
    #[strum(serialize = "records")]
    RecordSearch,
    #[strum(serialize = "audit")]
    AuditLogs,
}

/// Owns the session and the views, and decides which screen is active.
///
/// [`Router::current_screen`] is `Login` whenever the session is
/// unauthenticated, regardless of the last route.
pub struct Router {
    api: Arc<dyn ConsoleApi>,
    session: Arc<SessionContext>,
    page_size: NonZeroUsize,
    login: LoginUseCase,
    records: Arc<RecordSearchView>,
    audit: RwLock<Option<Arc<AuditLogView>>>,
    route: RwLock<Screen>,
}

impl Router {
    pub fn new(api: Arc<dyn ConsoleApi>, session: Arc<SessionContext>, page_size: NonZeroUsize) -> Self {
        Self {
            login: LoginUseCase::new(api.clone(), session.clone()),
            records: Arc::new(RecordSearchView::new(api.clone(), session.clone(), page_size)),
            audit: RwLock::new(None),
            route: RwLock::new(Screen::RecordSearch),
            api,
            session,
            page_size,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn records(&self) -> &Arc<RecordSearchView> {
        &self.records
    }

    /// The mounted audit view, if the audit screen is active.
    pub async fn audit(&self) -> Option<Arc<AuditLogView>> {
        self.audit.read().await.clone()
    }

    pub async fn current_screen(&self) -> Screen {
        if !self.session.is_authenticated().await {
            return Screen::Login;
        }
        *self.route.read().await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.login.login(credentials).await?;
        *self.route.write().await = Screen::RecordSearch;
        Ok(())
    }

    /// Ends the session and resets the search form.
    pub async fn logout(&self) {
        self.session.clear().await;
        self.records.reset().await;
        self.close_audit().await;
        *self.route.write().await = Screen::RecordSearch;
        tracing::info!("Logged out");
    }

    /// Mounts a fresh audit view (default sort, page 0) and fetches the log.
    pub async fn open_audit_logs(&self) -> Result<(Arc<AuditLogView>, AuditOutcome)> {
        if !self.session.is_authenticated().await {
            return Err(RecsError::NotAuthenticated);
        }

        let view = Arc::new(AuditLogView::new(
            self.api.clone(),
            self.session.clone(),
            self.page_size,
        ));
        if let Some(previous) = self.audit.write().await.replace(view.clone()) {
            previous.unmount();
        }
        *self.route.write().await = Screen::AuditLogs;

        let outcome = view.mount().await?;
        if matches!(outcome, AuditOutcome::SessionExpired(_)) {
            self.close_audit().await;
        }
        Ok((view, outcome))
    }

    /// Returns to the record search screen, keeping its state.
    pub async fn back(&self) {
        self.close_audit().await;
        *self.route.write().await = Screen::RecordSearch;
    }

    /// Asks the backend whether the session token is still valid. A 401
    /// ends the session.
    pub async fn check_token(&self) -> Result<()> {
        let token = self.session.require_token().await?;
        match self.api.validate_token(&token).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Token rejected by backend, ending session");
                    self.session.clear().await;
                }
                Err(e)
            }
        }
    }

    async fn close_audit(&self) {
        if let Some(view) = self.audit.write().await.take() {
            view.unmount();
        }
    }
}
