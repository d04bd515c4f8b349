use crate::session_context::SessionContext;
use recs_core::Result;
use recs_core::api::ConsoleApi;
use recs_core::session::Credentials;
use std::sync::Arc;

/// Exchanges credentials for a token and installs it in the session.
pub struct LoginUseCase {
    api: Arc<dyn ConsoleApi>,
    session: Arc<SessionContext>,
}

impl LoginUseCase {
    pub fn new(api: Arc<dyn ConsoleApi>, session: Arc<SessionContext>) -> Self {
        Self { api, session }
    }

    /// Submits `credentials` as typed; blank fields are left for the
    /// backend to reject.
    ///
    /// On failure the session is untouched and
    /// [`recs_core::RecsError::login_message`] gives the text to show.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        tracing::info!(username = %credentials.username, "Logging in");

        let token = match self.api.login(credentials).await {
            Ok(token) => token,
            Err(e) => {
                tracing::info!(error = %e, "Login rejected");
                return Err(e);
            }
        };

        self.session.set_token(Some(token.access_token)).await?;
        tracing::info!(username = %credentials.username, "Logged in");
        Ok(())
    }
}
