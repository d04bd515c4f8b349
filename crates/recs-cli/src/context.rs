//! Process-wide setup shared by the shell and the one-shot commands.

use anyhow::{Context as _, Result};
use recs_application::{Router, SessionContext};
use recs_execution::{DiagnosticsBuffer, diagnostics, diagnostics::DEFAULT_CAPACITY};
use recs_infrastructure::{
    ConfigOverrides, ConfigService, ConsoleConfig, FileTokenStore, LogGuard, LogTarget, RecsPaths, init_logging,
    write_export,
};
use recs_interaction::HttpConsoleApi;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::render::TableRenderer;

/// Global options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub log_stderr: bool,
}

pub struct ConsoleContext {
    pub config: ConsoleConfig,
    pub paths: RecsPaths,
    pub router: Router,
    pub diagnostics: DiagnosticsBuffer,
    pub renderer: TableRenderer,
    _log_guard: LogGuard,
}

impl ConsoleContext {
    /// Loads config, starts logging, restores the saved session and wires
    /// the HTTP client into the router.
    pub async fn init(options: &StartupOptions) -> Result<Self> {
        let mut paths = RecsPaths::new(options.config_dir.as_deref())?;
        if let Some(file) = &options.config_file {
            paths = paths.with_config_file(file.clone());
        }

        let overrides = ConfigOverrides {
            base_url: options.base_url.clone(),
        };
        let config = ConfigService::new(paths.clone())
            .load(&overrides)
            .with_context(|| format!("Failed to load {}", paths.config_file().display()))?;

        if !config.ui.color {
            colored::control::set_override(false);
        }

        let (layer, diagnostics) = diagnostics(DEFAULT_CAPACITY);
        let target = if options.log_stderr {
            LogTarget::Stderr
        } else {
            LogTarget::Directory(paths.logs_dir())
        };
        let log_guard = init_logging(&config.logging.level, target, layer)?;

        let store = Arc::new(FileTokenStore::new(paths.session_file()));
        let session = Arc::new(SessionContext::new(store));
        match session.hydrate().await {
            Ok(true) => tracing::debug!("Restored saved session"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Could not read saved session"),
        }

        let api = Arc::new(HttpConsoleApi::new(config.server.base_url.clone(), config.server.timeout())?);
        tracing::info!(
            base_url = %api.base_url(),
            config = %paths.config_file().display(),
            "Console starting"
        );
        let router = Router::new(api, session, config.page_size());

        Ok(Self {
            renderer: TableRenderer::new(config.ui.color),
            config,
            paths,
            router,
            diagnostics,
            _log_guard: log_guard,
        })
    }

    pub fn export_dir(&self) -> &Path {
        &self.config.export.directory
    }

    /// Writes a CSV download into the export directory.
    pub fn save_export(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        Ok(write_export(self.export_dir(), file_name, contents)?)
    }
}
