//! Local storage and process setup for the records console.

pub mod config_service;
pub mod export;
pub mod logging;
pub mod paths;
pub mod storage;
pub mod token_store;

pub use config_service::{ConfigOverrides, ConfigService, ConsoleConfig};
pub use export::write_export;
pub use logging::{LogGuard, LogTarget, init_logging};
pub use paths::RecsPaths;
pub use token_store::FileTokenStore;
