//! Application layer for the records console.
//!
//! Coordinates the backend API, the session and the two result views. The
//! terminal front-end drives everything through [`Router`].

pub mod login;
pub mod router;
pub mod session_context;
pub mod views;

pub use login::LoginUseCase;
pub use router::{Router, Screen};
pub use session_context::SessionContext;
pub use views::{AuditLogView, AuditOutcome, CsvExport, RecordSearchView, SearchOutcome};
