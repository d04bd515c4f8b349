//! Runtime plumbing: request cancellation and diagnostics capture.

pub mod diagnostics;
pub mod request;

pub use diagnostics::{DiagnosticEvent, DiagnosticsBuffer, DiagnosticsLayer, diagnostics};
pub use request::{RequestTicket, RequestTracker};
