//! API audit log entries returned by the audit endpoint.

mod model;

pub use model::{AuditColumn, AuditLogEntry};
