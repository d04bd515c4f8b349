//! Result screens.
//!
//! Both views own a [`recs_core::table::TableView`] behind a
//! `tokio::sync::RwLock`, run their fetch under a request ticket and clear
//! the session when the backend answers 401.

mod audit_log;
mod record_search;

pub use audit_log::{AUDIT_EXPORT_PREFIX, AuditLogState, AuditLogView, AuditOutcome};
pub use record_search::{RECORD_EXPORT_PREFIX, RecordSearchState, RecordSearchView, SearchOutcome};

use chrono::{DateTime, Utc};
use recs_core::table::{Column, TableView, export_file_name};

/// A rendered CSV download: file name plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

impl CsvExport {
    /// The full result set of `table` in its current sort order.
    pub fn from_table<T, C: Column<T>>(prefix: &str, table: &TableView<T, C>, at: DateTime<Utc>) -> Self {
        Self {
            file_name: export_file_name(prefix, at),
            contents: table.to_csv(),
        }
    }
}
