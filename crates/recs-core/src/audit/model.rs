//! Audit log domain models.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::table::{CellValue, Column};

/// One API request recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub path: String,
    pub method: String,
    pub status_code: u16,
    /// ISO-8601, with or without an offset
    pub timestamp: String,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl AuditLogEntry {
    /// Parses `timestamp`; offset-less values are read as local time.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Local>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Local));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    }

    /// Timestamp as a local date-time string, or the raw value if unparsable.
    pub fn timestamp_local(&self) -> String {
        self.parsed_timestamp()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

/// Columns of the audit log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AuditColumn {
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "path")]
    Path,
    #[strum(serialize = "method")]
    Method,
    #[strum(serialize = "status_code", serialize = "status")]
    StatusCode,
    #[strum(serialize = "timestamp", serialize = "time")]
    Timestamp,
    #[strum(serialize = "client_ip", serialize = "ip")]
    ClientIp,
    #[strum(serialize = "user_agent", serialize = "agent")]
    UserAgent,
}

impl Column<AuditLogEntry> for AuditColumn {
    fn all() -> &'static [Self] {
        &[
            AuditColumn::Id,
            AuditColumn::Path,
            AuditColumn::Method,
            AuditColumn::StatusCode,
            AuditColumn::Timestamp,
            AuditColumn::ClientIp,
            AuditColumn::UserAgent,
        ]
    }

    fn key(&self) -> &'static str {
        match self {
            AuditColumn::Id => "id",
            AuditColumn::Path => "path",
            AuditColumn::Method => "method",
            AuditColumn::StatusCode => "status_code",
            AuditColumn::Timestamp => "timestamp",
            AuditColumn::ClientIp => "client_ip",
            AuditColumn::UserAgent => "user_agent",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AuditColumn::Id => "ID",
            AuditColumn::Path => "Path",
            AuditColumn::Method => "Method",
            AuditColumn::StatusCode => "Status Code",
            AuditColumn::Timestamp => "Timestamp",
            AuditColumn::ClientIp => "Client IP",
            AuditColumn::UserAgent => "User Agent",
        }
    }

    fn sort_value(&self, row: &AuditLogEntry) -> CellValue {
        match self {
            AuditColumn::Id => CellValue::Number(row.id as f64),
            AuditColumn::Path => CellValue::Text(row.path.clone()),
            AuditColumn::Method => CellValue::Text(row.method.clone()),
            AuditColumn::StatusCode => CellValue::Number(f64::from(row.status_code)),
            AuditColumn::Timestamp => CellValue::Number(
                row.parsed_timestamp()
                    .map(|dt| dt.timestamp_millis() as f64)
                    .unwrap_or(f64::NAN),
            ),
            AuditColumn::ClientIp => CellValue::text(row.client_ip.as_deref()),
            AuditColumn::UserAgent => CellValue::text(row.user_agent.as_deref()),
        }
    }

    fn display_value(&self, row: &AuditLogEntry) -> String {
        match self {
            AuditColumn::Timestamp => row.timestamp_local(),
            _ => self.export_value(row),
        }
    }

    fn export_value(&self, row: &AuditLogEntry) -> String {
        match self {
            AuditColumn::Id => row.id.to_string(),
            AuditColumn::Path => row.path.clone(),
            AuditColumn::Method => row.method.clone(),
            AuditColumn::StatusCode => row.status_code.to_string(),
            AuditColumn::Timestamp => row.timestamp.clone(),
            AuditColumn::ClientIp => row.client_ip.clone().unwrap_or_default(),
            AuditColumn::UserAgent => row.user_agent.clone().unwrap_or_default(),
        }
    }
}
