//! Search form state.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecsError, Result};

/// Optional text filters of the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum FilterField {
    #[strum(serialize = "phone")]
    Phone,
    #[strum(serialize = "voicemail")]
    Voicemail,
    #[strum(serialize = "user_id", serialize = "user-id", serialize = "userid", serialize = "user")]
    UserId,
    #[strum(serialize = "cluster")]
    Cluster,
}

impl FilterField {
    /// Query parameter name sent to the records endpoint.
    pub fn param(self) -> &'static str {
        match self {
            FilterField::Phone => "phone",
            FilterField::Voicemail => "voicemail",
            FilterField::UserId => "user_id",
            FilterField::Cluster => "cluster",
        }
    }
}

/// Date range plus optional filters for one record search.
///
/// Filters hold raw form text; an empty string means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub voicemail: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub cluster: String,
}

impl Default for SearchCriteria {
    /// A fresh form: both ends of the range at "now", no filters.
    fn default() -> Self {
        let now = Utc::now();
        Self::with_range(now, now)
    }
}

impl SearchCriteria {
    pub fn with_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            phone: String::new(),
            voicemail: String::new(),
            user_id: String::new(),
            cluster: String::new(),
        }
    }

    pub fn filter(&self, field: FilterField) -> &str {
        match field {
            FilterField::Phone => &self.phone,
            FilterField::Voicemail => &self.voicemail,
            FilterField::UserId => &self.user_id,
            FilterField::Cluster => &self.cluster,
        }
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Phone => self.phone = value,
            FilterField::Voicemail => self.voicemail = value,
            FilterField::UserId => self.user_id = value,
            FilterField::Cluster => self.cluster = value,
        }
    }

    /// Start of the range in epoch seconds.
    pub fn start_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    /// End of the range in epoch seconds.
    pub fn end_epoch(&self) -> i64 {
        self.end.timestamp()
    }

    /// Query parameters for the records endpoint.
    ///
    /// Empty filters are left out entirely rather than sent blank.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("start_date", self.start_epoch().to_string()),
            ("end_date", self.end_epoch().to_string()),
        ];
        for field in [
            FilterField::Phone,
            FilterField::Voicemail,
            FilterField::UserId,
            FilterField::Cluster,
        ] {
            let value = self.filter(field);
            if !value.is_empty() {
                params.push((field.param(), value.to_string()));
            }
        }
        params
    }
}

/// Parses a date-time typed into the search form.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM` with an optional `Z`,
/// `YYYY-MM-DD HH:MM[:SS]` in local time and a bare `YYYY-MM-DD` (local
/// midnight).
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(utc) = input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(utc, format) {
                return Ok(naive.and_utc());
            }
        }
    }

    for format in [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return local_to_utc(naive, input);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return local_to_utc(midnight, input);
    }

    Err(RecsError::config(format!(
        "Unrecognized date-time '{}': use e.g. 2024-01-01T00:00Z or 2024-01-01 08:30",
        input
    )))
}

fn local_to_utc(naive: NaiveDateTime, input: &str) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| RecsError::config(format!("'{}' does not exist in the local time zone", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn jan_first() -> SearchCriteria {
        SearchCriteria::with_range(
            parse_datetime("2024-01-01T00:00Z").unwrap(),
            parse_datetime("2024-01-02T00:00Z").unwrap(),
        )
    }

    #[test]
    fn test_epoch_conversion() {
        let criteria = jan_first();
        assert_eq!(criteria.start_epoch(), 1_704_067_200);
        assert_eq!(criteria.end_epoch(), 1_704_153_600);
    }

    #[test]
    fn test_empty_filters_are_omitted() {
        let params = jan_first().query_params();
        assert_eq!(
            params,
            vec![
                ("start_date", "1704067200".to_string()),
                ("end_date", "1704153600".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_filters_are_sent() {
        let mut criteria = jan_first();
        criteria.set_filter(FilterField::UserId, "u-7");
        criteria.set_filter(FilterField::Cluster, "east");
        let names: Vec<&str> = criteria.query_params().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["start_date", "end_date", "user_id", "cluster"]);

        criteria.set_filter(FilterField::UserId, "");
        assert!(criteria.query_params().iter().all(|(k, _)| *k != "user_id"));
    }

    #[test]
    fn test_sub_second_start_is_floored() {
        let start = parse_datetime("2024-01-01T00:00:00.900Z").unwrap();
        let criteria = SearchCriteria::with_range(start, start);
        assert_eq!(criteria.start_epoch(), 1_704_067_200);
    }

    #[test]
    fn test_parse_datetime_forms() {
        assert!(parse_datetime("2024-01-01T00:00:00+02:00").is_ok());
        assert!(parse_datetime("2024-01-01T08:30").is_ok());
        assert!(parse_datetime("2024-01-01 08:30").is_ok());
        assert!(parse_datetime("2024-01-01").is_ok());
        assert!(parse_datetime("01/02/2024").unwrap_err().is_config());
    }

    #[test]
    fn test_filter_field_names() {
        assert_eq!(FilterField::from_str("user-id").unwrap(), FilterField::UserId);
        assert_eq!(FilterField::from_str("PHONE").unwrap(), FilterField::Phone);
        assert_eq!(FilterField::UserId.param(), "user_id");
    }
}
