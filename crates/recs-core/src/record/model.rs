//! Record domain models.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::table::{CellValue, Column};

/// Record identifier; the backend sends either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Numeric form used for ordering (`NaN` when the id is not numeric).
    pub fn as_number(&self) -> CellValue {
        match self {
            RecordId::Number(n) => CellValue::Number(*n as f64),
            RecordId::Text(s) => CellValue::coerce_number(s),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Device metadata attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Devices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voicemail: Option<String>,
}

/// A single call/voicemail event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,

    /// Epoch seconds
    #[serde(rename = "originationTime")]
    pub origination_time: i64,

    #[serde(rename = "clusterId", default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub devices: Devices,
}

impl Record {
    /// Origination time in local time, for display.
    pub fn origination_local(&self) -> String {
        match Local.timestamp_opt(self.origination_time, 0).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.origination_time.to_string(),
        }
    }
}

/// Columns of the record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum RecordColumn {
    #[strum(serialize = "_id", serialize = "id")]
    Id,
    #[strum(serialize = "originationTime", serialize = "origination_time", serialize = "time")]
    OriginationTime,
    #[strum(serialize = "clusterId", serialize = "cluster_id", serialize = "cluster")]
    ClusterId,
    #[strum(serialize = "userId", serialize = "user_id", serialize = "user")]
    UserId,
    #[strum(serialize = "phone")]
    Phone,
    #[strum(serialize = "voicemail")]
    Voicemail,
}

impl Column<Record> for RecordColumn {
    fn all() -> &'static [Self] {
        &[
            RecordColumn::Id,
            RecordColumn::OriginationTime,
            RecordColumn::ClusterId,
            RecordColumn::UserId,
            RecordColumn::Phone,
            RecordColumn::Voicemail,
        ]
    }

    fn key(&self) -> &'static str {
        match self {
            RecordColumn::Id => "_id",
            RecordColumn::OriginationTime => "originationTime",
            RecordColumn::ClusterId => "clusterId",
            RecordColumn::UserId => "userId",
            RecordColumn::Phone => "phone",
            RecordColumn::Voicemail => "voicemail",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RecordColumn::Id => "_id",
            RecordColumn::OriginationTime => "Origination Time",
            RecordColumn::ClusterId => "Cluster ID",
            RecordColumn::UserId => "User ID",
            RecordColumn::Phone => "Phone",
            RecordColumn::Voicemail => "Voicemail",
        }
    }

    fn sort_value(&self, row: &Record) -> CellValue {
        match self {
            RecordColumn::Id => row.id.as_number(),
            RecordColumn::OriginationTime => CellValue::Number(row.origination_time as f64),
            RecordColumn::ClusterId => CellValue::text(row.cluster_id.as_deref()),
            RecordColumn::UserId => CellValue::text(row.user_id.as_deref()),
            RecordColumn::Phone => CellValue::text(row.devices.phone.as_deref()),
            RecordColumn::Voicemail => CellValue::text(row.devices.voicemail.as_deref()),
        }
    }

    fn display_value(&self, row: &Record) -> String {
        match self {
            RecordColumn::OriginationTime => row.origination_local(),
            _ => self.export_value(row),
        }
    }

    fn export_value(&self, row: &Record) -> String {
        match self {
            RecordColumn::Id => row.id.to_string(),
            RecordColumn::OriginationTime => row.origination_time.to_string(),
            RecordColumn::ClusterId => row.cluster_id.clone().unwrap_or_default(),
            RecordColumn::UserId => row.user_id.clone().unwrap_or_default(),
            RecordColumn::Phone => row.devices.phone.clone().unwrap_or_default(),
            RecordColumn::Voicemail => row.devices.voicemail.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{SortDirection, SortState, TableView, sort_rows};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn record(id: i64, time: i64, user: &str, phone: &str) -> Record {
        Record {
            id: RecordId::Number(id),
            origination_time: time,
            cluster_id: Some("c1".to_string()),
            user_id: Some(user.to_string()),
            devices: Devices {
                phone: Some(phone.to_string()),
                voicemail: None,
            },
        }
    }

    #[test]
    fn test_deserialize_wire_record() {
        let json = r#"{
            "_id": "17",
            "originationTime": 1704067200,
            "clusterId": "cluster-a",
            "userId": "u-1",
            "devices": {"phone": "5551234", "voicemail": "vm-9"}
        }"#;
        let rec: Record = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, RecordId::Text("17".to_string()));
        assert_eq!(rec.origination_time, 1_704_067_200);
        assert_eq!(rec.devices.voicemail.as_deref(), Some("vm-9"));
        assert_eq!(rec.id.as_number(), CellValue::Number(17.0));
    }

    #[test]
    fn test_deserialize_without_devices() {
        let json = r#"{"_id": 3, "originationTime": 10}"#;
        let rec: Record = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, RecordId::Number(3));
        assert_eq!(rec.devices, Devices::default());
        assert_eq!(RecordColumn::Phone.export_value(&rec), "");
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!(RecordColumn::from_str("_id").unwrap(), RecordColumn::Id);
        assert_eq!(
            RecordColumn::from_str("originationtime").unwrap(),
            RecordColumn::OriginationTime
        );
        assert_eq!(RecordColumn::from_str("user").unwrap(), RecordColumn::UserId);
        assert!(RecordColumn::from_str("nope").is_err());
    }

    #[test]
    fn test_sort_by_nested_phone() {
        let rows = vec![
            record(1, 100, "u", "555-3"),
            record(2, 200, "u", "555-1"),
            record(3, 300, "u", "555-2"),
        ];
        let sorted = sort_rows(&rows, &SortState::new(RecordColumn::Phone));
        let ids: Vec<String> = sorted.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_string_ids_sort_numerically() {
        let mut rows = vec![
            record(0, 1, "u", "p"),
            record(0, 2, "u", "p"),
            record(0, 3, "u", "p"),
        ];
        rows[0].id = RecordId::Text("10".into());
        rows[1].id = RecordId::Text("9".into());
        rows[2].id = RecordId::Text("100".into());

        let sorted = sort_rows(&rows, &SortState::new(RecordColumn::Id));
        let ids: Vec<String> = sorted.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_flipped_sort_is_exact_reverse() {
        let rows: Vec<Record> = [(5, 50), (1, 10), (4, 40), (2, 20), (3, 30)]
            .iter()
            .map(|(id, t)| record(*id, *t, "u", "p"))
            .collect();

        for column in [RecordColumn::Id, RecordColumn::OriginationTime] {
            let asc = sort_rows(&rows, &SortState::new(column));
            let mut desc =
                sort_rows(&rows, &SortState::with_direction(column, SortDirection::Descending));
            desc.reverse();
            assert_eq!(asc, desc);
        }
    }

    #[test]
    fn test_user_id_uses_locale_order() {
        let rows = vec![
            record(1, 1, "bob", "p"),
            record(2, 2, "Alice", "p"),
            record(3, 3, "carol", "p"),
        ];
        let sorted = sort_rows(&rows, &SortState::new(RecordColumn::UserId));
        let users: Vec<&str> = sorted.iter().map(|r| r.user_id.as_deref().unwrap()).collect();
        assert_eq!(users, vec!["Alice", "bob", "carol"]);
    }

    #[test]
    fn test_csv_uses_raw_values() {
        let mut table = TableView::new(RecordColumn::OriginationTime);
        table.replace_rows(vec![record(2, 200, "u,2", "p"), record(1, 100, "u1", "p")]);
        assert_eq!(
            table.to_csv(),
            "_id,originationTime,clusterId,userId,phone,voicemail\n\
             1,100,c1,u1,p,\n\
             2,200,c1,\"u,2\",p,\n"
        );
    }

    fn mixed_rows(count: i64) -> Vec<Record> {
        (0..count)
            .map(|i| {
                let mut rec = record(i, i, &format!("user-{}", (i * 37) % 17), "p");
                if i % 3 == 0 {
                    rec.user_id = None;
                }
                if i % 5 == 0 {
                    rec.id = RecordId::Text(format!("legacy-{}", i));
                }
                rec
            })
            .collect()
    }

    #[test]
    fn test_missing_user_ids_sort_last_in_both_directions() {
        let rows = mixed_rows(60);
        let blank_ids: Vec<String> = rows
            .iter()
            .filter(|r| r.user_id.is_none())
            .map(|r| r.id.to_string())
            .collect();

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let sorted = sort_rows(&rows, &SortState::with_direction(RecordColumn::UserId, direction));
            assert_eq!(sorted.len(), rows.len());

            let (present, blank) = sorted.split_at(rows.len() - blank_ids.len());
            assert!(present.iter().all(|r| r.user_id.is_some()));
            let tail: Vec<String> = blank.iter().map(|r| r.id.to_string()).collect();
            assert_eq!(tail, blank_ids, "blanks keep fetch order");

            for pair in present.windows(2) {
                let ordering = direction.apply(crate::table::locale_cmp(
                    pair[0].user_id.as_deref().unwrap(),
                    pair[1].user_id.as_deref().unwrap(),
                ));
                assert_ne!(ordering, std::cmp::Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_non_numeric_ids_sort_last() {
        let rows = mixed_rows(80);
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let sorted = sort_rows(&rows, &SortState::with_direction(RecordColumn::Id, direction));
            let numeric: Vec<i64> = sorted
                .iter()
                .take_while(|r| matches!(r.id, RecordId::Number(_)))
                .map(|r| r.origination_time)
                .collect();
            assert_eq!(numeric.len(), 64);
            assert!(sorted[64..].iter().all(|r| matches!(r.id, RecordId::Text(_))));

            let mut expected = numeric.clone();
            expected.sort_unstable();
            if direction == SortDirection::Descending {
                expected.reverse();
            }
            assert_eq!(numeric, expected);
        }
    }
}
