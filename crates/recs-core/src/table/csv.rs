//! CSV rendering for table exports.

use chrono::{DateTime, SecondsFormat, Utc};

use super::column::Column;

/// Renders a header row plus one line per row, in the given order.
pub fn render_csv<T, C: Column<T>>(rows: &[&T]) -> String {
    let columns = C::all();
    let header: Vec<&str> = columns.iter().map(|c| c.key()).collect();
    let mut output = header.join(",") + "\n";

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|column| escape_csv_value(&column.export_value(row)))
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Quotes a value when it contains a delimiter, a quote or a line break.
pub fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `<prefix>_<ISO timestamp>.csv`, stamped with the export time.
///
/// Colons in the time part become `-` so the name is valid on every
/// filesystem.
pub fn export_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.csv",
        prefix,
        at.to_rfc3339_opts(SecondsFormat::Millis, true).replace(':', "-")
    )
}
