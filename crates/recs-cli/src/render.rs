//! Text rendering of tables and form state.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use recs_core::search::{FilterField, SearchCriteria};
use recs_core::table::{Column, SortDirection, TableView};
use recs_execution::DiagnosticEvent;

const MAX_COLUMN_WIDTH: usize = 32;

/// Draws [`TableView`] pages as box tables.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    color: bool,
}

impl TableRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn truncate_value(value: &str, max_width: usize) -> String {
        if value.chars().count() <= max_width {
            value.to_string()
        } else if max_width <= 3 {
            value.chars().take(max_width).collect()
        } else {
            format!("{}...", value.chars().take(max_width - 3).collect::<String>())
        }
    }

    fn header_label<T, C: Column<T>>(column: C, table: &TableView<T, C>) -> String {
        let sort = table.sort_state();
        if sort.column != column {
            return column.label().to_string();
        }
        let arrow = match sort.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        };
        format!("{} {}", column.label(), arrow)
    }

    /// The current page plus a position footer.
    pub fn render<T, C: Column<T>>(&self, table: &TableView<T, C>) -> String {
        let columns = C::all();
        let headers: Vec<String> = columns.iter().map(|c| Self::header_label(*c, table)).collect();
        let rows: Vec<Vec<String>> = table
            .visible()
            .into_iter()
            .map(|row| columns.iter().map(|c| c.display_value(row)).collect())
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();

        let mut output = String::new();
        output.push_str(&Self::border(&widths, '┌', '┬', '┐'));

        output.push('│');
        for (header, width) in headers.iter().zip(&widths) {
            let cell = format!(" {:width$} ", Self::truncate_value(header, *width), width = width);
            if self.color {
                output.push_str(&cell.bold().to_string());
            } else {
                output.push_str(&cell);
            }
            output.push('│');
        }
        output.push('\n');
        output.push_str(&Self::border(&widths, '├', '┼', '┤'));

        for row in &rows {
            output.push('│');
            for (value, width) in row.iter().zip(&widths) {
                output.push_str(&format!(" {:width$} ", Self::truncate_value(value, *width), width = width));
                output.push('│');
            }
            output.push('\n');
        }
        output.push_str(&Self::border(&widths, '└', '┴', '┘'));
        output.push_str(&self.footer(table));
        output
    }

    fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, segments.join(&middle.to_string()), right)
    }

    fn footer<T, C: Column<T>>(&self, table: &TableView<T, C>) -> String {
        let total = table.total_count();
        let text = if total == 0 {
            "(0 rows)".to_string()
        } else {
            let first = table.page() * table.page_size() + 1;
            let last = (first + table.page_size() - 1).min(total);
            format!(
                "Rows {}-{} of {}, page {} of {} ({} per page)",
                first,
                last,
                total,
                table.page() + 1,
                table.page_count(),
                table.page_size()
            )
        };
        if self.color {
            format!("{}\n", text.bright_black())
        } else {
            format!("{}\n", text)
        }
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// The search form, one field per line.
pub fn render_criteria(criteria: &SearchCriteria) -> String {
    let mut lines = vec![
        format!("{:<10} {}", "start", local_time(criteria.start)),
        format!("{:<10} {}", "end", local_time(criteria.end)),
    ];
    for field in [
        FilterField::Phone,
        FilterField::Voicemail,
        FilterField::UserId,
        FilterField::Cluster,
    ] {
        let value = criteria.filter(field);
        let shown = if value.is_empty() { "-" } else { value };
        lines.push(format!("{:<10} {}", field.param(), shown));
    }
    lines.join("\n")
}

/// One line per captured event, oldest first.
pub fn render_diagnostics(events: &[DiagnosticEvent]) -> String {
    if events.is_empty() {
        return "No warnings captured.".to_string();
    }
    events
        .iter()
        .map(|event| {
            let fields = event
                .fields
                .iter()
                .map(|(key, value)| match value.as_str() {
                    Some(text) => format!("{}={}", key, text),
                    None => format!("{}={}", key, value),
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{} {:5} {}: {} {}",
                event.timestamp.to_rfc3339(),
                event.level,
                event.target,
                event.message,
                fields
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
