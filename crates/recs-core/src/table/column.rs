//! Column accessors and the comparison rules shared by every table.

use std::cmp::Ordering;
use std::fmt;

/// A cell value as seen by the comparator.
///
/// Numeric columns coerce their raw value up front, so a `Number` may hold
/// `NaN` when coercion failed. `NaN` and `Missing` are both blank: they tie
/// with each other and rank after every real value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// Wraps an optional text field.
    pub fn text(value: Option<&str>) -> Self {
        match value {
            Some(s) => Self::Text(s.to_string()),
            None => Self::Missing,
        }
    }

    /// Coerces a string to a number.
    ///
    /// Blank input becomes `0`, anything unparsable becomes `NaN`.
    pub fn coerce_number(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Number(0.0);
        }
        Self::Number(trimmed.parse::<f64>().unwrap_or(f64::NAN))
    }

    /// `Missing`, or a number that failed coercion.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(_) => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            _ if self.is_blank() => 2,
            Self::Number(_) => 0,
            _ => 1,
        }
    }

    /// Compares two cells using the console's ordering rules.
    ///
    /// This is a total order: numbers before text, blanks last.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            _ if self.rank() != other.rank() => self.rank().cmp(&other.rank()),
            (Self::Text(a), Self::Text(b)) => locale_cmp(a, b),
            (Self::Number(a), Self::Number(b)) if !self.is_blank() => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Locale-aware string ordering.
///
/// Letters compare case-insensitively first; on a case-only difference the
/// lowercase form sorts first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }

    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.cmp(&y),
        })
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Describes one column of a sortable table over rows of type `T`.
///
/// A table is fully defined by its column set: which keys exist, how each
/// one reads a row for sorting, how it renders on screen and what it writes
/// to CSV.
pub trait Column<T>: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// All columns in display order.
    fn all() -> &'static [Self];

    /// Wire key, also used as the CSV header.
    fn key(&self) -> &'static str;

    /// Human readable header.
    fn label(&self) -> &'static str;

    /// Value used for ordering.
    fn sort_value(&self, row: &T) -> CellValue;

    /// Value rendered in the on-screen table.
    fn display_value(&self, row: &T) -> String;

    /// Raw value written to CSV.
    fn export_value(&self, row: &T) -> String;
}
