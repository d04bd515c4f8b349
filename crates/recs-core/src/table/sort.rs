//! Sort state and the non-destructive sort over a row slice.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::column::{CellValue, Column};

/// Direction of the active sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[strum(serialize = "asc")]
    Ascending,
    #[strum(serialize = "desc")]
    Descending,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The active column and direction of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: Copy + Eq> SortState<C> {
    /// Sorts ascending by `column`.
    pub fn new(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn with_direction(column: C, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Handles a click on a column header.
    ///
    /// The active column flips direction; any other column becomes active
    /// ascending.
    pub fn request(&mut self, column: C) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Returns the rows ordered by `sort`, leaving `rows` untouched.
///
/// Blank cells stay at the end in both directions.
pub fn sort_rows<'a, T, C: Column<T>>(rows: &'a [T], sort: &SortState<C>) -> Vec<&'a T> {
    let mut keyed: Vec<(CellValue, &T)> = rows
        .iter()
        .map(|row| (sort.column.sort_value(row), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a.is_blank(), b.is_blank()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => sort.direction.apply(a.compare(b)),
    });
    keyed.into_iter().map(|(_, row)| row).collect()
}
