//! A sortable, paginated, exportable table over an in-memory result set.

use std::num::NonZeroUsize;

use super::column::Column;
use super::csv::render_csv;
use super::sort::{SortState, sort_rows};

/// Page sizes offered by the pagination controls.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Rows per page when a table is created.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Returns the `[page * size, page * size + size)` window of `items`,
/// clamped to its length.
pub fn paginate<X>(items: &[X], page: usize, size: usize) -> &[X] {
    let start = page.saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Sort, pagination and export over the rows of one result set.
///
/// Nothing here touches the network: the table only ever reorders and
/// slices the rows it was last given.
#[derive(Debug, Clone)]
pub struct TableView<T, C> {
    rows: Vec<T>,
    sort: SortState<C>,
    page: usize,
    page_size: NonZeroUsize,
}

impl<T, C: Column<T>> TableView<T, C> {
    /// Creates an empty table sorted ascending by `default_sort`.
    pub fn new(default_sort: C) -> Self {
        Self {
            rows: Vec::new(),
            sort: SortState::new(default_sort),
            page: 0,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }

    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Installs a new result set and goes back to the first page.
    pub fn replace_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.page = 0;
    }

    pub fn clear(&mut self) {
        self.replace_rows(Vec::new());
    }

    /// Rows in fetch order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Size of the full result set, independent of the current page.
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    pub fn sort_state(&self) -> SortState<C> {
        self.sort
    }

    /// Header click: flip the active column or switch to a new one.
    pub fn request_sort(&mut self, column: C) {
        self.sort.request(column);
    }

    pub fn set_sort(&mut self, sort: SortState<C>) {
        self.sort = sort;
    }

    /// The full result set in current sort order.
    pub fn sorted(&self) -> Vec<&T> {
        sort_rows(&self.rows, &self.sort)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Number of pages needed for the full set; zero for an empty table.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size.get())
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Moves forward one page; returns false on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one page; returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Changes rows per page and returns to the first page.
    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.page = 0;
    }

    /// Rows on the current page, in sort order.
    pub fn visible(&self) -> Vec<&T> {
        let sorted = self.sorted();
        paginate(&sorted, self.page, self.page_size.get()).to_vec()
    }

    /// CSV of every row in current sort order, regardless of pagination.
    pub fn to_csv(&self) -> String {
        render_csv::<T, C>(&self.sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::column::CellValue;
    use crate::table::sort::SortDirection;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        n: i64,
        name: &'static str,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RowColumn {
        N,
        Name,
    }

    impl Column<Row> for RowColumn {
        fn all() -> &'static [Self] {
            &[RowColumn::N, RowColumn::Name]
        }

        fn key(&self) -> &'static str {
            match self {
                RowColumn::N => "n",
                RowColumn::Name => "name",
            }
        }

        fn label(&self) -> &'static str {
            self.key()
        }

        fn sort_value(&self, row: &Row) -> CellValue {
            match self {
                RowColumn::N => CellValue::Number(row.n as f64),
                RowColumn::Name => CellValue::Text(row.name.to_string()),
            }
        }

        fn display_value(&self, row: &Row) -> String {
            self.export_value(row)
        }

        fn export_value(&self, row: &Row) -> String {
            match self {
                RowColumn::N => row.n.to_string(),
                RowColumn::Name => row.name.to_string(),
            }
        }
    }

    fn rows(count: i64) -> Vec<Row> {
        // Fetch order deliberately differs from numeric order.
        (1..=count)
            .rev()
            .map(|n| Row { n, name: "row" })
            .collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_paginate_clamps() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(paginate(&items, 0, 2), &[1, 2]);
        assert_eq!(paginate(&items, 2, 2), &[5]);
        assert!(paginate(&items, 3, 2).is_empty());
        assert!(paginate(&items, usize::MAX, 2).is_empty());
    }

    #[test]
    fn test_twenty_five_rows_three_pages() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(25));

        assert_eq!(table.page_count(), 3);
        let first: Vec<i64> = table.visible().iter().map(|r| r.n).collect();
        assert_eq!(first, (1..=10).collect::<Vec<_>>());

        table.set_page(2);
        let last: Vec<i64> = table.visible().iter().map(|r| r.n).collect();
        assert_eq!(last, (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_pages_concatenate_to_sorted_set() {
        for total in [0_i64, 1, 9, 10, 11, 37] {
            for page_size in [1_usize, 3, 10, 25] {
                let mut table = TableView::new(RowColumn::N).with_page_size(size(page_size));
                table.replace_rows(rows(total));

                let mut concatenated = Vec::new();
                for page in 0..table.page_count() {
                    table.set_page(page);
                    concatenated.extend(table.visible().into_iter().cloned());
                }

                let sorted: Vec<Row> = table.sorted().into_iter().cloned().collect();
                assert_eq!(concatenated, sorted);
            }
        }
    }

    #[test]
    fn test_flipping_direction_reverses_order() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(12));

        let ascending: Vec<i64> = table.sorted().iter().map(|r| r.n).collect();
        table.request_sort(RowColumn::N);
        assert_eq!(table.sort_state().direction, SortDirection::Descending);
        let mut descending: Vec<i64> = table.sorted().iter().map(|r| r.n).collect();
        descending.reverse();

        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_sorting_does_not_mutate_rows() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(3));
        let _ = table.sorted();
        let fetch_order: Vec<i64> = table.rows().iter().map(|r| r.n).collect();
        assert_eq!(fetch_order, vec![3, 2, 1]);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(30));
        table.set_page(2);
        table.set_page_size(size(25));
        assert_eq!(table.page(), 0);
        assert_eq!(table.page_size(), 25);
    }

    #[test]
    fn test_new_result_set_resets_page() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(30));
        assert!(table.next_page());
        table.replace_rows(rows(5));
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_next_and_prev_are_bounded() {
        let mut table = TableView::new(RowColumn::N);
        table.replace_rows(rows(15));
        assert!(!table.prev_page());
        assert!(table.next_page());
        assert!(!table.next_page());
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn test_csv_ignores_pagination() {
        let mut table = TableView::new(RowColumn::N).with_page_size(size(10));
        table.replace_rows(rows(25));
        let full = table.to_csv();

        table.set_page(2);
        assert_eq!(table.to_csv(), full);
        table.set_page_size(size(100));
        assert_eq!(table.to_csv(), full);

        let lines: Vec<&str> = full.lines().collect();
        assert_eq!(lines.len(), 26);
        assert_eq!(lines[0], "n,name");
        assert_eq!(lines[1], "1,row");
        assert_eq!(lines[25], "25,row");
    }

    #[test]
    fn test_empty_table() {
        let table: TableView<Row, RowColumn> = TableView::new(RowColumn::Name);
        assert!(table.is_empty());
        assert_eq!(table.page_count(), 0);
        assert!(table.visible().is_empty());
        assert_eq!(table.to_csv(), "n,name\n");
    }
}
