//! Sorting and paging commands applied to whichever table is on screen.

use recs_core::table::{Column, TableView};
use std::num::NonZeroUsize;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOp {
    Sort(String),
    Page(usize),
    Next,
    Prev,
    Rows(NonZeroUsize),
}

/// Resolves a column key typed by the user.
pub fn parse_column<T, C>(key: &str) -> Result<C, String>
where
    C: Column<T> + FromStr,
{
    C::from_str(key.trim()).map_err(|_| {
        let keys: Vec<&str> = C::all().iter().map(|c| c.key()).collect();
        format!("Unknown column '{}'. Columns: {}", key.trim(), keys.join(", "))
    })
}

/// Moves to a zero-based page. The first page always exists, even for an
/// empty table.
pub fn go_to_page<T, C: Column<T>>(table: &mut TableView<T, C>, page: usize) -> Result<(), String> {
    if page > 0 && page >= table.page_count() {
        return Err(format!(
            "Page {} does not exist; there {} {}",
            page + 1,
            if table.page_count() == 1 { "is" } else { "are" },
            pages(table.page_count())
        ));
    }
    table.set_page(page);
    Ok(())
}

fn pages(count: usize) -> String {
    if count == 1 {
        "1 page".to_string()
    } else {
        format!("{} pages", count)
    }
}

/// Applies `op`; the error is a message for the user and leaves the table
/// unchanged.
pub fn apply<T, C>(table: &mut TableView<T, C>, op: &TableOp) -> Result<(), String>
where
    C: Column<T> + FromStr,
{
    match op {
        TableOp::Sort(key) => {
            let column = parse_column::<T, C>(key)?;
            table.request_sort(column);
            Ok(())
        }
        TableOp::Page(page) => go_to_page(table, *page),
        TableOp::Next => {
            if table.next_page() {
                Ok(())
            } else {
                Err("Already on the last page".to_string())
            }
        }
        TableOp::Prev => {
            if table.prev_page() {
                Ok(())
            } else {
                Err("Already on the first page".to_string())
            }
        }
        TableOp::Rows(size) => {
            table.set_page_size(*size);
            Ok(())
        }
    }
}
