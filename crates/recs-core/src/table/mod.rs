//! Generic sortable, paginated table.
//!
//! Both console views (records and audit logs) are instances of
//! [`TableView`], parameterized by a [`Column`] set that supplies the
//! accessors and comparison rules for that view.

mod column;
mod csv;
mod sort;
mod view;

pub use column::{CellValue, Column, locale_cmp};
pub use csv::{escape_csv_value, export_file_name, render_csv};
pub use sort::{SortDirection, SortState, sort_rows};
pub use view::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, TableView, paginate};
