//! Record search criteria and the query they produce.

mod criteria;

pub use criteria::{FilterField, SearchCriteria, parse_datetime};
