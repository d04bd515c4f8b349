//! Domain layer of the records console.
//!
//! Holds the wire models (records, audit entries), the search criteria,
//! the generic [`table::TableView`] used by both result screens, and the
//! traits the outer layers implement ([`api::ConsoleApi`],
//! [`session::TokenStore`]).

pub mod api;
pub mod audit;
pub mod error;
pub mod record;
pub mod search;
pub mod session;
pub mod table;

pub use error::{RecsError, Result};
