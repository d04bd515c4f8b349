//! Backend access for the records console.

pub mod http_api;

pub use http_api::HttpConsoleApi;
