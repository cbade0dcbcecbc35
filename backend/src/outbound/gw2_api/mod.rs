//! Game-data API outbound adapters.
//!
//! This module provides the reqwest implementation of the `GameDataSource`
//! port.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_API_BASE_URL, Gw2HttpSource};
