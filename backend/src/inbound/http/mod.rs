//! HTTP inbound adapter exposing the build endpoint and health checks.

pub mod builds;
pub mod cache_control;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
