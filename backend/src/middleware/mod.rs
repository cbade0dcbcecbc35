//! Request middleware: trace correlation and cross-origin access.

pub mod cors;
pub mod trace;

pub use cors::cors;
pub use trace::Trace;
