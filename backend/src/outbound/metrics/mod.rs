//! Prometheus exporters for build events.
//!
//! Only compiled with the `metrics` feature.

mod prometheus_build_events;

pub use prometheus_build_events::PrometheusBuildEvents;
