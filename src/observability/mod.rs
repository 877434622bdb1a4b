//! Observability helpers.
//!
//! # Design Decisions
//! - The crate logs through the `tracing` facade and records metrics
//!   through the `metrics` facade; installing subscribers, exporters
//!   and endpoints is the embedding binary's concern

pub mod metrics;
