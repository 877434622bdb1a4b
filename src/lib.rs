//! Latency-based backend selection.
//!
//! An in-process decision component for a proxy/dispatch system: given
//! a group of candidate servers, it keeps track of which one should
//! currently receive traffic, based on round-trip latency to a
//! well-known probe target.
//!
//! # Data Flow
//! ```text
//! Host dispatcher needs an upstream
//!     → Selector::get() / Selector::current()  (lock-free read)
//!
//! Background, every 10 minutes (and on refresh/reset):
//!     probe round → one concurrent probe per server
//!         → first 204 answer wins → selection swapped
//! ```
//!
//! # Design Decisions
//! - No listener, no proxying, no persistence; the crate only decides
//! - Candidates supply their own transport capability ([`Outbound`]);
//!   the crate ships the direct (non-proxied) one
//! - Winner policy is race-to-first-success, not minimum measured RTT

pub mod error;
pub mod observability;
pub mod selector;
pub mod server;

pub use error::{Result, SelectorError};
pub use selector::rtt::RttSelector;
pub use selector::Selector;
pub use server::direct::DirectOutbound;
pub use server::{Connection, Outbound, Protocol, Server, ServerDescriptor, ServerGroup, Target};
