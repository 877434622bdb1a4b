//! Selection strategies.
//!
//! # Data Flow
//! ```text
//! Dispatcher needs an upstream
//!     → Selector::get() (descriptor of the current selection)
//!     → rtt.rs keeps the selection fresh in the background:
//!         probe every server → first success wins → swap selection
//! ```
//!
//! # Design Decisions
//! - Strategies are trait objects; the dispatcher holds `Arc<dyn Selector>`
//! - Reads of the current selection are lock-free
//! - Only the latency-based strategy lives here; its selection is
//!   automatic, never user-directed

pub mod probe;
pub mod rtt;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::server::{Server, ServerDescriptor, ServerGroup};

/// Contract between the host dispatcher and a selection strategy.
#[async_trait]
pub trait Selector: Send + Sync {
    /// Connection descriptor of the currently selected server.
    ///
    /// Delegates to the server's own resolution, which may fail.
    fn get(&self) -> Result<ServerDescriptor>;

    /// The currently selected server. Pure read.
    fn current(&self) -> Arc<Server>;

    /// Manually select a server by name.
    fn select(&self, name: &str) -> Result<()>;

    /// Run one probe round now and wait for it to finish.
    async fn refresh(&self) -> Result<()>;

    /// Replace the server group and reseed the selection from its
    /// first element.
    fn reset(&self, group: ServerGroup) -> Result<()>;

    /// Stop the background probe scheduler. Single-shot.
    fn destroy(&self);
}
