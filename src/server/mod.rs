//! Server model and candidate contract.
//!
//! # Responsibilities
//! - Represent a single candidate server (name + last observed RTT)
//! - Define the outbound capability a candidate must supply
//!   (resolution + transport dialing)
//! - Group candidates into ordered, non-empty server groups
//!
//! # Design Decisions
//! - RTT is stored as atomic nanoseconds on the shared `Server`;
//!   zero means "not measured" and is what failed probes record
//! - Groups are immutable snapshots; replacing a group swaps the
//!   whole snapshot rather than mutating in place

pub mod direct;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Result, SelectorError};
use crate::server::direct::DirectOutbound;

/// Transport protocol of a connection destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Http,
}

/// Descriptor of a connection destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
        }
    }
}

/// A resolved, ready-to-use connection descriptor for a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub name: String,
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

/// Byte stream returned by [`Outbound::connect`].
///
/// Dropping the stream closes the underlying transport.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

/// Outbound capability a candidate server supplies.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Resolve this server to a ready-to-use connection descriptor.
    fn descriptor(&self) -> Result<ServerDescriptor>;

    /// Open a transport connection toward `target` through this server.
    async fn connect(&self, target: &Target) -> Result<Box<dyn Connection>>;
}

/// A single candidate server.
pub struct Server {
    name: String,
    /// Last observed round-trip time in nanoseconds; 0 = not measured.
    rtt_nanos: AtomicU64,
    outbound: Box<dyn Outbound>,
}

impl Server {
    pub fn new(name: impl Into<String>, outbound: Box<dyn Outbound>) -> Self {
        Self {
            name: name.into(),
            rtt_nanos: AtomicU64::new(0),
            outbound,
        }
    }

    /// Server dialing its targets directly, with no upstream in between.
    pub fn direct(name: impl Into<String>, host: impl Into<String>, port: u16) -> Arc<Self> {
        let name = name.into();
        let outbound = DirectOutbound::new(name.clone(), host, port);
        Arc::new(Self::new(name, Box::new(outbound)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last observed round-trip time; zero if never measured or if the
    /// last probe failed.
    pub fn rtt(&self) -> Duration {
        Duration::from_nanos(self.rtt_nanos.load(Ordering::Relaxed))
    }

    pub fn set_rtt(&self, rtt: Duration) {
        self.rtt_nanos.store(rtt.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn clear_rtt(&self) {
        self.rtt_nanos.store(0, Ordering::Relaxed);
    }

    /// Resolve to a connection descriptor. Delegates to the outbound,
    /// which may fail.
    pub fn descriptor(&self) -> Result<ServerDescriptor> {
        self.outbound.descriptor()
    }

    /// Open a transport connection toward `target` through this server.
    pub async fn connect(&self, target: &Target) -> Result<Box<dyn Connection>> {
        self.outbound.connect(target).await
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.name)
            .field("rtt", &self.rtt())
            .finish()
    }
}

/// An ordered, non-empty group of candidate servers.
#[derive(Debug, Clone)]
pub struct ServerGroup {
    name: String,
    servers: Vec<Arc<Server>>,
}

impl ServerGroup {
    /// Create a group. Fails with [`SelectorError::EmptyGroup`] if
    /// `servers` is empty; the selection is seeded from the first element.
    pub fn new(name: impl Into<String>, servers: Vec<Arc<Server>>) -> Result<Self> {
        if servers.is_empty() {
            return Err(SelectorError::EmptyGroup);
        }
        Ok(Self {
            name: name.into(),
            servers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn servers(&self) -> &[Arc<Server>] {
        &self.servers
    }

    /// The group's first server.
    pub fn first(&self) -> Arc<Server> {
        self.servers[0].clone()
    }
}
