//! Direct (non-proxied) outbound.
//!
//! # Responsibilities
//! - Provide the identity transport: dial the target itself
//! - Resolve to a descriptor reflecting the configured address

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::error::{Result, SelectorError};
use crate::server::{Connection, Outbound, Protocol, ServerDescriptor, Target};

/// Outbound that dials targets directly, with no upstream in between.
#[derive(Debug, Clone)]
pub struct DirectOutbound {
    name: String,
    host: String,
    port: u16,
}

impl DirectOutbound {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Outbound for DirectOutbound {
    fn descriptor(&self) -> Result<ServerDescriptor> {
        if self.host.is_empty() {
            return Err(SelectorError::Resolution(format!(
                "server {} has no host configured",
                self.name
            )));
        }
        Ok(ServerDescriptor {
            name: self.name.clone(),
            protocol: Protocol::Tcp,
            host: self.host.clone(),
            port: self.port,
        })
    }

    async fn connect(&self, target: &Target) -> Result<Box<dyn Connection>> {
        let stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
        Ok(Box::new(stream))
    }
}
