//! Shared utilities for selector integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rtt_selector::{
    Connection, Outbound, Protocol, Result, Server, ServerDescriptor, SelectorError, Target,
};

/// Start a mock probe endpoint answering every connection with the
/// given status line, after an optional delay. Returns its address.
pub async fn start_probe_backend(status_line: &'static str, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 256];
                        let _ = socket.read(&mut buf).await;
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let response = format!(
                            "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                            status_line
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Outbound routing every target through a fixed upstream address,
/// counting connection attempts.
pub struct UpstreamOutbound {
    name: String,
    upstream: Option<SocketAddr>,
    connects: Arc<AtomicU32>,
}

impl UpstreamOutbound {
    /// Server whose probes land on `upstream`.
    pub fn server(name: &str, upstream: SocketAddr) -> (Arc<Server>, Arc<AtomicU32>) {
        Self::build(name, Some(upstream))
    }

    /// Server that resolves but refuses every connection.
    pub fn unreachable(name: &str) -> (Arc<Server>, Arc<AtomicU32>) {
        Self::build(name, Some("127.0.0.1:1".parse().unwrap()))
    }

    /// Server that cannot be resolved to a descriptor at all.
    pub fn unresolvable(name: &str) -> (Arc<Server>, Arc<AtomicU32>) {
        Self::build(name, None)
    }

    fn build(name: &str, upstream: Option<SocketAddr>) -> (Arc<Server>, Arc<AtomicU32>) {
        let connects = Arc::new(AtomicU32::new(0));
        let outbound = Self {
            name: name.to_string(),
            upstream,
            connects: connects.clone(),
        };
        (Arc::new(Server::new(name, Box::new(outbound))), connects)
    }
}

#[async_trait]
impl Outbound for UpstreamOutbound {
    fn descriptor(&self) -> Result<ServerDescriptor> {
        let upstream = self.upstream.ok_or_else(|| {
            SelectorError::Resolution(format!("server {} has no upstream", self.name))
        })?;
        Ok(ServerDescriptor {
            name: self.name.clone(),
            protocol: Protocol::Tcp,
            host: upstream.ip().to_string(),
            port: upstream.port(),
        })
    }

    async fn connect(&self, _target: &Target) -> Result<Box<dyn Connection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let Some(upstream) = self.upstream else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "upstream unreachable",
            )
            .into());
        };
        let stream = TcpStream::connect(upstream).await?;
        Ok(Box::new(stream))
    }
}

/// Install a logging subscriber for test diagnostics; later calls are
/// no-ops.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `cond` until it holds or a generous timeout elapses.
pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}
