//! Twemproxy stats socket client.
//!
//! Nutcracker serves its stats document on a dedicated TCP port (22222 by
//! default). A client connects, the proxy writes one JSON document and
//! closes the connection. Nothing is sent by the client.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::port::outbound::source::StatsSource;

/// Default nutcracker stats port.
pub const DEFAULT_PORT: u16 = 22222;

/// Initial read buffer capacity; a few pools with a handful of servers fit.
const READ_CAPACITY: usize = 8 * 1024;

/// Stats source reading from a twemproxy stats port.
#[derive(Debug, Clone)]
pub struct TwemproxySource {
    address: String,
    timeout_secs: u64,
}

impl TwemproxySource {
    /// Create a source for `host:port` with a per-step timeout.
    #[must_use]
    pub fn new(host: &str, port: u16, timeout_secs: u64) -> Self {
        Self {
            address: format!("{host}:{port}"),
            timeout_secs,
        }
    }

    /// The `host:port` this source connects to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    fn limit(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[async_trait]
impl StatsSource for TwemproxySource {
    fn describe(&self) -> String {
        format!("twemproxy://{}", self.address)
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        trace!(address = %self.address, "Connecting to stats port");

        let mut stream = timeout(self.limit(), TcpStream::connect(&self.address))
            .await
            .map_err(|_| Error::Timeout {
                operation: "connect to stats port",
                secs: self.timeout_secs,
            })?
            .map_err(|e| Error::Connection(format!("{}: {e}", self.address)))?;

        let mut payload = Vec::with_capacity(READ_CAPACITY);
        timeout(self.limit(), stream.read_to_end(&mut payload))
            .await
            .map_err(|_| Error::Timeout {
                operation: "read stats payload",
                secs: self.timeout_secs,
            })??;

        if payload.is_empty() {
            return Err(Error::Connection(format!(
                "{}: connection closed without a stats payload",
                self.address
            )));
        }

        debug!(address = %self.address, bytes = payload.len(), "Stats payload received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::Snapshot;
    use crate::testkit::snapshot::stats_json;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn serve_once(body: Vec<u8>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn reads_whole_document_until_close() {
        let port = serve_once(stats_json().into_bytes()).await;
        let source = TwemproxySource::new("127.0.0.1", port, 2);

        let payload = source.fetch().await.unwrap();
        let snapshot = Snapshot::from_slice(&payload).unwrap();

        assert_eq!(snapshot.pool_count(), 2);
        assert_eq!(snapshot.label("service"), Some("nutcracker"));
    }

    #[tokio::test]
    async fn empty_payload_is_an_error() {
        let port = serve_once(Vec::new()).await;
        let source = TwemproxySource::new("127.0.0.1", port, 2);

        let result = source.fetch().await;

        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn stalled_peer_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let source = TwemproxySource::new("127.0.0.1", port, 1);

        let result = source.fetch().await;

        assert!(matches!(
            result,
            Err(Error::Timeout {
                operation: "read stats payload",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let source = TwemproxySource::new("127.0.0.1", port, 2);

        let result = source.fetch().await;

        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[test]
    fn describe_includes_address() {
        let source = TwemproxySource::new("cache-01", DEFAULT_PORT, 5);
        assert_eq!(source.describe(), "twemproxy://cache-01:22222");
        assert_eq!(source.address(), "cache-01:22222");
    }
}
