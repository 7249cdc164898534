//! TCP and TLS transport for the MCS connection.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use rustls::pki_types::ServerName;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::Error;

/// Unified stream type for plain and TLS connections. The production
/// dialer always speaks TLS; plain TCP exists for in-process tests.
pub(crate) enum IoStream {
    Plain(TcpStream),
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl AsyncRead for IoStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            IoStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            IoStream::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for IoStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        match self.get_mut() {
            IoStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            IoStream::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            IoStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            IoStream::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            IoStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            IoStream::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Build the default MCS TLS configuration: web PKI trust anchors,
/// TLS 1.3 as the floor.
pub(crate) fn default_tls_config() -> Arc<rustls::ClientConfig> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let roots = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder_with_protocol_versions(&[&rustls::version::TLS13])
        .with_root_certificates(roots)
        .with_no_client_auth();
    Arc::new(config)
}

/// Dial `addr` (`host:port`) and run the TLS handshake, with SNI taken
/// from the host part. The timeout covers connect and handshake together.
pub(crate) async fn connect_tls(
    addr: &str,
    tls: Arc<rustls::ClientConfig>,
    dial_timeout: Duration,
    keep_alive: Duration,
) -> Result<IoStream, Error> {
    let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| Error::ServerAddress(addr.to_string()))?;

    let addr_owned = addr.to_string();
    let stream = tokio::time::timeout(dial_timeout, async move {
        let tcp = TcpStream::connect(&addr_owned).await?;
        set_keep_alive(&tcp, keep_alive)?;
        tcp.set_nodelay(true)?;
        TlsConnector::from(tls).connect(server_name, tcp).await
    })
    .await
    .map_err(|_| Error::DialTimeout(dial_timeout))??;

    debug!(addr, "TLS connection established");
    Ok(IoStream::Tls(Box::new(stream)))
}

fn set_keep_alive(stream: &TcpStream, interval: Duration) -> std::io::Result<()> {
    if interval.is_zero() {
        return Ok(());
    }
    let keepalive = TcpKeepalive::new().with_time(interval);
    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}
