use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::stream::SocketType;
use crate::socket::tls::TlsConfig;
use tokio::net::TcpStream;
use url::Url;

/// Opens a connection for a URL: DNS -> TCP -> TLS.
/// Roughly equivalent to net::ConnectJob.
#[derive(Debug, Clone, Default)]
pub struct ConnectJob {
    tls: TlsConfig,
}

impl ConnectJob {
    pub fn new(tls: TlsConfig) -> Self {
        Self { tls }
    }

    pub async fn connect(&self, url: &Url) -> Result<SocketType, NetError> {
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // IPv6 literals come back bracketed from `host_str`.
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<_> = tokio::net::lookup_host((bare_host, port))
            .await
            .dns_context(bare_host)?
            .collect();
        if addrs.is_empty() {
            return Err(NetError::NameNotResolved);
        }

        // Try each resolved address in order and keep the last failure.
        let mut last_error = NetError::ConnectionFailed;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await.connection_context(host, port) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_error = e,
            }
        }
        let stream = stream.ok_or(last_error)?;
        // Best effort; failure only costs latency.
        let _ = stream.set_nodelay(true);

        if url.scheme() != "https" {
            return Ok(SocketType::Tcp(stream));
        }

        let connector = self.tls.connector()?;
        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        if !TlsConfig::should_set_sni(host) {
            config.set_use_server_name_indication(false);
        }

        let tls_stream = tokio_boring::connect(config, bare_host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host = %host, error = ?e, "TLS handshake failed");
                NetError::SslProtocolError
            })?;

        Ok(SocketType::Ssl(tls_stream))
    }
}
