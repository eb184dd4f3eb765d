use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::request::PreparedRequest;
use crate::http::response::HttpResponse;
use crate::http::transport::{Sending, Transport};
use crate::socket::connectjob::ConnectJob;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::spawn;
use url::{Position, Url};

/// Wraps an HTTP/1.1 connection.
/// Equivalent to net::HttpStream.
pub struct HttpStream {
    sender: http1::SendRequest<Full<Bytes>>,
}

impl HttpStream {
    pub async fn send_request(
        &mut self,
        req: http::Request<Full<Bytes>>,
    ) -> Result<http::Response<hyper::body::Incoming>, NetError> {
        self.sender
            .send_request(req)
            .await
            .map_err(|e| map_hyper_error(&e))
    }
}

/// Opens a fresh connection per exchange and speaks HTTP/1.1 over it.
#[derive(Debug, Clone, Default)]
pub struct HttpStreamFactory {
    connect_job: ConnectJob,
}

impl HttpStreamFactory {
    pub fn new(connect_job: ConnectJob) -> Self {
        Self { connect_job }
    }

    pub async fn request_stream(&self, url: &Url) -> Result<HttpStream, NetError> {
        let socket = self.connect_job.connect(url).await?;
        let io = TokioIo::new(socket);

        let (sender, conn) = http1::handshake(io).await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "HTTP/1.1 handshake failed");
            NetError::ConnectionFailed
        })?;

        // Drives the connection until the sender is dropped.
        spawn(async move {
            if let Err(e) = conn.await {
                tracing::trace!(error = %e, "connection task ended with error");
            }
        });

        Ok(HttpStream { sender })
    }

    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, NetError> {
        let hyper_request = build_hyper_request(&request)?;
        let mut stream = self.request_stream(&request.url).await?;

        let response = stream.send_request(hyper_request).await?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| {
                tracing::debug!(url = %request.url, error = %e, "failed reading body");
                NetError::HttpBodyError
            })?
            .to_bytes();

        Ok(HttpResponse::new(
            parts.status,
            OrderedHeaderMap::from(parts.headers),
            body,
            request.url,
        ))
    }
}

impl Transport for HttpStreamFactory {
    fn send(&self, request: PreparedRequest) -> Sending {
        let this = self.clone();
        Box::pin(async move { this.execute(request).await })
    }
}

/// Origin-form request with a `Host` header, as HTTP/1.1 expects.
fn build_hyper_request(request: &PreparedRequest) -> Result<http::Request<Full<Bytes>>, NetError> {
    let url = &request.url;
    let target = &url[Position::BeforePath..Position::AfterQuery];
    let target = if target.is_empty() { "/" } else { target };

    let mut builder = http::Request::builder()
        .method(request.method.clone())
        .uri(target);

    if !request.headers.contains("host") {
        builder = builder.header(http::header::HOST, &url[Position::BeforeHost..Position::AfterPort]);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }

    builder
        .body(request.body.to_full())
        .map_err(|_| NetError::InvalidHeader)
}

fn map_hyper_error(e: &hyper::Error) -> NetError {
    let mapped = if e.is_incomplete_message() {
        NetError::EmptyResponse
    } else if e.is_parse() || e.is_parse_status() {
        NetError::InvalidResponse
    } else if e.is_timeout() {
        NetError::ConnectionTimedOut
    } else if e.is_canceled() || e.is_closed() {
        NetError::ConnectionClosed
    } else {
        NetError::ConnectionReset
    };
    tracing::debug!(error = %e, code = mapped.as_i32(), "request failed");
    mapped
}
