//! HTTP endpoint for static assets
//!
//! Requests under the configured mount prefix are handed to
//! [`AssetService::serve`]; the optional metrics path exposes counters in
//! Prometheus format. Only GET and HEAD are accepted.

use crate::body::BodyStream;
use crate::metrics::{format_prometheus_metrics, AssetMetrics};
use crate::service::{AssetResponse, AssetService};
use futures_util::TryStreamExt;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

/// Body of an endpoint response: a streamed asset or a small in-memory payload
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Static asset server
pub struct AssetServer {
    service: Arc<AssetService>,
    addr: SocketAddr,
}

impl AssetServer {
    /// Create a new asset server
    ///
    /// # Example
    /// ```no_run
    /// use static_revalidate::{AssetConfig, AssetServer, AssetService};
    /// use std::sync::Arc;
    ///
    /// let service = Arc::new(AssetService::filesystem(Arc::new(AssetConfig::default())));
    /// let server = AssetServer::new(service, "127.0.0.1:9000".parse().unwrap());
    /// ```
    pub fn new(service: Arc<AssetService>, addr: SocketAddr) -> Self {
        Self { service, addr }
    }

    /// Start the server
    ///
    /// Runs until the process is terminated or the listener fails.
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.addr).await?;
        let config = self.service.config();
        info!("Asset server listening on http://{}", self.addr);
        info!(
            "Serving {} under {} (production: {})",
            config.root_path, config.mount_prefix, config.production
        );
        if let Some(path) = &config.metrics_path {
            info!("Metrics available at http://{}{}", self.addr, path);
        }

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let service = Arc::clone(&self.service);

            tokio::task::spawn(async move {
                let handler = service_fn(move |req| {
                    let service = Arc::clone(&service);
                    async move { handle_request(req, service).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, handler).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle incoming HTTP requests
pub async fn handle_request<B>(
    req: Request<B>,
    service: Arc<AssetService>,
) -> Result<Response<ResponseBody>, hyper::Error> {
    let method = req.method().clone();
    if method != Method::GET && method != Method::HEAD {
        return Ok(method_not_allowed_response());
    }

    let config = service.config();
    let path = req.uri().path();

    if config.metrics_path.as_deref() == Some(path) {
        return Ok(metrics_response(&service));
    }

    let relative = match path.strip_prefix(config.mount_prefix.trim_end_matches('/')) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => return Ok(into_hyper(AssetResponse::not_found(), false, service.metrics())),
    };

    let response = service
        .serve(&config.root_path, &relative, req.headers())
        .await;
    Ok(into_hyper(response, method == Method::HEAD, service.metrics()))
}

/// Convert an asset response into a hyper response
///
/// GET bodies are streamed from the asset reader; HEAD requests keep the
/// headers but drop the body.
fn into_hyper(response: AssetResponse, head: bool, metrics: &AssetMetrics) -> Response<ResponseBody> {
    let AssetResponse {
        status,
        headers,
        body,
    } = response;

    let body = match body {
        Some(body) if !head => {
            if let Some(length) = body.len() {
                metrics.record_bytes_to_client(length);
            }
            stream_body(body)
        }
        _ => full_body(Bytes::new()),
    };

    let mut hyper_response = Response::new(body);
    *hyper_response.status_mut() = status;
    *hyper_response.headers_mut() = headers;
    hyper_response
}

fn stream_body(body: BodyStream) -> ResponseBody {
    StreamBody::new(ReaderStream::new(body.into_reader()).map_ok(Frame::data)).boxed_unsync()
}

fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Generate the metrics response in Prometheus format
fn metrics_response(service: &AssetService) -> Response<ResponseBody> {
    let body = format_prometheus_metrics(
        &service.metrics().get_stats(),
        &service.validator_store().stats(),
    );

    let mut response = Response::new(full_body(body));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    response
}

fn method_not_allowed_response() -> Response<ResponseBody> {
    let mut response = Response::new(full_body(Bytes::new()));
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}
