//! The serving pipeline
//!
//! `serve` runs Locator → Negotiator → Validator Store → Conditional
//! Evaluator → Response Assembler for one request. Every failure becomes
//! a valid HTTP response; nothing here panics or aborts the host.

use crate::body::BodyStream;
use crate::conditional::{evaluate, ConditionalContext, Decision};
use crate::config::AssetConfig;
use crate::error::{AssetError, Result};
use crate::locator::{normalize_relative, resource_path, FileSystemProvider, ResourceProvider};
use crate::metrics::AssetMetrics;
use crate::models::Outcome;
use crate::negotiator::EncodingNegotiator;
use crate::response_assembler::ResponseAssembler;
use crate::validator_store::ValidatorStore;
use http::header::ACCEPT_ENCODING;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Status, headers and optional body produced for one request
#[derive(Debug)]
pub struct AssetResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Present only for 200 responses
    pub body: Option<BodyStream>,
}

impl AssetResponse {
    /// Bare 404 with no headers or body
    pub fn not_found() -> Self {
        AssetResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Serves static assets with conditional re-validation
pub struct AssetService {
    config: Arc<AssetConfig>,
    provider: Arc<dyn ResourceProvider>,
    negotiator: EncodingNegotiator,
    store: Arc<ValidatorStore>,
    assembler: ResponseAssembler,
    metrics: Arc<AssetMetrics>,
}

impl AssetService {
    /// Create a service over a provider and a shared validator store
    pub fn new(
        config: Arc<AssetConfig>,
        provider: Arc<dyn ResourceProvider>,
        store: Arc<ValidatorStore>,
    ) -> Self {
        AssetService {
            negotiator: EncodingNegotiator::new(Arc::clone(&provider)),
            assembler: ResponseAssembler::new(Arc::clone(&config)),
            metrics: Arc::new(AssetMetrics::new()),
            config,
            provider,
            store,
        }
    }

    /// Create a service that serves files from disk with a fresh store
    pub fn filesystem(config: Arc<AssetConfig>) -> Self {
        Self::new(
            config,
            Arc::new(FileSystemProvider::new()),
            Arc::new(ValidatorStore::new()),
        )
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn metrics(&self) -> &AssetMetrics {
        &self.metrics
    }

    pub fn validator_store(&self) -> &ValidatorStore {
        &self.store
    }

    /// Serve `relative_path` under `root` for a request with `headers`
    ///
    /// # Returns
    /// * 200 with a body stream
    /// * 304 with validators, Date and Cache-Control
    /// * 404 for a missing path, a directory, a path outside `root`, or a
    ///   body that cannot be opened
    /// * 500 when a response header cannot be encoded
    pub async fn serve(&self, root: &str, relative_path: &str, headers: &HeaderMap) -> AssetResponse {
        let start = Instant::now();

        let response = match self.try_serve(root, relative_path, headers).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_not_found() {
                    debug!("Not serving {}{}: {}", root, relative_path, e);
                } else {
                    warn!("Failed to serve {}{}: {}", root, relative_path, e);
                }
                let (status, headers) = if e.is_not_found() {
                    self.assembler
                        .assemble(&Outcome::NotFound, "", false)
                        .unwrap_or((StatusCode::NOT_FOUND, HeaderMap::new()))
                } else {
                    let status = StatusCode::from_u16(e.to_http_status())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    (status, HeaderMap::new())
                };
                AssetResponse {
                    status,
                    headers,
                    body: None,
                }
            }
        };

        self.metrics.record_response(response.status, start.elapsed());
        response
    }

    async fn try_serve(
        &self,
        root: &str,
        relative_path: &str,
        headers: &HeaderMap,
    ) -> Result<AssetResponse> {
        let relative = normalize_relative(relative_path);
        let production = self.config.production;
        let accept_encoding = headers
            .get(ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok());

        let negotiation = self
            .negotiator
            .negotiate(root, &relative, accept_encoding, production)
            .await?;
        let variant = negotiation.variant;
        let validators = self.store.validators_for(&variant, production);
        let context = ConditionalContext::from_headers(headers);
        let path = resource_path(root, &relative);

        if evaluate(&context, &validators) == Decision::ShortCircuit {
            debug!("Not modified: {}", path);
            let outcome = Outcome::NotModified { validators };
            let (status, headers) =
                self.assembler
                    .assemble(&outcome, &path, negotiation.gzip_available)?;
            return Ok(AssetResponse {
                status,
                headers,
                body: None,
            });
        }

        let body = self.provider.open(&variant.resource).await?;
        let content_length = body.len().ok_or_else(|| {
            AssetError::StreamOpenFailure(format!("length of {} is unavailable", variant.identity()))
        })?;

        let mime_type = mime_guess::from_path(&relative)
            .first_raw()
            .map(str::to_string);
        let is_gzip = variant.is_gzip();

        let outcome = Outcome::Full {
            variant,
            validators,
            content_length,
            mime_type,
        };
        let (status, headers) =
            self.assembler
                .assemble(&outcome, &path, negotiation.gzip_available)?;

        if is_gzip {
            self.metrics.record_gzip_response();
        }

        Ok(AssetResponse {
            status,
            headers,
            body: Some(body),
        })
    }
}
