//! Response header assembly for asset responses

use crate::config::{AssetConfig, NO_CACHE};
use crate::error::{AssetError, Result};
use crate::http_date::format_http_date;
use crate::models::{Outcome, ValidatorRecord};
use chrono::Utc;
use http::header::{
    CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, DATE, ETAG, LAST_MODIFIED,
    VARY,
};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Content type used when the MIME type cannot be resolved
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Builds status and headers for an [`Outcome`]
pub struct ResponseAssembler {
    config: Arc<AssetConfig>,
}

impl ResponseAssembler {
    /// Create a new ResponseAssembler
    pub fn new(config: Arc<AssetConfig>) -> Self {
        ResponseAssembler { config }
    }

    /// Build response headers for the client
    ///
    /// # Arguments
    /// * `outcome` - Result of negotiation and conditional evaluation
    /// * `resource_path` - Literal resource path, used for Cache-Control overrides
    /// * `gzip_available` - Whether a `.gz` sibling exists for the path
    ///
    /// # Returns
    /// A tuple of (StatusCode, HeaderMap)
    pub fn assemble(
        &self,
        outcome: &Outcome,
        resource_path: &str,
        gzip_available: bool,
    ) -> Result<(StatusCode, HeaderMap)> {
        let mut headers = HeaderMap::new();

        let status = match outcome {
            Outcome::NotFound => return Ok((StatusCode::NOT_FOUND, headers)),
            Outcome::NotModified { validators } => {
                self.insert_cacheable(&mut headers, validators, resource_path)?;
                StatusCode::NOT_MODIFIED
            }
            Outcome::Full {
                variant,
                validators,
                content_length,
                mime_type,
            } => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(*content_length));
                insert(
                    &mut headers,
                    CONTENT_TYPE,
                    &self.content_type(mime_type.as_deref()),
                )?;

                if gzip_available {
                    headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
                }
                if let Some(encoding) = variant.encoding.content_encoding() {
                    headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
                }

                self.insert_cacheable(&mut headers, validators, resource_path)?;
                StatusCode::OK
            }
        };

        debug!(
            "Built response headers for {}: status={}, cache_control={:?}",
            resource_path,
            status,
            headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok())
        );

        Ok((status, headers))
    }

    /// Cache-Control directive for a resource path
    ///
    /// A per-path override wins; otherwise production uses the configured
    /// default and development disables caching.
    pub fn cache_control(&self, resource_path: &str) -> String {
        if let Some(directive) = self.config.cache_control_override(resource_path) {
            return directive.to_string();
        }
        if self.config.production {
            self.config.default_cache_control.clone()
        } else {
            NO_CACHE.to_string()
        }
    }

    /// Content-Type value for a resolved MIME type
    pub fn content_type(&self, mime_type: Option<&str>) -> String {
        match mime_type {
            Some(mime) if is_text(mime) => {
                format!("{}; charset={}", mime, self.config.default_charset)
            }
            Some(mime) => mime.to_string(),
            None => FALLBACK_CONTENT_TYPE.to_string(),
        }
    }

    /// Date, validators and Cache-Control, shared by 200 and 304
    fn insert_cacheable(
        &self,
        headers: &mut HeaderMap,
        validators: &ValidatorRecord,
        resource_path: &str,
    ) -> Result<()> {
        insert(headers, DATE, &format_http_date(Utc::now()))?;
        if let Some(etag) = &validators.etag {
            insert(headers, ETAG, etag)?;
        }
        if let Some(last_modified) = &validators.last_modified {
            insert(headers, LAST_MODIFIED, last_modified)?;
        }
        insert(headers, CACHE_CONTROL, &self.cache_control(resource_path))
    }
}

/// Whether a MIME type carries text and should get a charset parameter
pub fn is_text(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence.starts_with("text/")
        || matches!(
            essence.as_str(),
            "application/javascript" | "application/json" | "application/xml"
        )
        || essence.ends_with("+xml")
        || essence.ends_with("+json")
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AssetError::InvalidHeader(format!("{}: {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}
