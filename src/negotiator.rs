//! Content-encoding negotiation between a resource and its `.gz` sibling

use crate::error::{AssetError, Result};
use crate::locator::{normalize_relative, ResourceProvider};
use crate::models::{Encoding, Resource, Variant};
use std::sync::Arc;
use tracing::debug;

/// Variant chosen for a request, plus whether a gzip sibling exists at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    pub variant: Variant,
    /// True whenever the `.gz` sibling exists, even if identity was chosen
    pub gzip_available: bool,
}

/// Chooses between the identity resource and its precompressed sibling
pub struct EncodingNegotiator {
    provider: Arc<dyn ResourceProvider>,
}

impl EncodingNegotiator {
    /// Create a new EncodingNegotiator over a resource provider
    pub fn new(provider: Arc<dyn ResourceProvider>) -> Self {
        EncodingNegotiator { provider }
    }

    /// Select the variant to serve for `relative_path` under `root`
    ///
    /// The gzip sibling is served only when it exists, the service runs in
    /// production mode and the client lists `gzip` in Accept-Encoding.
    ///
    /// # Returns
    /// * `Ok(Negotiation)` with the chosen variant
    /// * `Err(AssetError::NotFound)` if the identity resource is missing
    pub async fn negotiate(
        &self,
        root: &str,
        relative_path: &str,
        accept_encoding: Option<&str>,
        production: bool,
    ) -> Result<Negotiation> {
        let relative = normalize_relative(relative_path);
        let gzip_path = format!("{}.gz", relative);

        let gzipped = self.existing(root, &gzip_path).await;
        let gzip_available = gzipped.is_some();

        if let Some(resource) = gzipped {
            if production && accepts_gzip(accept_encoding) {
                debug!("Serving gzip variant for {}", relative);
                return Ok(Negotiation {
                    variant: Variant::new(resource, Encoding::Gzip),
                    gzip_available,
                });
            }
        }

        let resource = self
            .existing(root, &relative)
            .await
            .ok_or_else(|| AssetError::not_found(relative.clone()))?;

        debug!(
            "Serving identity variant for {} (gzip sibling: {})",
            relative, gzip_available
        );
        Ok(Negotiation {
            variant: Variant::new(resource, Encoding::Identity),
            gzip_available,
        })
    }

    async fn existing(&self, root: &str, relative_path: &str) -> Option<Resource> {
        self.provider
            .locate(root, relative_path)
            .await
            .filter(|resource| !resource.is_directory)
    }
}

/// Whether an Accept-Encoding value lists the literal `gzip` token
///
/// Quality values are not interpreted, so `gzip;q=0` does not match.
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    accept_encoding
        .map(|header| header.split(',').any(|token| token.trim() == "gzip"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::BundleProvider;

    fn negotiator(with_gzip: bool) -> EncodingNegotiator {
        let mut bundle = BundleProvider::new("test").with_entry("/public/app.css", "body {}", 1_000);
        if with_gzip {
            bundle = bundle.with_entry("/public/app.css.gz", vec![0x1f, 0x8b], 1_000);
        }
        EncodingNegotiator::new(Arc::new(bundle))
    }

    #[test]
    fn test_accepts_gzip() {
        assert!(accepts_gzip(Some("gzip")));
        assert!(accepts_gzip(Some("deflate,  gzip ,br")));
        assert!(!accepts_gzip(Some("deflate, br")));
        assert!(!accepts_gzip(Some("x-gzip")));
        assert!(!accepts_gzip(Some("gzip;q=0.5")));
        assert!(!accepts_gzip(None));
    }

    #[tokio::test]
    async fn test_gzip_selected_in_production() {
        let result = negotiator(true)
            .negotiate("/public", "app.css", Some("gzip, deflate"), true)
            .await
            .unwrap();
        assert!(result.variant.is_gzip());
        assert!(result.gzip_available);
        assert!(result.variant.identity().ends_with("/public/app.css.gz"));
    }

    #[tokio::test]
    async fn test_identity_outside_production() {
        let result = negotiator(true)
            .negotiate("/public", "app.css", Some("gzip"), false)
            .await
            .unwrap();
        assert_eq!(result.variant.encoding, Encoding::Identity);
        assert!(result.gzip_available);
    }

    #[tokio::test]
    async fn test_identity_when_client_lacks_gzip() {
        let result = negotiator(true)
            .negotiate("/public", "app.css", Some("deflate"), true)
            .await
            .unwrap();
        assert_eq!(result.variant.encoding, Encoding::Identity);
    }

    #[tokio::test]
    async fn test_no_sibling() {
        let result = negotiator(false)
            .negotiate("/public", "app.css", Some("gzip"), true)
            .await
            .unwrap();
        assert_eq!(result.variant.encoding, Encoding::Identity);
        assert!(!result.gzip_available);
    }

    #[tokio::test]
    async fn test_missing_identity_is_not_found() {
        let result = negotiator(false)
            .negotiate("/public", "missing.css", Some("gzip"), true)
            .await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let bundle = BundleProvider::new("test").with_entry("/public/css/site.css", "a{}", 1);
        let negotiator = EncodingNegotiator::new(Arc::new(bundle));
        let result = negotiator.negotiate("/public", "css", None, true).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }
}
