//! Static Revalidate
//!
//! Serves static resources over HTTP with correct caching semantics:
//! conditional re-validation (ETag / Last-Modified), gzip negotiation
//! against precompressed `.gz` siblings, and configurable Cache-Control.
//!
//! # Overview
//!
//! Each request runs through a fixed pipeline:
//!
//! 1. [`ResourceProvider`] resolves the path under the asset root, refusing
//!    missing files, directories and anything that escapes the root
//! 2. [`EncodingNegotiator`] picks the `.gz` sibling or the original
//! 3. [`ValidatorStore`] returns Last-Modified and ETag for that variant
//! 4. [`evaluate`] decides between 304 Not Modified and a full body
//! 5. [`ResponseAssembler`] builds the header set
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use static_revalidate::{AssetConfig, AssetService};
//! use http::HeaderMap;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AssetConfig::from_file("static_revalidate.yaml")?;
//! let service = AssetService::filesystem(Arc::new(config));
//!
//! let response = service.serve("public", "/app.css", &HeaderMap::new()).await;
//! println!("{} {:?}", response.status, response.headers);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! root_path: public
//! mount_prefix: /assets
//! listen_address: "127.0.0.1:9000"
//! production: true
//! default_cache_control: "max-age=3600"
//! cache_control:
//!   "/public/index.html": "no-cache"
//! default_charset: utf-8
//! metrics_path: /metrics
//! ```
//!
//! See [`AssetConfig`] for every option.
//!
//! # Caching policy
//!
//! In production mode validators are computed once per variant and reused
//! for the life of the [`ValidatorStore`]; gzip siblings are served to
//! clients that accept them. Outside production validators are recomputed
//! on every request, gzip is never served and Cache-Control defaults to
//! `no-cache`.

pub mod body;
pub mod conditional;
pub mod config;
pub mod error;
pub mod http_date;
pub mod locator;
pub mod metrics;
pub mod models;
pub mod negotiator;
pub mod response_assembler;
pub mod server;
pub mod service;
pub mod validator_store;

// Re-export commonly used types
pub use body::BodyStream;
pub use conditional::{evaluate, ConditionalContext, Decision};
pub use config::AssetConfig;
pub use error::{AssetError, Result};
pub use locator::{BundleProvider, FileSystemProvider, ResourceProvider};
pub use metrics::{AssetMetrics, MetricsSnapshot};
pub use models::{Encoding, Outcome, Resource, ResourceKind, ValidatorRecord, Variant};
pub use negotiator::{EncodingNegotiator, Negotiation};
pub use response_assembler::ResponseAssembler;
pub use server::AssetServer;
pub use service::{AssetResponse, AssetService};
pub use validator_store::{ValidatorStore, ValidatorStoreStats};
