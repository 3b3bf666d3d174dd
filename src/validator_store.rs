//! Memoized validators (Last-Modified and ETag) per variant
//!
//! In production mode a record is computed once per variant identity and
//! then returned verbatim, even if the file later changes on disk. Outside
//! production every lookup recomputes and overwrites the stored record so
//! edits show up on the next request. Records are never evicted.

use crate::http_date::{format_millis, format_system_time};
use crate::models::{Resource, ResourceKind, ValidatorRecord, Variant, UNKNOWN_MODIFIED};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Separator between Last-Modified and identity in the ETag digest input
const ETAG_SEPARATOR: &str = " -> ";

/// Validator store statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorStoreStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe store of validator records keyed by variant identity
#[derive(Debug, Default)]
pub struct ValidatorStore {
    records: RwLock<HashMap<String, ValidatorRecord>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ValidatorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Validators for a variant under the given caching policy
    ///
    /// # Arguments
    /// * `variant` - The variant selected for the request
    /// * `production` - Reuse stored records when true, recompute when false
    pub fn validators_for(&self, variant: &Variant, production: bool) -> ValidatorRecord {
        let identity = variant.identity();

        if production {
            if let Some(record) = self.get(identity) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Validator hit for {}", identity);
                return record;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let record = compute_validators(&variant.resource);
        debug!(
            "Computed validators for {}: last_modified={:?}, etag={:?}",
            identity, record.last_modified, record.etag
        );

        match self.records.write() {
            Ok(mut records) => {
                records.insert(identity.to_string(), record.clone());
            }
            Err(e) => warn!("Validator store lock poisoned, not storing {}: {}", identity, e),
        }

        record
    }

    /// Stored record for an identity, without computing
    pub fn get(&self, identity: &str) -> Option<ValidatorRecord> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(identity).cloned())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get store statistics
    pub fn stats(&self) -> ValidatorStoreStats {
        ValidatorStoreStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Compute the validators for a resource from scratch
pub fn compute_validators(resource: &Resource) -> ValidatorRecord {
    let last_modified = last_modified_for(resource);
    let etag = last_modified
        .as_deref()
        .map(|lm| etag_for(lm, &resource.identity));
    ValidatorRecord::new(last_modified, etag)
}

/// HTTP-date Last-Modified for a resource, if its kind records one
pub fn last_modified_for(resource: &Resource) -> Option<String> {
    match resource.kind {
        ResourceKind::File { modified } => modified.map(format_system_time),
        ResourceKind::ArchiveEntry { modified_millis } if modified_millis != UNKNOWN_MODIFIED => {
            format_millis(modified_millis)
        }
        ResourceKind::ArchiveEntry { .. } | ResourceKind::Other => None,
    }
}

/// Quoted hex SHA-256 of `last_modified -> identity`
pub fn etag_for(last_modified: &str, identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(last_modified.as_bytes());
    hasher.update(ETAG_SEPARATOR.as_bytes());
    hasher.update(identity.as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}
