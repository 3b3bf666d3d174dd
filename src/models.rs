//! Core data models for asset serving

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Modification time reported by archive entries that do not record one
pub const UNKNOWN_MODIFIED: i64 = -1;

/// Where a resource comes from, which decides how its Last-Modified is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Plain file on disk, with its filesystem timestamp if readable
    File { modified: Option<SystemTime> },
    /// Entry inside an archive or bundle; milliseconds since the epoch,
    /// or [`UNKNOWN_MODIFIED`]
    ArchiveEntry { modified_millis: i64 },
    /// Anything else; never carries validators
    Other,
}

/// A concrete resource handle resolved from a logical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Canonical absolute location, e.g. `file:///srv/public/app.css`
    pub identity: String,
    /// Location the provider opens the body from
    pub location: PathBuf,
    pub kind: ResourceKind,
    pub is_directory: bool,
    /// Size in bytes, if the provider knows it without opening
    pub size: Option<u64>,
}

/// Content encoding of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    Identity,
    Gzip,
}

impl Encoding {
    /// Value for the Content-Encoding header, if one is sent
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Encoding::Identity => None,
            Encoding::Gzip => Some("gzip"),
        }
    }
}

/// A specific encoded form of one logical resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub resource: Resource,
    pub encoding: Encoding,
}

impl Variant {
    /// Create a new Variant
    pub fn new(resource: Resource, encoding: Encoding) -> Self {
        Variant { resource, encoding }
    }

    /// Key the validator store uses for this variant
    pub fn identity(&self) -> &str {
        &self.resource.identity
    }

    pub fn is_gzip(&self) -> bool {
        self.encoding == Encoding::Gzip
    }
}

/// Validators computed for one variant
///
/// The ETag only exists when a Last-Modified value does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// HTTP-date formatted modification time
    pub last_modified: Option<String>,
    /// Quoted opaque entity tag
    pub etag: Option<String>,
}

impl ValidatorRecord {
    /// Create a ValidatorRecord with both fields
    pub fn new(last_modified: Option<String>, etag: Option<String>) -> Self {
        ValidatorRecord {
            last_modified,
            etag,
        }
    }

    /// Whether neither validator is available
    pub fn is_empty(&self) -> bool {
        self.last_modified.is_none() && self.etag.is_none()
    }
}

/// Result of evaluating one request against one logical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    NotModified {
        validators: ValidatorRecord,
    },
    Full {
        variant: Variant,
        validators: ValidatorRecord,
        content_length: u64,
        mime_type: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(identity: &str) -> Resource {
        Resource {
            identity: identity.to_string(),
            location: PathBuf::from("/srv/public/app.css"),
            kind: ResourceKind::Other,
            is_directory: false,
            size: Some(10),
        }
    }

    #[test]
    fn test_encoding_content_encoding() {
        assert_eq!(Encoding::Identity.content_encoding(), None);
        assert_eq!(Encoding::Gzip.content_encoding(), Some("gzip"));
    }

    #[test]
    fn test_variant_identity() {
        let variant = Variant::new(resource("file:///srv/public/app.css.gz"), Encoding::Gzip);
        assert_eq!(variant.identity(), "file:///srv/public/app.css.gz");
        assert!(variant.is_gzip());
    }

    #[test]
    fn test_validator_record_empty() {
        assert!(ValidatorRecord::default().is_empty());
        let record = ValidatorRecord::new(Some("Wed, 21 Oct 2015 07:28:00 GMT".to_string()), None);
        assert!(!record.is_empty());
    }
}
