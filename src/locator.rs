//! Resource lookup
//!
//! A [`ResourceProvider`] turns `(root, relative path)` into a concrete
//! [`Resource`] and opens its body. Two providers ship with the crate:
//!
//! - [`FileSystemProvider`]: files under a directory, with canonical
//!   containment checks so `../` cannot escape the root
//! - [`BundleProvider`]: an in-memory bundle of archived entries, e.g.
//!   assets packed into the binary at build time

use crate::body::BodyStream;
use crate::error::{AssetError, Result};
use crate::models::{Resource, ResourceKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Source of resources for the asset service
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Resolve a relative path under `root`
    ///
    /// Returns `None` when the target does not exist, is a directory, or
    /// lies outside `root`.
    async fn locate(&self, root: &str, relative_path: &str) -> Option<Resource>;

    /// Open the body of a previously located resource
    async fn open(&self, resource: &Resource) -> Result<BodyStream>;
}

/// Make sure a relative path begins with `/`
pub fn normalize_relative(relative_path: &str) -> String {
    if relative_path.starts_with('/') {
        relative_path.to_string()
    } else {
        format!("/{}", relative_path)
    }
}

/// Literal resource path used for per-path configuration lookups
///
/// Always begins with `/`, whether or not `root` is absolute.
pub fn resource_path(root: &str, relative_path: &str) -> String {
    format!(
        "{}{}",
        normalize_relative(root.trim_end_matches('/')),
        normalize_relative(relative_path)
    )
}

/// Resources served from a directory on disk
#[derive(Debug, Clone, Default)]
pub struct FileSystemProvider;

impl FileSystemProvider {
    pub fn new() -> Self {
        FileSystemProvider
    }
}

#[async_trait]
impl ResourceProvider for FileSystemProvider {
    async fn locate(&self, root: &str, relative_path: &str) -> Option<Resource> {
        let relative = normalize_relative(relative_path);

        let canonical_root = match fs::canonicalize(root).await {
            Ok(path) => path,
            Err(e) => {
                debug!("Asset root {} cannot be resolved: {}", root, e);
                return None;
            }
        };

        let target = Path::new(root).join(relative.trim_start_matches('/'));
        let canonical = fs::canonicalize(&target).await.ok()?;

        if !canonical.starts_with(&canonical_root) {
            debug!(
                "Rejecting {}: resolves outside root {}",
                relative,
                canonical_root.display()
            );
            return None;
        }

        let metadata = fs::metadata(&canonical).await.ok()?;
        if metadata.is_dir() {
            debug!("Rejecting {}: is a directory", relative);
            return None;
        }

        Some(Resource {
            identity: format!("file://{}", canonical.display()),
            kind: ResourceKind::File {
                modified: metadata.modified().ok(),
            },
            is_directory: false,
            size: Some(metadata.len()),
            location: canonical,
        })
    }

    async fn open(&self, resource: &Resource) -> Result<BodyStream> {
        let file = fs::File::open(&resource.location).await.map_err(|e| {
            warn!("Failed to open {}: {}", resource.location.display(), e);
            AssetError::StreamOpenFailure(e.to_string())
        })?;

        let length = file.metadata().await.ok().map(|m| m.len());
        Ok(BodyStream::new(file, length))
    }
}

/// One entry of a [`BundleProvider`]
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub data: Bytes,
    /// Milliseconds since the epoch, or [`crate::models::UNKNOWN_MODIFIED`]
    pub modified_millis: i64,
}

/// Resources packed into an in-memory bundle
///
/// Entry names are absolute slash-separated paths such as
/// `/public/app.css`. Directories are implied by entries beneath them or
/// registered explicitly with [`BundleProvider::with_directory`].
#[derive(Debug, Clone)]
pub struct BundleProvider {
    name: String,
    entries: HashMap<String, BundleEntry>,
    directories: HashSet<String>,
}

impl BundleProvider {
    /// Create an empty bundle; `name` becomes part of every identity
    pub fn new(name: impl Into<String>) -> Self {
        BundleProvider {
            name: name.into(),
            entries: HashMap::new(),
            directories: HashSet::new(),
        }
    }

    /// Add a file entry
    pub fn with_entry(
        mut self,
        path: &str,
        data: impl Into<Bytes>,
        modified_millis: i64,
    ) -> Self {
        if let Some(path) = normalize_segments(path) {
            self.entries.insert(
                path,
                BundleEntry {
                    data: data.into(),
                    modified_millis,
                },
            );
        }
        self
    }

    /// Register an explicit directory entry
    pub fn with_directory(mut self, path: &str) -> Self {
        if let Some(path) = normalize_segments(path) {
            self.directories.insert(path);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_directory(&self, path: &str) -> bool {
        if self.directories.contains(path) {
            return true;
        }
        let prefix = format!("{}/", path);
        self.entries.keys().any(|name| name.starts_with(&prefix))
    }
}

#[async_trait]
impl ResourceProvider for BundleProvider {
    async fn locate(&self, root: &str, relative_path: &str) -> Option<Resource> {
        let root = normalize_segments(root)?;
        let joined = format!("{}{}", root, normalize_relative(relative_path));
        let path = normalize_segments(&joined)?;

        let inside_root = root == "/" || path.starts_with(&format!("{}/", root));
        if !inside_root {
            debug!("Rejecting {}: resolves outside bundle root {}", path, root);
            return None;
        }

        if self.is_directory(&path) {
            debug!("Rejecting {}: is a bundle directory", path);
            return None;
        }

        let entry = self.entries.get(&path)?;
        Some(Resource {
            identity: format!("bundle:{}!{}", self.name, path),
            location: PathBuf::from(&path),
            kind: ResourceKind::ArchiveEntry {
                modified_millis: entry.modified_millis,
            },
            is_directory: false,
            size: Some(entry.data.len() as u64),
        })
    }

    async fn open(&self, resource: &Resource) -> Result<BodyStream> {
        let key = resource.location.to_string_lossy();
        self.entries
            .get(key.as_ref())
            .map(|entry| BodyStream::from_bytes(entry.data.clone()))
            .ok_or_else(|| AssetError::StreamOpenFailure(format!("no bundle entry {}", key)))
    }
}

/// Resolve `.` and `..` segments lexically
///
/// Returns `None` if the path climbs above `/`.
fn normalize_segments(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(format!("/{}", segments.join("/")))
}
