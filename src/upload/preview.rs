use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{trace, warn};
use uuid::Uuid;

use super::file::{FileCandidate, FileSource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to prepare preview for {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Allocates and frees the short lived URLs that let a user open a file
/// before it is uploaded. Every URL handed out by `create` must be passed to
/// `revoke` exactly once.
pub trait PreviewHost: Send + Sync {
    fn create(&self, file: &FileCandidate) -> Result<PreviewUrl, PreviewError>;
    fn revoke(&self, url: &PreviewUrl);
}

/// Owns one preview URL and revokes it when released or dropped.
pub struct Preview {
    url: PreviewUrl,
    host: Arc<dyn PreviewHost>,
    released: bool,
}

impl Preview {
    pub fn acquire(host: &Arc<dyn PreviewHost>, file: &FileCandidate) -> Result<Self, PreviewError> {
        let url = host.create(file)?;
        trace!("Acquired preview {url} for {}", file.name);
        Ok(Self {
            url,
            host: Arc::clone(host),
            released: false,
        })
    }

    pub fn url(&self) -> &PreviewUrl {
        &self.url
    }

    pub fn release(mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if !self.released {
            self.released = true;
            self.host.revoke(&self.url);
            trace!("Released preview {}", self.url);
        }
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preview")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish()
    }
}

/// In process registry of `blob:` URLs, the way a browser tracks object URLs.
#[derive(Debug)]
pub struct ObjectUrlHost {
    origin: String,
    live: Mutex<HashSet<PreviewUrl>>,
}

impl Default for ObjectUrlHost {
    fn default() -> Self {
        Self::new("hrview")
    }
}

impl ObjectUrlHost {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            live: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl PreviewHost for ObjectUrlHost {
    fn create(&self, _file: &FileCandidate) -> Result<PreviewUrl, PreviewError> {
        let url = PreviewUrl(format!("blob:{}/{}", self.origin, Uuid::new_v4()));
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone());
        Ok(url)
    }

    fn revoke(&self, url: &PreviewUrl) {
        if !self.live.lock().unwrap_or_else(PoisonError::into_inner).remove(url) {
            warn!("Revoking unknown preview {url}");
        }
    }
}

/// Keeps a copy of every previewed file in a private temporary directory so
/// external viewers can open it. Copies are deleted on revoke, the directory
/// when the host is dropped.
#[derive(Debug)]
pub struct TempDirPreviewHost {
    dir: tempfile::TempDir,
    live: Mutex<HashMap<PreviewUrl, PathBuf>>,
}

impl TempDirPreviewHost {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("hrview-preview-").tempdir()?,
            live: Mutex::new(HashMap::new()),
        })
    }

    pub fn path_of(&self, url: &PreviewUrl) -> Option<PathBuf> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn materialize(&self, file: &FileCandidate) -> std::io::Result<PathBuf> {
        // One sub directory per preview keeps the original file name intact
        let slot = self.dir.path().join(Uuid::new_v4().to_string());
        fs::create_dir(&slot)?;
        // Only the final component is used so a name cannot leave the slot
        let name = Path::new(&file.name)
            .file_name()
            .unwrap_or_else(|| OsStr::new("preview"));
        let target = slot.join(name);
        match &file.source {
            FileSource::Path(path) => {
                fs::copy(path, &target)?;
            }
            FileSource::Memory(bytes) => fs::write(&target, bytes)?,
        }
        Ok(target)
    }
}

impl PreviewHost for TempDirPreviewHost {
    fn create(&self, file: &FileCandidate) -> Result<PreviewUrl, PreviewError> {
        let path = self.materialize(file).map_err(|source| PreviewError::Io {
            name: file.name.clone(),
            source,
        })?;
        let url = PreviewUrl(format!("file://{}", path.display()));
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), path);
        Ok(url)
    }

    fn revoke(&self, url: &PreviewUrl) {
        let path = self.live.lock().unwrap_or_else(PoisonError::into_inner).remove(url);
        match path.as_ref().and_then(|p| p.parent()) {
            Some(slot) => {
                if let Err(e) = fs::remove_dir_all(slot) {
                    warn!("Could not remove preview copy {}: {e}", slot.display());
                }
            }
            None => warn!("Revoking unknown preview {url}"),
        }
    }
}
