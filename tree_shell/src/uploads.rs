//! Upload intake: turns picked files into displayable url handles.
//!
//! A handle stays live until it is released, either when its slot is
//! overwritten again or when the registry (the session) is dropped.

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, info};

/// A file picked for upload.  Only the path is kept; the bytes are read by
/// whoever resolves the handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
}

impl UploadFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        UploadFile { path: path.into() }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

const BLOB_PREFIX: &str = "blob:memory-tree/";

/// Issues `blob:` urls for uploaded files and tracks which are still live.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    live:    HashMap<String, UploadFile>,
    next_id: u64,
}

impl BlobRegistry {
    pub fn new() -> Self { BlobRegistry::default() }

    /// Acquire a handle for `file`.
    pub fn create(&mut self, file: &UploadFile) -> String {
        self.next_id += 1;
        let url = format!("{}{}", BLOB_PREFIX, self.next_id);
        debug!("created {} for {}", url, file.path.display());
        self.live.insert(url.clone(), file.clone());
        url
    }

    /// Release a handle.  Returns false for urls this registry did not
    /// issue (placeholders) or has already released.
    pub fn release(&mut self, url: &str) -> bool {
        let released = self.live.remove(url).is_some();
        if released {
            debug!("released {}", url);
        }
        released
    }

    /// The file behind a live handle.
    pub fn resolve(&self, url: &str) -> Option<&UploadFile> {
        self.live.get(url)
    }

    pub fn is_blob(url: &str) -> bool { url.starts_with(BLOB_PREFIX) }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize { self.live.len() }
}

impl Drop for BlobRegistry {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            info!("session end: releasing {} upload handle(s)", self.live.len());
            self.live.clear();
        }
    }
}
