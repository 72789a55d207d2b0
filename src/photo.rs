// Photo file store
//
// Attached photos live as files in one application-local directory; entries
// hold only the file name. Files are named by content hash, so importing
// the same image twice lands on the same file and never duplicates bytes.
// Whether a file may actually be deleted is the entry store's call, since
// several entries can share one photo.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Hex characters of the content hash kept in a photo file name.
const NAME_HASH_LEN: usize = 16;

const DEFAULT_EXT: &str = "jpg";

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Failed to create photo directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read photo {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write photo {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to remove photo {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Directory of photo files owned by the application.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Opens the store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PhotoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PhotoError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(PhotoStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies an image file into the store. Returns the store-internal file
    /// name to keep on the entry.
    pub fn import(&self, source: &Path) -> Result<String, PhotoError> {
        let bytes = fs::read(source).map_err(|e| PhotoError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXT)
            .to_lowercase();
        self.import_bytes(&bytes, &ext)
    }

    /// Stores raw image bytes under their content hash.
    pub fn import_bytes(&self, bytes: &[u8], ext: &str) -> Result<String, PhotoError> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("{:x}", hasher.finalize());
        let name = format!("{}.{}", &hash[..NAME_HASH_LEN], ext);
        let path = self.path_of(&name);
        if !path.exists() {
            fs::write(&path, bytes).map_err(|source| PhotoError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(photo = %name, "imported photo");
        }
        Ok(name)
    }

    /// Absolute path of a stored photo.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        is_store_name(name) && self.path_of(name).exists()
    }

    /// Deletes a photo file. Returns whether a file was actually removed.
    pub fn remove(&self, name: &str) -> Result<bool, PhotoError> {
        // Names are store-generated; anything path-like is not ours.
        if !is_store_name(name) {
            return Ok(false);
        }
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(photo = %name, "removed photo");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PhotoError::Remove { path, source }),
        }
    }
}

fn is_store_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}
