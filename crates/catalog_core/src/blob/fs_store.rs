//! Flat-directory image store.
//!
//! # Invariants
//! - Each blob lives at `{dir}/{content_address}`.
//! - New blobs are written to a temp file in `dir` and renamed into place,
//!   so a reader sees either nothing or the complete content.
//! - Missing blobs resolve to `{dir}/default.jpg`, or to the built-in
//!   placeholder when the directory carries none.

use super::{
    content_address, validate_reference, BlobResult, FetchedImage, ImageStore,
    DEFAULT_PLACEHOLDER, PLACEHOLDER_NAME,
};
use log::{debug, error, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Filesystem-backed [`ImageStore`].
#[derive(Debug, Clone)]
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    /// Creates a store rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the placeholder served for missing blobs.
    pub fn placeholder_path(&self) -> PathBuf {
        self.dir.join(PLACEHOLDER_NAME)
    }

    fn write_blob(&self, path: &Path, bytes: &[u8]) -> BlobResult<()> {
        fs::create_dir_all(&self.dir)?;

        if path.is_file() {
            return Ok(());
        }

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    fn read_placeholder(&self) -> BlobResult<Vec<u8>> {
        match fs::read(self.placeholder_path()) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(DEFAULT_PLACEHOLDER.to_vec()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ImageStore for FsImageStore {
    fn put(&self, bytes: &[u8]) -> BlobResult<String> {
        let reference = content_address(bytes);
        let path = self.dir.join(&reference);

        match self.write_blob(&path, bytes) {
            Ok(()) => {
                info!(
                    "event=image_put module=blob status=ok reference={} size={}",
                    reference,
                    bytes.len()
                );
                Ok(reference)
            }
            Err(err) => {
                error!(
                    "event=image_put module=blob status=error reference={} error={}",
                    reference, err
                );
                Err(err)
            }
        }
    }

    fn get(&self, reference: &str) -> BlobResult<FetchedImage> {
        validate_reference(reference)?;

        match fs::read(self.dir.join(reference)) {
            Ok(bytes) => Ok(FetchedImage {
                bytes,
                placeholder: false,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("event=image_get module=blob status=placeholder reference={reference}");
                let bytes = self.read_placeholder()?;
                Ok(FetchedImage {
                    bytes,
                    placeholder: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
