//! Content-addressed image storage.
//!
//! # Responsibility
//! - Derive storage keys from image bytes (`hex(sha256) + ".jpg"`).
//! - Define the `ImageStore` seam with filesystem and in-memory backends.
//!
//! # Invariants
//! - Identical bytes always map to the identical reference.
//! - Re-storing existing content is a no-op and never exposes partial data.
//! - A well-formed reference with no backing blob resolves to the
//!   placeholder image, not an error.

use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod fs_store;
mod memory_store;

pub use fs_store::FsImageStore;
pub use memory_store::MemoryImageStore;

/// Suffix every stored image reference carries.
pub const IMAGE_SUFFIX: &str = ".jpg";
/// File name of the image served for references with no backing blob.
pub const PLACEHOLDER_NAME: &str = "default.jpg";
/// Built-in placeholder, served when the store has no `default.jpg` of its own.
pub const DEFAULT_PLACEHOLDER: &[u8] = include_bytes!("../../assets/default.jpg");

const HASH_HEX_LEN: usize = 64;

pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug)]
pub enum BlobError {
    /// Malformed reference supplied by the caller.
    InvalidReference(String),
    Io(std::io::Error),
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(reference) => {
                write!(f, "image reference must be a `{IMAGE_SUFFIX}` file name: {reference}")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidReference(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Image bytes returned by [`ImageStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// `true` when the requested blob was missing and the placeholder was served.
    pub placeholder: bool,
}

/// Blob layer for item images, keyed by content address.
pub trait ImageStore: Send + Sync {
    /// Stores `bytes` and returns their content address.
    fn put(&self, bytes: &[u8]) -> BlobResult<String>;

    /// Loads the blob for `reference`, falling back to the placeholder.
    ///
    /// # Errors
    /// - `InvalidReference` when `reference` fails [`validate_reference`].
    fn get(&self, reference: &str) -> BlobResult<FetchedImage>;
}

impl<S: ImageStore + ?Sized> ImageStore for &S {
    fn put(&self, bytes: &[u8]) -> BlobResult<String> {
        (**self).put(bytes)
    }

    fn get(&self, reference: &str) -> BlobResult<FetchedImage> {
        (**self).get(reference)
    }
}

impl<S: ImageStore + ?Sized> ImageStore for std::sync::Arc<S> {
    fn put(&self, bytes: &[u8]) -> BlobResult<String> {
        (**self).put(bytes)
    }

    fn get(&self, reference: &str) -> BlobResult<FetchedImage> {
        (**self).get(reference)
    }
}

/// Computes the content address of `bytes`.
///
/// Pure function of content: no salt, no timestamp.
pub fn content_address(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}{IMAGE_SUFFIX}")
}

/// Returns whether `value` has the exact shape produced by [`content_address`].
pub fn is_content_address(value: &str) -> bool {
    match value.strip_suffix(IMAGE_SUFFIX) {
        Some(hash) => {
            hash.len() == HASH_HEX_LEN
                && hash
                    .bytes()
                    .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
        }
        None => false,
    }
}

/// Checks that a caller-supplied reference is a plain `.jpg` file name.
///
/// Accepts any flat name with the image suffix (not only content
/// addresses), so unknown names still reach the placeholder fallback.
pub fn validate_reference(reference: &str) -> BlobResult<()> {
    let is_flat_name = !reference.is_empty()
        && !reference.contains(['/', '\\'])
        && reference != ".."
        && !reference.starts_with("..");
    if is_flat_name && reference.ends_with(IMAGE_SUFFIX) && reference.len() > IMAGE_SUFFIX.len() {
        Ok(())
    } else {
        Err(BlobError::InvalidReference(reference.to_string()))
    }
}
