//! In-process image store for tests and embedding.

use super::{content_address, validate_reference, BlobResult, FetchedImage, ImageStore};
use log::debug;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// [`ImageStore`] keeping blobs in a map, with an explicit placeholder payload.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    placeholder: Vec<u8>,
}

impl MemoryImageStore {
    pub fn new(placeholder: impl Into<Vec<u8>>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            placeholder: placeholder.into(),
        }
    }

    /// Number of distinct blobs stored.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageStore for MemoryImageStore {
    fn put(&self, bytes: &[u8]) -> BlobResult<String> {
        let reference = content_address(bytes);
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(reference.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(reference)
    }

    fn get(&self, reference: &str) -> BlobResult<FetchedImage> {
        validate_reference(reference)?;

        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        match blobs.get(reference) {
            Some(bytes) => Ok(FetchedImage {
                bytes: bytes.clone(),
                placeholder: false,
            }),
            None => {
                debug!("event=image_get module=blob status=placeholder reference={reference}");
                Ok(FetchedImage {
                    bytes: self.placeholder.clone(),
                    placeholder: true,
                })
            }
        }
    }
}
