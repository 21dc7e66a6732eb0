//! Local fetch layer
//!
//! Reads objects from disk and declares a content type for them from the
//! file extension, the way a store gateway would send a `Content-Type`
//! header. Unknown extensions declare nothing, which the inspector treats as
//! `application/octet-stream`.

use crate::error::Result;
use std::path::Path;

/// A fully buffered object and its declared content type
#[derive(Debug, Clone)]
pub struct LoadedObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<&'static str>,
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedObject> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    Ok(LoadedObject {
        bytes,
        content_type: content_type_for_path(path),
    })
}

/// Content type implied by a file extension
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}
