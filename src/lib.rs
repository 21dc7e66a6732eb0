//! Blobscope - Classify opaque stored objects
//!
//! Blobscope looks at an object fetched from a content-addressed store,
//! knowing nothing but its bytes and an optional declared content type, and
//! decides what it is: media, text, a known container, or an opaque blob that
//! is probably encrypted.
//!
//! # Overview
//!
//! Objects in a decentralized store are frequently encrypted client-side
//! before upload, but just as often they are plain images, JSON documents or
//! compressed dumps. Blobscope separates these cheaply and deterministically.
//! The same bytes and declared type always yield the same verdict.
//!
//! # Detection Methods
//!
//! 1. **Declared type and magic bytes**: an `image/*`, `video/*` or
//!    `audio/*` content type, or a recognized signature (PNG, JPEG, MP3, ...),
//!    settles the question immediately.
//!
//! 2. **Text discrimination**: a NUL byte, or more than 30% bytes outside
//!    printable ASCII and common whitespace, marks the object as binary.
//!    Text gets a preview, a printable ratio and a JSON probe.
//!
//! 3. **Entropy and compressibility**: Shannon entropy of a prefix and the
//!    zlib compression ratio of the whole object. Encrypted data sits near
//!    8 bits per byte and does not shrink.
//!
//! 4. **Speculative decompression**: gzip, zlib/deflate and brotli are tried
//!    in order; if one yields text, the object is reclassified as compressed
//!    JSON or text and is no longer considered encrypted.
//!
//! # Quick Start
//!
//! ```no_run
//! use blobscope::{ContentSample, Inspector};
//!
//! let bytes = std::fs::read("object.bin").unwrap();
//! let sample = ContentSample::new(&bytes).with_content_type(Some("application/octet-stream"));
//! let verdict = Inspector::new().inspect(&sample);
//!
//! println!("{}", verdict.classification());
//! if verdict.likely_encrypted() {
//!     println!("Looks encrypted: {}", verdict.encryption_guess.reason);
//! }
//! ```
//!
//! # Classifications
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `media-image`, `media-video`, `media-audio` | Shown from the raw object |
//! | `text`, `text-json`, `text-structured` | Text preview available |
//! | `binary-known`, `binary-archive` | Recognized container |
//! | `binary-compressed-json`, `binary-compressed-text` | Text recovered by decompression |
//! | `binary` | Opaque; `likely_encrypted` says whether it looks encrypted |
//!
//! # Modules
//!
//! - [`inspector`]: Classification pipeline and its decision rules
//! - [`blob_id`]: Blob id conversion between base64url and decimal
//! - [`report`]: Output formatters (JSON, CSV)
//! - [`serve`]: Local HTTP service

pub mod blob_id;
pub mod error;
pub mod inspector;
pub mod options;
pub mod report;
pub mod serve;
pub mod source;

pub use error::{Error, Result};
pub use inspector::{
    Classification, ClassificationVerdict, ContentSample, EncryptionGuess, Format,
    InspectionRecord, Inspector, Preview, PreviewType, TextSummary,
};
pub use options::InspectOptions;
