//! Core classification engine
//!
//! The [`Inspector`] runs one synchronous pipeline per object:
//!
//! 1. hashes and a raw byte sample, always
//! 2. media short-circuit on the declared content type or magic bytes
//! 3. binary/text discrimination; text gets a summary and preview
//! 4. binary objects: known containers, otherwise entropy + compressibility
//! 5. speculative decompression, which may override step 4
//!
//! The ordering lives in [`rules`] as an explicit table. Everything here is a
//! pure function of the bytes, the declared type and [`InspectOptions`], so
//! inspecting the same object twice produces identical verdicts.

pub mod compression;
pub mod digest;
pub mod discriminator;
pub mod entropy;
pub mod recovery;
pub mod rules;
pub mod sniff;
pub mod text;

use crate::options::InspectOptions;
use crate::source;
use serde::Serialize;
use std::fmt;
use std::path::Path;

pub use digest::{ByteSample, HashDigestSet};
pub use recovery::{Codec, RecoveredText};
pub use sniff::Format;
pub use text::TextSummary;

/// An object to inspect: its body, declared content type and, optionally,
/// a locator the caller can use to serve the raw bytes for a media preview.
#[derive(Debug, Clone, Copy)]
pub struct ContentSample<'a> {
    pub bytes: &'a [u8],
    pub content_type: Option<&'a str>,
    pub locator: Option<&'a str>,
}

impl<'a> ContentSample<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            content_type: None,
            locator: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<&'a str>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_locator(mut self, locator: Option<&'a str>) -> Self {
        self.locator = locator;
        self
    }
}

/// Closed set of classification tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Unknown,
    MediaImage,
    MediaVideo,
    MediaAudio,
    Text,
    TextJson,
    TextStructured,
    BinaryKnown,
    BinaryArchive,
    Binary,
    BinaryCompressedJson,
    BinaryCompressedText,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Unknown => "unknown",
            Classification::MediaImage => "media-image",
            Classification::MediaVideo => "media-video",
            Classification::MediaAudio => "media-audio",
            Classification::Text => "text",
            Classification::TextJson => "text-json",
            Classification::TextStructured => "text-structured",
            Classification::BinaryKnown => "binary-known",
            Classification::BinaryArchive => "binary-archive",
            Classification::Binary => "binary",
            Classification::BinaryCompressedJson => "binary-compressed-json",
            Classification::BinaryCompressedText => "binary-compressed-text",
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(
            self,
            Classification::MediaImage | Classification::MediaVideo | Classification::MediaAudio
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Classification::Text | Classification::TextJson | Classification::TextStructured
        )
    }

    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            Classification::BinaryCompressedJson | Classification::BinaryCompressedText
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewType {
    Image,
    Video,
    Audio,
    Text,
    None,
}

/// What a client can show for the object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    Text { text: String },
    /// Media is shown from the raw object; the locator is whatever the caller
    /// supplied in [`ContentSample::locator`]
    Media { locator: Option<String> },
}

/// The classification tag plus the evidence behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionGuess {
    pub classification: Classification,
    pub likely_encrypted: bool,
    pub reason: String,
    pub entropy_bits_per_byte: Option<f64>,
    pub compression_ratio: Option<f64>,
}

/// Everything the inspector concluded about one object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    pub size_bytes: usize,
    /// Declared content type, as given
    pub mime_type: Option<String>,
    pub hashes: HashDigestSet,
    pub byte_sample: ByteSample,
    pub format: Option<Format>,
    pub text_summary: Option<TextSummary>,
    pub encryption_guess: EncryptionGuess,
    pub preview_type: PreviewType,
    pub preview: Option<Preview>,
    /// Codec that recovered the text preview, when decompression succeeded
    pub recovered_with: Option<Codec>,
    pub note: Option<String>,
}

impl ClassificationVerdict {
    pub fn classification(&self) -> Classification {
        self.encryption_guess.classification
    }

    pub fn likely_encrypted(&self) -> bool {
        self.encryption_guess.likely_encrypted
    }
}

/// Outcome of inspecting one file in a batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub path: String,
    pub file_name: String,
    pub verdict: Option<ClassificationVerdict>,
    pub error: Option<String>,
}

impl InspectionRecord {
    pub fn failed(path: &Path, error: impl fmt::Display) -> Self {
        Self {
            path: path.display().to_string(),
            file_name: file_name(path),
            verdict: None,
            error: Some(error.to_string()),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Entry point of the classification pipeline
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    options: InspectOptions,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: InspectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_preview_max_len(mut self, len: usize) -> Self {
        self.options.preview_max_len = len;
        self
    }

    pub fn options(&self) -> &InspectOptions {
        &self.options
    }

    /// Classify one buffered object
    pub fn inspect(&self, sample: &ContentSample<'_>) -> ClassificationVerdict {
        let hashes = HashDigestSet::compute(sample.bytes);
        let byte_sample = ByteSample::capture(sample.bytes);

        let mut draft = rules::Draft::new(sample, &self.options);
        rules::run(&mut draft);
        draft.into_verdict(hashes, byte_sample)
    }

    /// Load a file through the local source layer and classify it.
    ///
    /// Read failures are reported in the record instead of aborting a batch.
    pub fn inspect_file<P: AsRef<Path>>(&self, path: P) -> InspectionRecord {
        self.inspect_file_as(path, None)
    }

    /// Like [`Inspector::inspect_file`], with `content_type` replacing the
    /// type implied by the file extension when given
    pub fn inspect_file_as<P: AsRef<Path>>(
        &self,
        path: P,
        content_type: Option<&str>,
    ) -> InspectionRecord {
        let path = path.as_ref();

        let loaded = match source::load(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read object");
                return InspectionRecord::failed(path, e);
            }
        };

        let sample = ContentSample::new(&loaded.bytes)
            .with_content_type(content_type.or(loaded.content_type));

        InspectionRecord {
            path: path.display().to_string(),
            file_name: file_name(path),
            verdict: Some(self.inspect(&sample)),
            error: None,
        }
    }
}
