//! The ordered decision table
//!
//! Classification is a fixed sequence of rules over a draft verdict. Each rule
//! has a predicate and an action; rules fire in table order and every rule is
//! evaluated at most once. Predicates look at what earlier rules decided, so
//! the table reads top to bottom as the precedence:
//!
//! ```text
//! #  rule                     fires when
//! -  -----------------------  ----------------------------------------------
//! 1  declared-media           mime image/video/audio, or a media signature
//! 2  text                     still unknown and the bytes look like text
//! 3  known-container          still unknown, binary, zip/gzip/pdf/sqlite or
//!                             a serialization::archive header
//! 4  entropy-scoring          still unknown (so: unrecognized binary)
//! 5  decompression-override   rule 4 tagged it `binary`
//! 6  no-preview               nothing set a preview
//! ```
//!
//! The declared content type is trusted for media without checking the
//! signature agrees. A mislabeled upload is therefore shown as media.

use super::compression::compression_ratio;
use super::discriminator::is_binary;
use super::entropy::shannon_entropy;
use super::recovery::{recover_text, Codec};
use super::sniff::Format;
use super::text::{summarize, TextSummary};
use super::{
    ByteSample, Classification, ClassificationVerdict, ContentSample, EncryptionGuess,
    HashDigestSet, Preview, PreviewType,
};
use crate::options::InspectOptions;
use std::cell::OnceCell;

/// Assumed when no content type was declared
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Entropy at or above which binary data is presumed encrypted
pub const HIGH_ENTROPY: f64 = 7.5;
/// Entropy above which a still-compressible object is called compressed
pub const ELEVATED_ENTROPY: f64 = 7.3;
/// Ratio above which high-entropy data is "not compressing"
pub const INCOMPRESSIBLE_RATIO: f64 = 0.9;
/// Ratio below which high-entropy data "still compresses"
pub const COMPRESSIBLE_RATIO: f64 = 0.8;
/// Ratio above which an archive is called highly compressed
pub const ARCHIVE_DENSE_RATIO: f64 = 0.95;

/// Mime fragments that mark a text object as structured
const STRUCTURED_MIME_HINTS: [&str; 5] = ["json", "xml", "csv", "yaml", "toml"];

/// A verdict under construction, plus lazily computed shared evidence
pub struct Draft<'a> {
    sample: &'a ContentSample<'a>,
    options: &'a InspectOptions,
    mime: String,
    format: Option<Format>,
    looks_binary: OnceCell<bool>,
    compression_ratio: OnceCell<Option<f64>>,

    classification: Classification,
    likely_encrypted: bool,
    reason: String,
    entropy: Option<f64>,
    ratio: Option<f64>,
    preview_type: PreviewType,
    preview: Option<Preview>,
    text_summary: Option<TextSummary>,
    recovered_with: Option<Codec>,
    note: Option<String>,
}

impl<'a> Draft<'a> {
    pub fn new(sample: &'a ContentSample<'a>, options: &'a InspectOptions) -> Self {
        Self {
            sample,
            options,
            mime: sample
                .content_type
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_ascii_lowercase(),
            format: Format::resolve(sample.bytes, sample.content_type),
            looks_binary: OnceCell::new(),
            compression_ratio: OnceCell::new(),
            classification: Classification::Unknown,
            likely_encrypted: false,
            reason: String::new(),
            entropy: None,
            ratio: None,
            preview_type: PreviewType::None,
            preview: None,
            text_summary: None,
            recovered_with: None,
            note: None,
        }
    }

    fn looks_binary(&self) -> bool {
        *self.looks_binary.get_or_init(|| is_binary(self.sample.bytes))
    }

    fn compression_ratio(&self) -> Option<f64> {
        *self
            .compression_ratio
            .get_or_init(|| compression_ratio(self.sample.bytes))
    }

    fn is_unknown(&self) -> bool {
        self.classification == Classification::Unknown
    }

    fn media_kind(&self) -> Option<PreviewType> {
        let format = self.format.as_ref();
        if self.mime.starts_with("image/") || format.is_some_and(Format::is_image) {
            Some(PreviewType::Image)
        } else if self.mime.starts_with("video/") || format.is_some_and(Format::is_video) {
            Some(PreviewType::Video)
        } else if self.mime.starts_with("audio/") || format.is_some_and(Format::is_audio) {
            Some(PreviewType::Audio)
        } else {
            None
        }
    }

    fn text_like_mime(&self) -> bool {
        self.mime.starts_with("text/") || STRUCTURED_MIME_HINTS.iter().any(|h| self.mime.contains(h))
    }

    fn set(&mut self, classification: Classification, likely_encrypted: bool, reason: impl Into<String>) {
        self.classification = classification;
        self.likely_encrypted = likely_encrypted;
        self.reason = reason.into();
    }

    pub fn into_verdict(self, hashes: HashDigestSet, byte_sample: ByteSample) -> ClassificationVerdict {
        ClassificationVerdict {
            size_bytes: self.sample.bytes.len(),
            mime_type: self.sample.content_type.map(str::to_string),
            hashes,
            byte_sample,
            format: self.format,
            text_summary: self.text_summary,
            encryption_guess: EncryptionGuess {
                classification: self.classification,
                likely_encrypted: self.likely_encrypted,
                reason: self.reason,
                entropy_bits_per_byte: self.entropy,
                compression_ratio: self.ratio,
            },
            preview_type: self.preview_type,
            preview: self.preview,
            recovered_with: self.recovered_with,
            note: self.note,
        }
    }
}

/// One row of the decision table
pub struct Rule {
    pub name: &'static str,
    applies: fn(&Draft<'_>) -> bool,
    apply: fn(&mut Draft<'_>),
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "declared-media",
        applies: is_media,
        apply: classify_media,
    },
    Rule {
        name: "text",
        applies: is_text,
        apply: classify_text,
    },
    Rule {
        name: "known-container",
        applies: is_known_container,
        apply: classify_container,
    },
    Rule {
        name: "entropy-scoring",
        applies: is_unclassified,
        apply: score_entropy,
    },
    Rule {
        name: "decompression-override",
        applies: is_scored_binary,
        apply: try_decompression,
    },
    Rule {
        name: "no-preview",
        applies: lacks_preview,
        apply: explain_missing_preview,
    },
];

fn is_media(d: &Draft<'_>) -> bool {
    d.media_kind().is_some()
}

fn is_text(d: &Draft<'_>) -> bool {
    d.is_unknown() && !d.looks_binary()
}

fn is_known_container(d: &Draft<'_>) -> bool {
    d.is_unknown()
        && d.format
            .as_ref()
            .is_some_and(|f| f.is_known_container() || f.is_archive())
}

fn is_unclassified(d: &Draft<'_>) -> bool {
    d.is_unknown()
}

fn is_scored_binary(d: &Draft<'_>) -> bool {
    d.classification == Classification::Binary
}

fn lacks_preview(d: &Draft<'_>) -> bool {
    d.preview.is_none()
}

/// Run every rule whose predicate holds, in table order
pub fn run(draft: &mut Draft<'_>) {
    for rule in RULES {
        if (rule.applies)(draft) {
            (rule.apply)(draft);
            tracing::debug!(
                rule = rule.name,
                classification = %draft.classification,
                likely_encrypted = draft.likely_encrypted,
                "rule fired"
            );
        }
    }
}

fn classify_media(d: &mut Draft<'_>) {
    let (classification, kind, label) = match d.media_kind() {
        Some(PreviewType::Image) => (Classification::MediaImage, PreviewType::Image, "Image"),
        Some(PreviewType::Video) => (Classification::MediaVideo, PreviewType::Video, "Video"),
        Some(PreviewType::Audio) => (Classification::MediaAudio, PreviewType::Audio, "Audio"),
        _ => return,
    };

    d.set(
        classification,
        false,
        format!("{} content based on mime or magic header", label),
    );
    d.preview_type = kind;
    d.preview = Some(Preview::Media {
        locator: d.sample.locator.map(str::to_string),
    });
    d.note = Some(format!("{} content rendered from the raw object", label));
}

fn classify_text(d: &mut Draft<'_>) {
    let summary = summarize(d.sample.bytes, d.options.preview_max_len);

    if summary.is_json {
        d.set(Classification::TextJson, false, "Looks like JSON content");
    } else if d.text_like_mime() {
        d.set(Classification::TextStructured, false, "Text content based on mime type");
    } else {
        d.set(Classification::Text, false, "Bytes look like plain text");
    }

    d.preview_type = PreviewType::Text;
    d.preview = Some(Preview::Text {
        text: summary.preview.clone(),
    });
    d.text_summary = Some(summary);
}

fn classify_container(d: &mut Draft<'_>) {
    d.ratio = d.compression_ratio();

    let Some(format) = d.format.clone() else {
        return;
    };

    if format.is_archive() {
        let reason = if d.ratio.is_some_and(|r| r > ARCHIVE_DENSE_RATIO) {
            "Binary archive with a serialization::archive header, highly compressed structured data"
        } else {
            "Binary archive with a serialization::archive header, probably structured data rather than raw media"
        };
        d.set(Classification::BinaryArchive, false, reason);
    } else {
        d.set(Classification::BinaryKnown, false, format!("Known format: {}", format));
    }
}

fn score_entropy(d: &mut Draft<'_>) {
    let entropy = shannon_entropy(d.sample.bytes, d.options.entropy_sample_cap);
    let ratio = d.compression_ratio();
    d.entropy = Some(entropy);
    d.ratio = ratio;

    if entropy >= HIGH_ENTROPY {
        d.set(
            Classification::Binary,
            true,
            "Binary data with very high entropy, likely encrypted or strongly compressed",
        );
    } else {
        d.set(
            Classification::Binary,
            false,
            "Binary data with moderate entropy, probably structured data or light compression",
        );
    }

    if let Some(ratio) = ratio {
        if entropy >= HIGH_ENTROPY && ratio > INCOMPRESSIBLE_RATIO {
            d.set(
                Classification::Binary,
                true,
                "High entropy data that does not compress much, very likely encrypted",
            );
        } else if entropy >= ELEVATED_ENTROPY && ratio < COMPRESSIBLE_RATIO {
            d.set(
                Classification::Binary,
                false,
                "High entropy data that still compresses, probably strongly compressed content rather than pure encryption",
            );
        }
    }
}

fn try_decompression(d: &mut Draft<'_>) {
    let Some(recovered) = recover_text(
        d.sample.bytes,
        d.options.recovered_preview_max_len,
        d.options.decompressed_output_cap,
    ) else {
        return;
    };

    let codec = recovered.codec;
    if recovered.summary.is_json {
        d.set(
            Classification::BinaryCompressedJson,
            false,
            format!("Binary content that looks like {} compressed JSON", codec),
        );
    } else {
        d.set(
            Classification::BinaryCompressedText,
            false,
            format!("Binary content that looks like {} compressed text", codec),
        );
    }

    d.preview_type = PreviewType::Text;
    d.preview = Some(Preview::Text {
        text: recovered.summary.preview.clone(),
    });
    d.text_summary = Some(recovered.summary);
    d.recovered_with = Some(codec);
    d.note = Some(if recovered.truncated {
        format!("Decompressed using {} for preview, output truncated", codec)
    } else {
        format!("Decompressed successfully using {} for preview", codec)
    });
}

fn explain_missing_preview(d: &mut Draft<'_>) {
    d.preview_type = PreviewType::None;
    if d.note.is_some() {
        return;
    }

    d.note = Some(if d.classification == Classification::BinaryArchive {
        "Binary archive with a serialization::archive header, preview disabled".to_string()
    } else if d.likely_encrypted {
        "Binary blob that looks encrypted or strongly compressed, preview disabled".to_string()
    } else {
        "Binary content, preview disabled".to_string()
    });
}
