//! Magic-byte format sniffing
//!
//! A short, ordered table of signatures for the formats the classifier acts
//! on. This is deliberately not a general file-type database: it only knows
//! media it can preview, the containers it reports as known binary, and the
//! `serialization::archive` header used by some serialization libraries.
//!
//! ```text
//! Format   Offset  Signature
//! -------  ------  ---------------------------------
//! png      0       89 50 4E 47 0D 0A 1A 0A
//! jpeg     0       FF D8 FF
//! gif      0       "GIF8"
//! webp     0 / 8   "RIFF" .... "WEBP"
//! pdf      0       "%PDF"
//! zip      0       50 4B 03 04
//! gzip     0       1F 8B
//! sqlite   0       "SQLite format 3\0"
//! mp4      4       "ftyp"            (length > 12)
//! mp3      0       "ID3" | FF FB
//! ogg      0       "OggS"
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

/// How far into the object to look for the archive header
const ARCHIVE_SCAN_LEN: usize = 64;
const ARCHIVE_MARKER: &str = "serialization::archive";

/// Detected or declared format of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Png,
    Jpeg,
    Gif,
    Webp,
    Pdf,
    Zip,
    Gzip,
    Sqlite,
    Mp4,
    Mp3,
    Ogg,
    SerializationArchive,
    /// Subtype of the declared content type, e.g. `json` for `application/json`
    Declared(String),
}

impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Gif => "gif",
            Format::Webp => "webp",
            Format::Pdf => "pdf",
            Format::Zip => "zip",
            Format::Gzip => "gzip",
            Format::Sqlite => "sqlite",
            Format::Mp4 => "mp4",
            Format::Mp3 => "mp3",
            Format::Ogg => "ogg",
            Format::SerializationArchive => "serialization-archive",
            Format::Declared(subtype) => subtype,
        }
    }

    /// Format from the magic bytes, falling back to the declared subtype
    pub fn resolve(data: &[u8], content_type: Option<&str>) -> Option<Format> {
        sniff(data).or_else(|| content_type.and_then(declared_subtype).map(Format::Declared))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Format::Png | Format::Jpeg | Format::Gif | Format::Webp)
            || self.declared_is(&["png", "jpeg", "gif", "webp"])
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Format::Mp4) || self.declared_is(&["mp4"])
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Format::Mp3 | Format::Ogg) || self.declared_is(&["mp3", "ogg"])
    }

    /// Containers reported as known binary without further probing
    pub fn is_known_container(&self) -> bool {
        matches!(self, Format::Zip | Format::Gzip | Format::Pdf | Format::Sqlite)
            || self.declared_is(&["zip", "gzip", "pdf", "sqlite"])
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Format::SerializationArchive)
    }

    // A declared subtype that spells a sniffable format is treated like it,
    // e.g. `application/zip` or `application/pdf` without their magic bytes.
    fn declared_is(&self, names: &[&str]) -> bool {
        match self {
            Format::Declared(subtype) => names.contains(&subtype.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn starts_with_at(data: &[u8], pattern: &[u8], offset: usize) -> bool {
    data.get(offset..offset + pattern.len()) == Some(pattern)
}

/// One row of the signature table: every `(offset, bytes)` part must match
struct Signature {
    format: Format,
    parts: &'static [(usize, &'static [u8])],
    min_len: usize,
}

const fn sig(format: Format, parts: &'static [(usize, &'static [u8])]) -> Signature {
    Signature { format, parts, min_len: 0 }
}

const SIGNATURES: &[Signature] = &[
    sig(Format::Png, &[(0, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])]),
    sig(Format::Jpeg, &[(0, &[0xFF, 0xD8, 0xFF])]),
    sig(Format::Gif, &[(0, b"GIF8")]),
    sig(Format::Webp, &[(0, b"RIFF"), (8, b"WEBP")]),
    sig(Format::Pdf, &[(0, b"%PDF")]),
    sig(Format::Zip, &[(0, &[0x50, 0x4B, 0x03, 0x04])]),
    sig(Format::Gzip, &[(0, &[0x1F, 0x8B])]),
    sig(Format::Sqlite, &[(0, b"SQLite format 3\0")]),
    Signature { format: Format::Mp4, parts: &[(4, b"ftyp")], min_len: 13 },
    sig(Format::Mp3, &[(0, b"ID3")]),
    sig(Format::Mp3, &[(0, &[0xFF, 0xFB])]),
    sig(Format::Ogg, &[(0, b"OggS")]),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        data.len() >= self.min_len
            && self.parts.iter().all(|(offset, bytes)| starts_with_at(data, bytes, *offset))
    }
}

/// Match the object against the signature table. First match wins.
pub fn sniff(data: &[u8]) -> Option<Format> {
    if data.len() < 4 {
        return None;
    }

    if let Some(signature) = SIGNATURES.iter().find(|s| s.matches(data)) {
        return Some(signature.format.clone());
    }

    // Non-ASCII bytes can't be part of the marker, so a lossy view is enough
    let head = &data[..data.len().min(ARCHIVE_SCAN_LEN)];
    if String::from_utf8_lossy(head).contains(ARCHIVE_MARKER) {
        return Some(Format::SerializationArchive);
    }

    None
}

/// Subtype of a declared content type, lowercased and without parameters.
///
/// Returns `None` for a missing subtype and for the generic `octet-stream`.
pub fn declared_subtype(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let subtype = essence.split('/').nth(1)?.trim().to_ascii_lowercase();
    if subtype.is_empty() || subtype == "octet-stream" {
        return None;
    }
    Some(subtype)
}
