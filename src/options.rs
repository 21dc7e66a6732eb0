//! Tunable bounds for an inspection.
//!
//! Every bound the pipeline uses is carried here and passed in explicitly;
//! nothing is read from the environment.

use serde::{Deserialize, Serialize};

/// Default length of the text preview, in characters
pub const DEFAULT_PREVIEW_MAX_LEN: usize = 500;
/// Largest preview a caller may request
pub const MAX_PREVIEW_LEN: usize = 4000;
/// Preview length used for text recovered by decompression
pub const DEFAULT_RECOVERED_PREVIEW_MAX_LEN: usize = 800;
/// Bytes fed into the entropy histogram
pub const DEFAULT_ENTROPY_SAMPLE_CAP: usize = 16 * 1024;
/// Ceiling on decompressed output per codec attempt
pub const DEFAULT_DECOMPRESSED_OUTPUT_CAP: usize = 8 * 1024 * 1024;
/// Largest request body the HTTP service accepts for inspection
pub const DEFAULT_MAX_BODY_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectOptions {
    /// Preview length for objects that are text as stored
    pub preview_max_len: usize,
    /// Preview length for text recovered from a compressed payload
    pub recovered_preview_max_len: usize,
    /// Prefix length used by the entropy estimator
    pub entropy_sample_cap: usize,
    /// Decompression bomb guard
    pub decompressed_output_cap: usize,
    /// Upload limit for `POST /api/inspect`
    pub max_body_len: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            preview_max_len: DEFAULT_PREVIEW_MAX_LEN,
            recovered_preview_max_len: DEFAULT_RECOVERED_PREVIEW_MAX_LEN,
            entropy_sample_cap: DEFAULT_ENTROPY_SAMPLE_CAP,
            decompressed_output_cap: DEFAULT_DECOMPRESSED_OUTPUT_CAP,
            max_body_len: DEFAULT_MAX_BODY_LEN,
        }
    }
}

impl InspectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_max_len(mut self, len: usize) -> Self {
        self.preview_max_len = len;
        self
    }

    pub fn with_recovered_preview_max_len(mut self, len: usize) -> Self {
        self.recovered_preview_max_len = len;
        self
    }

    pub fn with_entropy_sample_cap(mut self, cap: usize) -> Self {
        self.entropy_sample_cap = cap;
        self
    }

    pub fn with_decompressed_output_cap(mut self, cap: usize) -> Self {
        self.decompressed_output_cap = cap;
        self
    }

    pub fn with_max_body_len(mut self, len: usize) -> Self {
        self.max_body_len = len;
        self
    }
}

/// Clamp a caller-requested preview length.
///
/// Values outside `1..=4000` fall back to the default, matching what the
/// HTTP service accepts.
pub fn sanitize_preview_len(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if (1..=MAX_PREVIEW_LEN).contains(&n) => n,
        _ => DEFAULT_PREVIEW_MAX_LEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = InspectOptions::default();
        assert_eq!(opts.preview_max_len, 500);
        assert_eq!(opts.recovered_preview_max_len, 800);
        assert_eq!(opts.entropy_sample_cap, 16384);
        assert_eq!(opts.decompressed_output_cap, 8 * 1024 * 1024);
        assert_eq!(opts.max_body_len, 64 * 1024 * 1024);
    }

    #[test]
    fn test_builder_chain() {
        let opts = InspectOptions::new()
            .with_preview_max_len(42)
            .with_entropy_sample_cap(1024)
            .with_decompressed_output_cap(4096)
            .with_recovered_preview_max_len(100);

        assert_eq!(opts.preview_max_len, 42);
        assert_eq!(opts.entropy_sample_cap, 1024);
        assert_eq!(opts.decompressed_output_cap, 4096);
        assert_eq!(opts.recovered_preview_max_len, 100);
    }

    #[test]
    fn test_sanitize_preview_len() {
        assert_eq!(sanitize_preview_len(None), 500);
        assert_eq!(sanitize_preview_len(Some(0)), 500);
        assert_eq!(sanitize_preview_len(Some(1)), 1);
        assert_eq!(sanitize_preview_len(Some(4000)), 4000);
        assert_eq!(sanitize_preview_len(Some(4001)), 500);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let opts: InspectOptions = serde_json::from_str(r#"{"previewMaxLen": 64}"#).unwrap();
        assert_eq!(opts.preview_max_len, 64);
        assert_eq!(opts.entropy_sample_cap, DEFAULT_ENTROPY_SAMPLE_CAP);
    }
}
