//! Speculative decompression to recover a text preview
//!
//! Binary objects that did not match a known container are fed through gzip,
//! deflate and brotli decoders in that order. The first codec that decodes
//! cleanly *and* yields something the discriminator calls text wins. A
//! successful guess is a preview aid, not proof of how the object was
//! produced: short payloads can decode by accident under a permissive codec.
//!
//! Decompressed output is not bounded by input size, so every attempt reads
//! through an output cap. Output past the cap is dropped and the recovery is
//! marked truncated.

use super::discriminator::is_binary;
use super::text::{summarize, TextSummary};
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};

/// Buffer size handed to the brotli decoder
const BROTLI_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Gzip,
    /// zlib-framed or raw deflate stream
    Deflate,
    Brotli,
}

/// Attempt order
pub const CODECS: [Codec; 3] = [Codec::Gzip, Codec::Deflate, Codec::Brotli];

impl Codec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Deflate => "deflate",
            Codec::Brotli => "brotli",
        }
    }

    /// Decode the whole buffer, reading at most `cap + 1` bytes of output.
    fn decode(&self, data: &[u8], cap: usize) -> io::Result<Vec<u8>> {
        match self {
            Codec::Gzip => read_capped(MultiGzDecoder::new(data), cap),
            Codec::Deflate => read_capped(ZlibDecoder::new(data), cap)
                .or_else(|_| read_capped(DeflateDecoder::new(data), cap)),
            Codec::Brotli => {
                read_capped(brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE), cap)
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn read_capped<R: Read>(reader: R, cap: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.take(cap as u64 + 1).read_to_end(&mut out)?;
    Ok(out)
}

/// Text recovered from a compressed payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredText {
    pub codec: Codec,
    pub summary: TextSummary,
    /// Output hit the cap and was cut
    pub truncated: bool,
}

/// Try each codec in order and summarize the first textual result.
pub fn recover_text(data: &[u8], max_len: usize, output_cap: usize) -> Option<RecoveredText> {
    CODECS.iter().find_map(|&codec| {
        let mut out = match codec.decode(data, output_cap) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(%codec, error = %e, "decompression attempt failed");
                return None;
            }
        };

        let truncated = out.len() > output_cap;
        out.truncate(output_cap);

        if is_binary(&out) {
            tracing::debug!(%codec, len = out.len(), "decompressed output is not text");
            return None;
        }

        Some(RecoveredText {
            codec,
            summary: summarize(&out, max_len),
            truncated,
        })
    })
}
