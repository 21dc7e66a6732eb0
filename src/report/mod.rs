//! Report generation for batch inspections
//!
//! - **JSON**: summary plus every record, machine-readable
//! - **CSV**: one row per object, spreadsheet-friendly
//!
//! # Usage
//!
//! ```ignore
//! use blobscope::report;
//!
//! // Picks the format from the extension
//! report::generate("report.json", &records)?;
//! report::generate("report.csv", &records)?;
//! ```

pub mod csv;
pub mod json;

use crate::error::Result;
use crate::inspector::InspectionRecord;
use serde::Serialize;
use std::path::Path;

/// Write a report in the format implied by the file extension (CSV default)
pub fn generate<P: AsRef<Path>>(path: P, records: &[InspectionRecord]) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, records),
        _ => csv::write(&mut file, records),
    }
}

/// Counts per classification family for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub media: usize,
    pub text: usize,
    /// Known containers and serialization archives
    pub known_binary: usize,
    /// Binary with a text preview recovered by decompression
    pub compressed: usize,
    /// Unrecognized binary, encrypted or not
    pub opaque: usize,
    pub likely_encrypted: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_records(records: &[InspectionRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            let Some(verdict) = &record.verdict else {
                summary.error += 1;
                continue;
            };

            let classification = verdict.classification();
            if classification.is_media() {
                summary.media += 1;
            } else if classification.is_text() {
                summary.text += 1;
            } else if classification.is_compressed() {
                summary.compressed += 1;
            } else if matches!(
                classification,
                crate::Classification::BinaryKnown | crate::Classification::BinaryArchive
            ) {
                summary.known_binary += 1;
            } else {
                summary.opaque += 1;
            }

            if verdict.likely_encrypted() {
                summary.likely_encrypted += 1;
            }
        }

        summary
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{ContentSample, Inspector};
    use std::path::PathBuf;

    // ==========================================================================
    // SUMMARY STATISTICS TESTS
    // ==========================================================================
    //
    // The Summary struct folds a batch into per-family counts. It heads the
    // JSON report and the CLI's closing summary.
    // ==========================================================================

    pub(crate) fn record_for(name: &str, data: &[u8], content_type: Option<&str>) -> InspectionRecord {
        let sample = ContentSample::new(data).with_content_type(content_type);
        InspectionRecord {
            path: format!("/store/{}", name),
            file_name: name.to_string(),
            verdict: Some(Inspector::new().inspect(&sample)),
            error: None,
        }
    }

    pub(crate) fn mixed_batch() -> Vec<InspectionRecord> {
        let random: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();

        vec![
            record_for("cat.png", b"whatever", Some("image/png")),
            record_for("notes.txt", b"hello, world", None),
            record_for("doc.json", br#"{"a": 1}"#, None),
            record_for("bundle.zip", &[0x50, 0x4B, 0x03, 0x04, 0x00, 0x00, 0xFF], None),
            record_for("blob.bin", &random, None),
            InspectionRecord::failed(&PathBuf::from("/store/gone.bin"), "No such file"),
        ]
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_records(&[]);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_summary_mixed() {
        let summary = Summary::from_records(&mixed_batch());

        assert_eq!(summary.total, 6);
        assert_eq!(summary.media, 1);
        assert_eq!(summary.text, 2);
        assert_eq!(summary.known_binary, 1);
        assert_eq!(summary.opaque, 1);
        assert_eq!(summary.compressed, 0);
        assert_eq!(summary.error, 1);
    }

    #[test]
    fn test_generate_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let records = mixed_batch();

        let json_path = dir.path().join("report.json");
        generate(&json_path, &records).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 6);

        let csv_path = dir.path().join("report.csv");
        generate(&csv_path, &records).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("path,file_name,"));
        assert_eq!(csv.lines().count(), 7);
    }
}
