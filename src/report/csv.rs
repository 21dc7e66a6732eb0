//! CSV report, one row per inspected object

use crate::error::Result;
use crate::inspector::InspectionRecord;
use std::io::Write;

const HEADER: &[&str] = &[
    "path",
    "file_name",
    "size_bytes",
    "mime_type",
    "format",
    "classification",
    "likely_encrypted",
    "entropy_bits_per_byte",
    "compression_ratio",
    "recovered_with",
    "sha256",
    "reason",
    "error",
];

pub fn write<W: Write>(writer: &mut W, records: &[InspectionRecord]) -> Result<()> {
    writeln!(writer, "{}", HEADER.join(","))?;

    for record in records {
        let row: Vec<String> = match &record.verdict {
            Some(v) => {
                let guess = &v.encryption_guess;
                vec![
                    record.path.clone(),
                    record.file_name.clone(),
                    v.size_bytes.to_string(),
                    v.mime_type.clone().unwrap_or_default(),
                    v.format.as_ref().map(|f| f.to_string()).unwrap_or_default(),
                    guess.classification.to_string(),
                    guess.likely_encrypted.to_string(),
                    guess.entropy_bits_per_byte.map(|e| format!("{:.4}", e)).unwrap_or_default(),
                    guess.compression_ratio.map(|r| format!("{:.4}", r)).unwrap_or_default(),
                    v.recovered_with.map(|c| c.to_string()).unwrap_or_default(),
                    v.hashes.sha256.clone(),
                    guess.reason.clone(),
                    String::new(),
                ]
            }
            None => {
                let mut row = vec![String::new(); HEADER.len()];
                row[0] = record.path.clone();
                row[1] = record.file_name.clone();
                row[HEADER.len() - 1] = record.error.clone().unwrap_or_default();
                row
            }
        };

        let escaped: Vec<String> = row.iter().map(|f| escape(f)).collect();
        writeln!(writer, "{}", escaped.join(","))?;
    }

    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
