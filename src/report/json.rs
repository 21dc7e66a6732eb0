//! JSON report: generation time, batch summary and every record

use super::Summary;
use crate::error::Result;
use crate::inspector::InspectionRecord;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    summary: Summary,
    objects: &'a [InspectionRecord],
}

pub fn write<W: Write>(writer: &mut W, records: &[InspectionRecord]) -> Result<()> {
    let report = JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_records(records),
        objects: records,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}
