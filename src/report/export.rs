//! JSON export of a period report.

use crate::error::ExportError;
use crate::report::SalesReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub fn write_report_json(path: &Path, report: &SalesReport) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), period = %report.period, "report exported as JSON");
    Ok(())
}
