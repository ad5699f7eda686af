use std::io::BufWriter;

use crate::report::SweepReport;

pub(crate) fn export_to_json_impl(
    report: &SweepReport,
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}
