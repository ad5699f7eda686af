//! Result export and analysis utilities.
//!
//! This module writes sweep reports to JSON and CSV, ranks working
//! combinations by latency, renders the console summary and writes the
//! recommended configuration for the best combination.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::parameters::{AwgParams, ParameterSet};
use crate::report::{SweepRecord, SweepReport};
use crate::runner::SweepPlan;
use crate::template::TunnelTemplate;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;
#[path = "export/summary.rs"]
mod summary;
#[path = "export/writer_utils.rs"]
mod writer_utils;

pub use writer_utils::ExportError;

/// Paths written by [`export_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub json: PathBuf,
    pub csv: Option<PathBuf>,
}

/// Export the full report (records, timestamps, interrupted flag) as JSON.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    report: &SweepReport,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(report, file)
}

/// Export records to CSV, one row per combination in enumeration order.
///
/// # Errors
///
/// Returns an error if there are no records, or if file creation or CSV
/// writing fails.
pub fn export_to_csv(
    records: &[SweepRecord],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(records)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(records, file)
}

/// Write `results_<timestamp>.json` and `.csv` into `<output_dir>/results`.
///
/// The CSV is skipped when the report has no records (a sweep interrupted
/// before its first combination).
pub fn export_results(
    report: &SweepReport,
    output_dir: impl AsRef<Path>,
    timestamp: DateTime<Local>,
) -> Result<ExportedFiles, Box<dyn std::error::Error>> {
    let dir = writer_utils::ensure_dir(output_dir.as_ref().join("results"))?;
    let stem = format!("results_{}", timestamp.format("%Y%m%d_%H%M%S"));

    let json = dir.join(format!("{stem}.json"));
    export_to_json(report, &json)?;

    let csv = if report.is_empty() {
        None
    } else {
        let path = dir.join(format!("{stem}.csv"));
        export_to_csv(&report.records, &path)?;
        Some(path)
    };

    Ok(ExportedFiles { json, csv })
}

/// Find the fastest successful record.
///
/// Ranking is by ascending mean latency; ties go to lower packet loss, then
/// to the earlier combination.
pub fn find_best_record(records: &[SweepRecord]) -> Option<&SweepRecord> {
    ranking::find_best_record_impl(records)
}

/// Successful records, fastest first.
pub fn ranked_records(records: &[SweepRecord]) -> Vec<&SweepRecord> {
    ranking::ranked_records_impl(records)
}

/// Human-readable summary with the `top` fastest combinations.
pub fn format_summary(report: &SweepReport, top: usize) -> String {
    summary::format_summary_impl(report, top)
}

/// Render every template of `plan` with the junk and padding values of
/// `best` into `<output_dir>/<template>_RECOMMENDED.conf`. Each template
/// keeps its own H1..H4.
pub fn write_recommended_configs(
    plan: &SweepPlan,
    best: &SweepRecord,
    output_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let dir = writer_utils::ensure_dir(output_dir.as_ref().to_path_buf())?;
    let mut written = Vec::new();

    for (template, sets) in plan.entries() {
        let params = recommended_params(template, sets, best);
        let path = dir.join(format!("{}_RECOMMENDED.conf", template.name()));
        crate::artifact::write_private(&path, &template.render(&params))?;
        written.push(path);
    }

    Ok(written)
}

/// The winning junk and padding values with the headers this template was
/// swept with; headers belong to the server behind each template.
fn recommended_params(
    template: &TunnelTemplate,
    sets: &[ParameterSet],
    best: &SweepRecord,
) -> AwgParams {
    if template.name() == best.template {
        return best.set.params;
    }
    let headers = sets
        .first()
        .map(|set| set.params)
        .unwrap_or(*template.base_params());
    best.set.params.with_headers_of(&headers)
}

#[cfg(test)]
mod tests;
