use std::fmt::Write;

use crate::report::SweepReport;

const RULE: &str = "============================================================";

pub(crate) fn format_summary_impl(report: &SweepReport, top: usize) -> String {
    let mut out = String::new();
    let tested = report.len();
    let successful = report.success_count();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "SWEEP SUMMARY");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Tested:      {tested}");
    let _ = writeln!(out, "Successful:  {successful}");
    let _ = writeln!(out, "Failed:      {}", tested - successful);
    for (reason, count) in report.failure_breakdown() {
        let _ = writeln!(out, "  {reason}: {count}");
    }
    if report.interrupted {
        let _ = writeln!(out, "Interrupted: yes, results are partial");
    }

    let ranked = report.ranked();
    let Some(best) = ranked.first() else {
        let _ = writeln!(out);
        let _ = writeln!(out, "Result: no successful combination found.");
        return out;
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "TOP {} (by average latency)", ranked.len().min(top));
    let _ = writeln!(
        out,
        "{:<5} {:<5} {:<6} {:<6} {:<5} {:<5} {:<10} {:<8} {}",
        "#", "Jc", "Jmin", "Jmax", "S1", "S2", "Avg ms", "Loss %", "Template"
    );
    for (rank, record) in ranked.iter().take(top).enumerate() {
        let params = &record.set.params;
        let _ = writeln!(
            out,
            "{:<5} {:<5} {:<6} {:<6} {:<5} {:<5} {:<10.1} {:<8.1} {}",
            rank + 1,
            params.jc,
            params.jmin,
            params.jmax,
            params.s1,
            params.s2,
            record.result.avg_latency_ms().unwrap_or_default(),
            record.result.packet_loss_percent,
            record.template
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Best: {} {} ({:.1} ms)",
        best.template,
        best.set.params.short_name(),
        best.result.avg_latency_ms().unwrap_or_default()
    );
    for line in best.set.params.config_lines() {
        let _ = writeln!(out, "  {line}");
    }

    out
}
