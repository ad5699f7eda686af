use std::cmp::Ordering;

use crate::report::SweepRecord;

/// Ascending mean latency, then lower loss, then enumeration order.
fn compare_records(a: &SweepRecord, b: &SweepRecord) -> Ordering {
    let latency = |record: &SweepRecord| record.result.avg_latency_ms().unwrap_or(f64::INFINITY);
    latency(a)
        .total_cmp(&latency(b))
        .then_with(|| {
            a.result
                .packet_loss_percent
                .total_cmp(&b.result.packet_loss_percent)
        })
        .then_with(|| a.set.index.cmp(&b.set.index))
}

pub(crate) fn ranked_records_impl(records: &[SweepRecord]) -> Vec<&SweepRecord> {
    let mut ranked: Vec<&SweepRecord> = records
        .iter()
        .filter(|record| record.result.success)
        .collect();
    ranked.sort_by(|a, b| compare_records(a, b));
    ranked
}

pub(crate) fn find_best_record_impl(records: &[SweepRecord]) -> Option<&SweepRecord> {
    records
        .iter()
        .filter(|record| record.result.success)
        .min_by(|a, b| compare_records(a, b))
}
