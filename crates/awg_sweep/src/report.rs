//! Per-combination results and the sweep report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::parameters::ParameterSet;
use crate::probe::{ProbeMeasurement, RttStats};

/// Why a combination did not count as working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The activation tool refused the configuration or timed out.
    ActivationFailed,
    /// The interface came up but no handshake was observed.
    NoHandshake,
    ProbeTimeout,
    /// Some replies arrived, but loss exceeded the threshold.
    PacketLoss,
    /// No reply at all.
    Unreachable,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::ActivationFailed => "activation_failed",
            FailureReason::NoHandshake => "no_handshake",
            FailureReason::ProbeTimeout => "probe_timeout",
            FailureReason::PacketLoss => "packet_loss",
            FailureReason::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of testing one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub success: bool,
    pub activated: bool,
    /// `None` when the handshake was not checked.
    pub handshake: Option<bool>,
    pub packets_sent: u32,
    pub packets_received: u32,
    pub packet_loss_percent: f64,
    pub rtt: Option<RttStats>,
    pub failure: Option<FailureReason>,
    /// Diagnostic from the activation tool, if any.
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn activation_failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            activated: false,
            handshake: None,
            packets_sent: 0,
            packets_received: 0,
            packet_loss_percent: 100.0,
            rtt: None,
            failure: Some(FailureReason::ActivationFailed),
            error: Some(error.into()),
        }
    }

    pub fn no_handshake() -> Self {
        Self {
            activated: true,
            handshake: Some(false),
            failure: Some(FailureReason::NoHandshake),
            error: None,
            ..Self::activation_failed("")
        }
    }

    /// Classify a probe measurement. Success needs at least one reply, no
    /// timeout and loss not above `max_loss_percent`.
    pub fn from_measurement(
        measurement: &ProbeMeasurement,
        handshake: Option<bool>,
        max_loss_percent: f64,
    ) -> Self {
        let failure = if measurement.timed_out {
            Some(FailureReason::ProbeTimeout)
        } else if measurement.received == 0 {
            Some(FailureReason::Unreachable)
        } else if measurement.loss_percent > max_loss_percent {
            Some(FailureReason::PacketLoss)
        } else {
            None
        };

        Self {
            success: failure.is_none(),
            activated: true,
            handshake,
            packets_sent: measurement.sent,
            packets_received: measurement.received,
            packet_loss_percent: measurement.loss_percent,
            rtt: measurement.rtt,
            failure,
            error: None,
        }
    }

    pub fn avg_latency_ms(&self) -> Option<f64> {
        self.rtt.map(|rtt| rtt.avg_ms)
    }
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    pub template: String,
    pub set: ParameterSet,
    pub result: ProbeResult,
    pub timestamp: DateTime<Local>,
}

/// All records of a sweep, in enumeration order.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub records: Vec<SweepRecord>,
    pub interrupted: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl Default for SweepReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepReport {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            interrupted: false,
            started_at: Local::now(),
            finished_at: None,
        }
    }

    pub fn push(&mut self, record: SweepRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn successful(&self) -> impl Iterator<Item = &SweepRecord> {
        self.records.iter().filter(|record| record.result.success)
    }

    pub fn success_count(&self) -> usize {
        self.successful().count()
    }

    /// Successful records, fastest first.
    pub fn ranked(&self) -> Vec<&SweepRecord> {
        crate::export::ranked_records(&self.records)
    }

    /// The fastest successful record, `None` when nothing worked.
    pub fn best(&self) -> Option<&SweepRecord> {
        crate::export::find_best_record(&self.records)
    }

    /// Number of failed records per reason.
    pub fn failure_breakdown(&self) -> BTreeMap<FailureReason, usize> {
        let mut breakdown = BTreeMap::new();
        for reason in self.records.iter().filter_map(|record| record.result.failure) {
            *breakdown.entry(reason).or_insert(0) += 1;
        }
        breakdown
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }
}
