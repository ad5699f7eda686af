//! Reachability measurement through the tunnel.
//!
//! [`PingProbe`] runs the system `ping` and parses its text output. Parsing
//! is line based: every reply line contributes a `time=` (or `time<`) value
//! and the summary line, when present, provides the loss figure.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::CommandRunner;
use crate::error::SweepError;
use crate::settings::{default_probe_timeout, SweepSettings};

/// Round-trip statistics over the replies that arrived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RttStats {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

impl RttStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let min_ms = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_ms = samples.iter().sum::<f64>() / samples.len() as f64;
        Some(Self {
            min_ms,
            avg_ms,
            max_ms,
        })
    }
}

/// Raw result of one probe run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeMeasurement {
    pub sent: u32,
    pub received: u32,
    pub loss_percent: f64,
    pub rtt: Option<RttStats>,
    pub timed_out: bool,
}

impl ProbeMeasurement {
    /// Nothing came back.
    pub fn lost(sent: u32) -> Self {
        Self {
            sent,
            received: 0,
            loss_percent: 100.0,
            rtt: None,
            timed_out: false,
        }
    }

    /// Every packet answered with the same latency.
    pub fn constant(sent: u32, latency_ms: f64) -> Self {
        Self {
            sent,
            received: sent,
            loss_percent: 0.0,
            rtt: Some(RttStats {
                min_ms: latency_ms,
                avg_ms: latency_ms,
                max_ms: latency_ms,
            }),
            timed_out: false,
        }
    }
}

pub trait Probe {
    fn probe(&self, target: &str, count: u32) -> Result<ProbeMeasurement, SweepError>;
}

/// `ping -c <count> -W <wait> <target>`.
pub struct PingProbe<R> {
    runner: R,
    program: String,
    wait_secs: u32,
    timeout_override: Option<Duration>,
}

impl<R: CommandRunner> PingProbe<R> {
    pub fn new(runner: R, program: impl Into<String>, settings: &SweepSettings) -> Self {
        Self {
            runner,
            program: program.into(),
            wait_secs: settings.ping_wait_secs,
            timeout_override: settings.probe_timeout_secs.map(Duration::from_secs),
        }
    }

    fn timeout(&self, count: u32) -> Duration {
        self.timeout_override
            .unwrap_or_else(|| default_probe_timeout(count))
    }
}

impl<R: CommandRunner> Probe for PingProbe<R> {
    fn probe(&self, target: &str, count: u32) -> Result<ProbeMeasurement, SweepError> {
        let args = [
            "-c".to_string(),
            count.to_string(),
            "-W".to_string(),
            self.wait_secs.to_string(),
            target.to_string(),
        ];
        let output = self.runner.run(&self.program, &args, self.timeout(count))?;

        let mut measurement = parse_ping_output(&output.stdout, count);
        measurement.timed_out = output.timed_out;
        Ok(measurement)
    }
}

/// Parse `ping` output for `count` requests.
///
/// Without a summary line (killed on timeout, unusual ping builds) loss is
/// derived from the number of reply lines.
pub fn parse_ping_output(output: &str, count: u32) -> ProbeMeasurement {
    let mut samples = Vec::new();
    let mut summary = None;

    for line in output.lines() {
        let lower = line.to_ascii_lowercase();
        if let Some(time) = reply_time(&lower) {
            samples.push(time);
        } else if lower.contains("packets transmitted") || lower.contains("packet loss") {
            summary = parse_summary(&lower).or(summary);
        }
    }

    let (sent, received, loss_percent) = summary.unwrap_or_else(|| {
        let received = (samples.len() as u32).min(count);
        (count, received, loss_from_counts(count, received))
    });

    ProbeMeasurement {
        sent,
        received,
        loss_percent,
        rtt: RttStats::from_samples(&samples),
        timed_out: false,
    }
}

fn reply_time(line: &str) -> Option<f64> {
    let start = line
        .find("time=")
        .or_else(|| line.find("time<"))
        .map(|index| index + "time=".len())?;
    let value: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    value.parse().ok()
}

/// `5 packets transmitted, 4 received, 20% packet loss, time 4005ms`
fn parse_summary(line: &str) -> Option<(u32, u32, f64)> {
    let mut sent = None;
    let mut received = None;
    let mut loss = None;

    for part in line.split(',').map(str::trim) {
        let mut words = part.split_whitespace();
        let (Some(number), Some(label)) = (words.next(), words.next()) else {
            continue;
        };
        match label {
            "packets" if part.contains("transmitted") => sent = number.parse().ok(),
            "received" | "packets" => received = number.parse().ok(),
            "packet" if part.contains("loss") => {
                loss = number.trim_end_matches('%').parse::<f64>().ok()
            }
            _ => {}
        }
    }

    let sent = sent?;
    let received = received?;
    Some((sent, received, loss.unwrap_or_else(|| loss_from_counts(sent, received))))
}

fn loss_from_counts(sent: u32, received: u32) -> f64 {
    if sent == 0 {
        return 100.0;
    }
    f64::from(sent.saturating_sub(received)) / f64::from(sent) * 100.0
}
