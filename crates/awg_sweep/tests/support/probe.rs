#![allow(dead_code)]

use std::cell::Cell;

use awg_sweep::{Probe, ProbeMeasurement, ShutdownFlag, SweepError};

use super::EventLog;

/// What the stub reports for every probe.
#[derive(Debug, Clone, Copy)]
pub enum ProbeBehaviour {
    /// All packets answered with this latency.
    Latency(f64),
    /// Latency that grows with each call: base + step * call.
    Increasing { base: f64, step: f64 },
    TotalLoss,
    Timeout,
}

pub struct StubProbe {
    log: EventLog,
    calls: Cell<usize>,
    pub behaviour: ProbeBehaviour,
    /// Zero-based call that fails fatally.
    pub fatal_at: Option<usize>,
    /// Trigger this flag during the given call, like Ctrl+C mid-probe.
    pub interrupt_at: Option<(usize, ShutdownFlag)>,
}

impl StubProbe {
    pub fn new(log: EventLog, behaviour: ProbeBehaviour) -> Self {
        Self {
            log,
            calls: Cell::new(0),
            behaviour,
            fatal_at: None,
            interrupt_at: None,
        }
    }
}

impl Probe for StubProbe {
    fn probe(&self, target: &str, count: u32) -> Result<ProbeMeasurement, SweepError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.log.borrow_mut().push(format!("probe {target} x{count}"));

        if let Some((at, flag)) = &self.interrupt_at {
            if *at == call {
                flag.trigger();
            }
        }
        if self.fatal_at == Some(call) {
            return Err(SweepError::ToolMissing("ping".to_string()));
        }

        Ok(match self.behaviour {
            ProbeBehaviour::Latency(latency_ms) => ProbeMeasurement::constant(count, latency_ms),
            ProbeBehaviour::Increasing { base, step } => {
                ProbeMeasurement::constant(count, base + step * call as f64)
            }
            ProbeBehaviour::TotalLoss => ProbeMeasurement::lost(count),
            ProbeBehaviour::Timeout => ProbeMeasurement {
                timed_out: true,
                ..ProbeMeasurement::lost(count)
            },
        })
    }
}
