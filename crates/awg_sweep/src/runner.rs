//! The sequential sweep loop.
//!
//! Each combination goes through render, activate, probe and deactivate
//! before the next one starts. Only one tunnel exists at a time, so there is
//! no parallelism here.

use std::thread;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::artifact::ArtifactSlot;
use crate::error::SweepError;
use crate::parameters::ParameterSet;
use crate::probe::Probe;
use crate::report::{ProbeResult, SweepRecord, SweepReport};
use crate::settings::SweepSettings;
use crate::signal::{NeverShutdown, ShutdownCheck};
use crate::template::TunnelTemplate;
use crate::tunnel::{Activation, TunnelControl, TunnelGuard};

/// Templates and the parameter sets to try with each of them.
#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    entries: Vec<(TunnelTemplate, Vec<ParameterSet>)>,
}

impl SweepPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(template: TunnelTemplate, sets: Vec<ParameterSet>) -> Self {
        let mut plan = Self::new();
        plan.push(template, sets);
        plan
    }

    pub fn push(&mut self, template: TunnelTemplate, sets: Vec<ParameterSet>) {
        self.entries.push((template, sets));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&TunnelTemplate, &[ParameterSet])> {
        self.entries
            .iter()
            .map(|(template, sets)| (template, sets.as_slice()))
    }

    /// Number of combinations across all templates.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, sets)| sets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub struct SweepRunner<'a> {
    tunnel: &'a dyn TunnelControl,
    probe: &'a dyn Probe,
    shutdown: &'a dyn ShutdownCheck,
    settings: &'a SweepSettings,
}

impl<'a> SweepRunner<'a> {
    pub fn new(
        tunnel: &'a dyn TunnelControl,
        probe: &'a dyn Probe,
        settings: &'a SweepSettings,
    ) -> Self {
        Self {
            tunnel,
            probe,
            shutdown: &NeverShutdown,
            settings,
        }
    }

    /// Stop between combinations once `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: &'a dyn ShutdownCheck) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run every combination of `plan` in order.
    ///
    /// Per-combination failures end up in the report. An error means the
    /// sweep itself could not continue (missing tool, unwritable artifact);
    /// the tunnel of the interrupted iteration is still brought down.
    pub fn run(
        &self,
        plan: &SweepPlan,
        artifact: &mut ArtifactSlot,
    ) -> Result<SweepReport, SweepError> {
        let total = plan.total();
        let mut report = SweepReport::new();
        let progress = self.progress_bar(total);

        info!(
            combinations = total,
            interface = %self.settings.interface,
            target = %self.settings.ping_target,
            "starting sweep"
        );

        'sweep: for (template, sets) in plan.entries() {
            for set in sets {
                if self.shutdown.should_stop() {
                    warn!(completed = report.len(), total, "sweep interrupted");
                    report.mark_interrupted();
                    break 'sweep;
                }

                progress.set_message(format!("{} {}", template.name(), set.params.short_name()));
                let result = self.measure(template, set, artifact)?;
                log_result(template, set, &result);

                report.push(SweepRecord {
                    template: template.name().to_string(),
                    set: set.clone(),
                    result,
                    timestamp: Local::now(),
                });
                progress.inc(1);

                if report.len() < total && !self.shutdown.should_stop() {
                    pause(self.settings.cooldown());
                }
            }
        }

        progress.finish_and_clear();
        artifact.remove();
        report.finish();

        info!(
            tested = report.len(),
            successful = report.success_count(),
            "sweep finished"
        );
        Ok(report)
    }

    fn measure(
        &self,
        template: &TunnelTemplate,
        set: &ParameterSet,
        artifact: &mut ArtifactSlot,
    ) -> Result<ProbeResult, SweepError> {
        artifact.write(&template.render(&set.params))?;

        let mut guard = TunnelGuard::new(self.tunnel);
        let result = match guard.activate()? {
            Activation::Failed(reason) => ProbeResult::activation_failed(reason),
            Activation::Up => {
                pause(self.settings.settle_delay());
                let handshake = if self.settings.check_handshake {
                    Some(guard.handshake_established()?)
                } else {
                    None
                };

                if handshake == Some(false) {
                    ProbeResult::no_handshake()
                } else {
                    let measurement = self
                        .probe
                        .probe(&self.settings.ping_target, self.settings.ping_count)?;
                    ProbeResult::from_measurement(
                        &measurement,
                        handshake,
                        self.settings.max_packet_loss_percent,
                    )
                }
            }
        };
        guard.release();

        Ok(result)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

fn log_result(template: &TunnelTemplate, set: &ParameterSet, result: &ProbeResult) {
    match (result.failure, result.avg_latency_ms()) {
        (None, Some(latency_ms)) => info!(
            template = template.name(),
            id = %set.combination_id,
            params = %set.params.short_name(),
            latency_ms,
            loss = result.packet_loss_percent,
            "combination works"
        ),
        (failure, _) => info!(
            template = template.name(),
            id = %set.combination_id,
            params = %set.params.short_name(),
            reason = %failure.map(|reason| reason.as_str()).unwrap_or("unknown"),
            error = result.error.as_deref().unwrap_or(""),
            "combination failed"
        ),
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
