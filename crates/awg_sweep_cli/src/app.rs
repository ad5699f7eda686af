//! Orchestration: settings, templates, preflight, sweep, export.

use std::path::{Path, PathBuf};

use awg_sweep::artifact::generate_variations;
use awg_sweep::export::{export_results, format_summary, write_recommended_configs};
use awg_sweep::preflight::{ensure_privileged, require_tool};
use awg_sweep::settings::SettingsError;
use awg_sweep::{
    ArtifactSlot, AwgQuick, PingProbe, ShutdownFlag, SweepError, SweepPlan, SweepReport,
    SweepRunner, SweepSettings, SystemCommandRunner, Teardown, Toolchain, TunnelControl,
    TunnelTemplate,
};
use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::{check_artifact_path, Cli, CliError};

/// Errors that end the program before or instead of a report.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidArgument(#[from] CliError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("cannot export results: {0}")]
    Export(Box<dyn std::error::Error>),
}

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Ctrl+C stopped the sweep; partial results were exported.
    Interrupted,
    Generated,
}

pub fn run(cli: &Cli) -> Result<Outcome, AppError> {
    cli.validate()?;
    let settings = load_settings(cli)?;
    let templates = load_templates(&cli.config)?;
    let plan = build_plan(cli, &settings, templates);

    if cli.generate_only {
        let dir = cli.output_dir.join("generated");
        let written = generate_variations(&plan, &dir)?;
        println!("Generated {} configurations in {}", written.len(), dir.display());
        return Ok(Outcome::Generated);
    }

    let toolchain = preflight(&settings)?;
    let ping = require_tool("ping")?;

    let artifact_path = match &cli.artifact_path {
        Some(path) => {
            check_artifact_path(path, &settings.interface)?;
            path.clone()
        }
        None => toolchain.default_artifact_path(&settings.interface),
    };

    let mut tunnel = AwgQuick::new(SystemCommandRunner, &toolchain, &settings);
    if cli.artifact_path.is_some() {
        tunnel = tunnel.with_config_path(&artifact_path);
    }
    let probe = PingProbe::new(SystemCommandRunner, ping.display().to_string(), &settings);

    bring_down_leftover(&tunnel)?;

    let shutdown = ShutdownFlag::install();
    let mut artifact = ArtifactSlot::new(artifact_path);
    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .with_shutdown(&shutdown)
        .run(&plan, &mut artifact)?;

    publish(&report, &plan, &settings, &cli.output_dir)?;

    Ok(if report.interrupted {
        Outcome::Interrupted
    } else {
        Outcome::Completed
    })
}

/// Defaults, then the `--settings` file, then command-line flags.
pub fn load_settings(cli: &Cli) -> Result<SweepSettings, AppError> {
    let base = match &cli.settings {
        Some(path) => SweepSettings::load(path)?,
        None => SweepSettings::default(),
    };
    let settings = cli.apply(base);
    settings.validate()?;
    Ok(settings)
}

pub fn load_templates(path: &Path) -> Result<Vec<TunnelTemplate>, AppError> {
    let templates = TunnelTemplate::load_all(path).map_err(SweepError::from)?;
    if templates.is_empty() {
        return Err(SweepError::NoTemplates(path.to_path_buf()).into());
    }
    info!(
        count = templates.len(),
        names = %templates.iter().map(TunnelTemplate::name).collect::<Vec<_>>().join(","),
        "loaded templates"
    );
    for template in &templates {
        info!(
            template = template.name(),
            endpoint = template.endpoint().unwrap_or("-"),
            "template peer"
        );
    }
    Ok(templates)
}

/// One entry per template, each with its own base values.
pub fn build_plan(cli: &Cli, settings: &SweepSettings, templates: Vec<TunnelTemplate>) -> SweepPlan {
    let mut plan = SweepPlan::new();
    for template in templates {
        let space = cli.parameter_space(*template.base_params(), settings.skip_invalid_jitter);
        let sets = match cli.sample {
            Some(count) => space.sample_random(count, cli.seed),
            None => space.generate(),
        };
        plan.push(template, sets);
    }
    plan
}

fn preflight(settings: &SweepSettings) -> Result<Toolchain, SweepError> {
    let toolchain = Toolchain::detect()?;
    toolchain.validate(settings)?;
    ensure_privileged()?;
    info!(
        flavor = ?toolchain.flavor,
        activation = %toolchain.activation.display(),
        "preflight passed"
    );
    Ok(toolchain)
}

/// A previous run that was killed may have left the test interface up.
fn bring_down_leftover(tunnel: &dyn TunnelControl) -> Result<(), SweepError> {
    match tunnel.down()? {
        Teardown::Down => info!("removed leftover test interface"),
        Teardown::AlreadyDown => {}
        Teardown::Failed(reason) => debug!(%reason, "no leftover interface removed"),
    }
    Ok(())
}

fn publish(
    report: &SweepReport,
    plan: &SweepPlan,
    settings: &SweepSettings,
    output_dir: &Path,
) -> Result<(), AppError> {
    let files = export_results(report, output_dir, Local::now()).map_err(AppError::Export)?;

    println!("{}", format_summary(report, settings.top_results));
    println!("Results: {}", files.json.display());
    if let Some(csv) = &files.csv {
        println!("         {}", csv.display());
    }

    if let Some(best) = report.best() {
        let written: Vec<PathBuf> =
            write_recommended_configs(plan, best, output_dir).map_err(AppError::Export)?;
        for path in written {
            println!("Recommended: {}", path.display());
        }
    }
    Ok(())
}
