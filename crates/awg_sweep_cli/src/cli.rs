//! Command-line arguments for `awg-sweep`.
//!
//! Flags override values loaded from `--settings`, which in turn override the
//! built-in defaults of [`SweepSettings`].

use std::path::{Path, PathBuf};

use awg_sweep::parameter_spaces;
use awg_sweep::parameters::{parse_value_list, ValueListError};
use awg_sweep::{AwgParams, ParamField, ParameterSpace, SweepSettings};
use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

/// Default template location (file or directory of `*.conf`).
pub const DEFAULT_CONFIG: &str = "conf";

/// Default directory for results, generated and recommended configs.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default seed for `--sample`.
pub const DEFAULT_SEED: u64 = 42;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("max-loss must be between 0 and 100, got {0}")]
    InvalidMaxLoss(f64),

    #[error("ping-count must be at least 1")]
    ZeroPingCount,

    #[error("sample must be at least 1")]
    ZeroSample,

    #[error("{flag} must be a non-negative number of seconds, got {value}")]
    InvalidDelay { flag: &'static str, value: f64 },

    #[error("artifact path {} must be named after the interface ({interface}.conf)", path.display())]
    ArtifactName { path: PathBuf, interface: String },
}

/// Candidate values for one parameter, parsed from `0,3,5` or `10:30:10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueList(pub Vec<u32>);

fn value_list(input: &str) -> Result<ValueList, ValueListError> {
    parse_value_list(input).map(ValueList)
}

/// Built-in parameter spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Broad grid over junk and padding (96 combinations)
    Default,
    /// Two combinations, for a quick smoke test
    Minimal,
    /// Junk packet count and size only
    Junk,
    /// Init/response padding only
    Padding,
}

impl Preset {
    pub fn space(self) -> ParameterSpace {
        match self {
            Preset::Default => parameter_spaces::default_space(),
            Preset::Minimal => parameter_spaces::minimal_space(),
            Preset::Junk => parameter_spaces::junk_focused_space(),
            Preset::Padding => parameter_spaces::padding_focused_space(),
        }
    }
}

/// Sweep AmneziaWG obfuscation parameters and rank the working combinations by latency.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "awg-sweep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Template file, or a directory of `*.conf` templates.
    #[arg(short, long, default_value = DEFAULT_CONFIG, env = "AWG_SWEEP_CONFIG")]
    pub config: PathBuf,

    /// Output directory for results and generated configurations.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "AWG_SWEEP_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// JSON settings file. Flags given on the command line win.
    #[arg(long, env = "AWG_SWEEP_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Built-in parameter space; explicit value lists replace its entries.
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// Junk packet counts, e.g. `0,3,5` or `0:10:5`.
    #[arg(long, value_parser = value_list)]
    pub jc: Option<ValueList>,

    /// Minimum junk packet sizes.
    #[arg(long, value_parser = value_list)]
    pub jmin: Option<ValueList>,

    /// Maximum junk packet sizes.
    #[arg(long, value_parser = value_list)]
    pub jmax: Option<ValueList>,

    /// Init packet padding sizes.
    #[arg(long, value_parser = value_list)]
    pub s1: Option<ValueList>,

    /// Response packet padding sizes.
    #[arg(long, value_parser = value_list)]
    pub s2: Option<ValueList>,

    /// Fixed H1 header (default: template value, else 1).
    #[arg(long)]
    pub h1: Option<u32>,

    #[arg(long)]
    pub h2: Option<u32>,

    #[arg(long)]
    pub h3: Option<u32>,

    #[arg(long)]
    pub h4: Option<u32>,

    /// Host to ping through the tunnel.
    #[arg(long, env = "AWG_SWEEP_PING_TARGET")]
    pub ping_target: Option<String>,

    #[arg(long)]
    pub ping_count: Option<u32>,

    /// Highest packet loss (percent) that still counts as working.
    #[arg(long)]
    pub max_loss: Option<f64>,

    /// Interface name used for the test tunnel.
    #[arg(long, env = "AWG_SWEEP_INTERFACE")]
    pub interface: Option<String>,

    /// Where to write the configuration under test. Its file name must be
    /// `<interface>.conf`.
    #[arg(long)]
    pub artifact_path: Option<PathBuf>,

    /// Seconds to wait for `up`.
    #[arg(long)]
    pub up_timeout: Option<u64>,

    /// Seconds to wait for `down`.
    #[arg(long)]
    pub down_timeout: Option<u64>,

    /// Seconds to wait for the probe (default: count * 3 + 10).
    #[arg(long)]
    pub probe_timeout: Option<u64>,

    /// Seconds between activation and probing.
    #[arg(long)]
    pub settle: Option<f64>,

    /// Seconds between combinations.
    #[arg(long)]
    pub cooldown: Option<f64>,

    /// Probe even when no handshake was observed.
    #[arg(long)]
    pub no_handshake_check: bool,

    /// Skip combinations with Jmax <= Jmin.
    #[arg(long)]
    pub skip_invalid_jitter: bool,

    /// Test N random combinations instead of the full grid.
    #[arg(long)]
    pub sample: Option<usize>,

    /// Seed for `--sample`.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Only write the configurations to `<output>/generated`.
    #[arg(long)]
    pub generate_only: bool,

    /// Continue with activation tools that reject obfuscation fields.
    #[arg(long)]
    pub force: bool,

    /// Number of ranked combinations in the summary.
    #[arg(long)]
    pub top: Option<usize>,

    #[arg(long)]
    pub no_progress: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(loss) = self.max_loss {
            if !(0.0..=100.0).contains(&loss) {
                return Err(CliError::InvalidMaxLoss(loss));
            }
        }
        if self.ping_count == Some(0) {
            return Err(CliError::ZeroPingCount);
        }
        if self.sample == Some(0) {
            return Err(CliError::ZeroSample);
        }
        for (flag, value) in [("settle", self.settle), ("cooldown", self.cooldown)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(CliError::InvalidDelay { flag, value });
                }
            }
        }
        Ok(())
    }

    /// Apply command-line overrides on top of `settings`.
    pub fn apply(&self, mut settings: SweepSettings) -> SweepSettings {
        if let Some(interface) = &self.interface {
            settings.interface = interface.clone();
        }
        if let Some(target) = &self.ping_target {
            settings.ping_target = target.clone();
        }
        if let Some(count) = self.ping_count {
            settings.ping_count = count;
        }
        if let Some(loss) = self.max_loss {
            settings.max_packet_loss_percent = loss;
        }
        if let Some(secs) = self.up_timeout {
            settings.up_timeout_secs = secs;
        }
        if let Some(secs) = self.down_timeout {
            settings.down_timeout_secs = secs;
        }
        if self.probe_timeout.is_some() {
            settings.probe_timeout_secs = self.probe_timeout;
        }
        if let Some(secs) = self.settle {
            settings.settle_ms = secs_to_ms(secs);
        }
        if let Some(secs) = self.cooldown {
            settings.cooldown_ms = secs_to_ms(secs);
        }
        if let Some(top) = self.top {
            settings.top_results = top;
        }
        settings.check_handshake &= !self.no_handshake_check;
        settings.skip_invalid_jitter |= self.skip_invalid_jitter;
        settings.force |= self.force;
        settings.show_progress &= !self.no_progress;
        settings
    }

    /// Parameter space for one template whose own values are `base`.
    pub fn parameter_space(&self, base: AwgParams, skip_invalid_jitter: bool) -> ParameterSpace {
        let mut space = self.preset.space().with_base(base);

        let lists = [
            (ParamField::Jc, &self.jc),
            (ParamField::Jmin, &self.jmin),
            (ParamField::Jmax, &self.jmax),
            (ParamField::S1, &self.s1),
            (ParamField::S2, &self.s2),
        ];
        for (field, list) in lists {
            if let Some(ValueList(values)) = list {
                space = space.field(field, values.clone());
            }
        }

        let headers = [
            (ParamField::H1, self.h1),
            (ParamField::H2, self.h2),
            (ParamField::H3, self.h3),
            (ParamField::H4, self.h4),
        ];
        for (field, value) in headers {
            if let Some(value) = value {
                space = space.field(field, vec![value]);
            }
        }

        if skip_invalid_jitter {
            space = space.require_jmax_above_jmin(true);
        }
        space
    }
}

/// `awg-quick` derives the interface name from the file stem, so an
/// overridden artifact path has to match the interface.
pub fn check_artifact_path(path: &Path, interface: &str) -> Result<(), CliError> {
    let stem_matches = path.file_stem().and_then(|stem| stem.to_str()) == Some(interface);
    let is_conf = path.extension().and_then(|ext| ext.to_str()) == Some("conf");
    if stem_matches && is_conf {
        Ok(())
    } else {
        Err(CliError::ArtifactName {
            path: path.to_path_buf(),
            interface: interface.to_string(),
        })
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round() as u64
}
