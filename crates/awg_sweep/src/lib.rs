//! Parameter sweep framework for AmneziaWG obfuscation settings.
//!
//! This crate renders a tunnel configuration template once per combination of
//! obfuscation parameters, brings the tunnel up with the external activation
//! tool, measures reachability with `ping`, tears the tunnel down again and
//! ranks the working combinations by latency.
//!
//! # Quick Start
//!
//! ```no_run
//! use awg_sweep::{
//!     ArtifactSlot, AwgQuick, ParameterSpace, PingProbe, SweepPlan, SweepRunner,
//!     SweepSettings, SystemCommandRunner, Toolchain, TunnelTemplate,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SweepSettings::default();
//! let template = TunnelTemplate::load("conf/client.conf")?;
//!
//! // Define parameter space (grid search)
//! let space = ParameterSpace::grid()
//!     .jc(vec![0, 3, 5])
//!     .jmin(vec![40])
//!     .jmax(vec![70, 100])
//!     .with_base(*template.base_params());
//! let plan = SweepPlan::single(template, space.generate());
//!
//! let toolchain = Toolchain::detect()?;
//! let tunnel = AwgQuick::new(SystemCommandRunner, &toolchain, &settings);
//! let probe = PingProbe::new(SystemCommandRunner, "ping", &settings);
//! let mut artifact = ArtifactSlot::new(toolchain.default_artifact_path(&settings.interface));
//!
//! let report = SweepRunner::new(&tunnel, &probe, &settings).run(&plan, &mut artifact)?;
//! if let Some(best) = report.best() {
//!     println!("best: {}", best.set.params.short_name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: Parameter space definition (grid search, random sampling)
//! - [`template`]: Tunnel configuration templates and rendering
//! - [`artifact`]: The on-disk configuration under test
//! - [`command`]: Bounded execution of external tools
//! - [`tunnel`]: Activation/deactivation and the RAII tunnel guard
//! - [`probe`]: Reachability measurement and ping output parsing
//! - [`preflight`]: Tool detection and privilege checks
//! - [`runner`]: The sequential sweep loop
//! - [`report`]: Per-combination results and the sweep report
//! - [`export`]: JSON/CSV export, ranking and summaries

pub mod artifact;
pub mod command;
pub mod error;
pub mod export;
pub mod parameter_spaces;
pub mod parameters;
pub mod preflight;
pub mod probe;
pub mod report;
pub mod runner;
pub mod settings;
pub mod signal;
pub mod template;
pub mod tunnel;

pub use artifact::ArtifactSlot;
pub use command::{CommandError, CommandOutput, CommandRunner, SystemCommandRunner};
pub use error::SweepError;
pub use export::{export_to_csv, export_to_json, find_best_record, ranked_records};
pub use parameters::{AwgParams, ParamField, ParameterSet, ParameterSpace};
pub use preflight::{ToolFlavor, Toolchain};
pub use probe::{PingProbe, Probe, ProbeMeasurement, RttStats};
pub use report::{FailureReason, ProbeResult, SweepRecord, SweepReport};
pub use runner::{SweepPlan, SweepRunner};
pub use settings::SweepSettings;
pub use signal::{NeverShutdown, ShutdownCheck, ShutdownFlag};
pub use template::TunnelTemplate;
pub use tunnel::{Activation, AwgQuick, Teardown, TunnelControl, TunnelGuard};
