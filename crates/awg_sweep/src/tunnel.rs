//! Bringing the tunnel up and down.
//!
//! [`TunnelControl`] is the seam between the sweep loop and the activation
//! tool; [`AwgQuick`] drives `awg-quick` and `awg show`. A [`TunnelGuard`]
//! makes sure every activation attempt is followed by a teardown, whichever
//! way the iteration ends.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::command::{CommandOutput, CommandRunner};
use crate::error::SweepError;
use crate::preflight::Toolchain;
use crate::settings::SweepSettings;

/// Outcome of `up`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Up,
    /// The tool refused or timed out; the reason is kept for the report.
    Failed(String),
}

/// Outcome of `down`. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    Down,
    AlreadyDown,
    Failed(String),
}

/// Activation, deactivation and handshake inspection of one interface.
///
/// Errors are reserved for conditions that end the whole sweep (missing tool,
/// unsupported tool); a refused activation is an [`Activation::Failed`].
pub trait TunnelControl {
    fn up(&self) -> Result<Activation, SweepError>;
    fn down(&self) -> Result<Teardown, SweepError>;
    fn handshake_established(&self) -> Result<bool, SweepError>;
}

/// `awg-quick` / `awg` backed [`TunnelControl`].
pub struct AwgQuick<R> {
    runner: R,
    activation: String,
    show: Option<String>,
    /// Interface name, or the artifact path when it lives outside the
    /// tool's configuration directory.
    target: String,
    interface: String,
    settings: SweepSettings,
}

impl<R: CommandRunner> AwgQuick<R> {
    pub fn new(runner: R, toolchain: &Toolchain, settings: &SweepSettings) -> Self {
        Self {
            runner,
            activation: toolchain.activation.display().to_string(),
            show: toolchain
                .show
                .as_ref()
                .map(|path| path.display().to_string()),
            target: settings.interface.clone(),
            interface: settings.interface.clone(),
            settings: settings.clone(),
        }
    }

    /// Pass the configuration path to the tool instead of the interface
    /// name. The file stem must equal the interface name.
    pub fn with_config_path(mut self, path: &Path) -> Self {
        self.target = path.display().to_string();
        self
    }

    fn run_activation(&self, action: &str, timeout: Duration) -> Result<CommandOutput, SweepError> {
        let args = [action.to_string(), self.target.clone()];
        Ok(self.runner.run(&self.activation, &args, timeout)?)
    }
}

impl<R: CommandRunner> TunnelControl for AwgQuick<R> {
    fn up(&self) -> Result<Activation, SweepError> {
        let output = self.run_activation("up", self.settings.up_timeout())?;
        if output.success() {
            return Ok(Activation::Up);
        }

        if is_unsupported_field_error(&output.combined()) {
            if !self.settings.force {
                return Err(SweepError::UnsupportedTool {
                    tool: self.activation.clone(),
                });
            }
            warn!(tool = %self.activation, "activation tool rejected obfuscation fields");
        }
        Ok(Activation::Failed(output.failure_summary()))
    }

    fn down(&self) -> Result<Teardown, SweepError> {
        let output = self.run_activation("down", self.settings.down_timeout())?;
        if output.success() {
            Ok(Teardown::Down)
        } else if is_already_down(&output.combined()) {
            debug!(interface = %self.interface, "interface was already down");
            Ok(Teardown::AlreadyDown)
        } else {
            Ok(Teardown::Failed(output.failure_summary()))
        }
    }

    fn handshake_established(&self) -> Result<bool, SweepError> {
        let show = self
            .show
            .as_deref()
            .ok_or_else(|| SweepError::ToolMissing("awg".to_string()))?;
        let args = ["show".to_string(), self.interface.clone()];
        let output = self.runner.run(show, &args, self.settings.show_timeout())?;
        Ok(output.success() && has_handshake(&output.stdout))
    }
}

/// `wg-quick` rejects AmneziaWG keys with `Line unrecognized`.
pub fn is_unsupported_field_error(output: &str) -> bool {
    output.contains("Line unrecognized")
}

/// Messages the activation tool prints when asked to remove a missing
/// interface.
pub fn is_already_down(output: &str) -> bool {
    let output = output.to_ascii_lowercase();
    [
        "is not a wireguard interface",
        "is not an amneziawg interface",
        "does not exist",
        "no such device",
        "cannot find device",
    ]
    .iter()
    .any(|needle| output.contains(needle))
}

fn has_handshake(show_output: &str) -> bool {
    show_output.to_ascii_lowercase().contains("latest handshake")
}

/// Owns one activation attempt.
///
/// Create it before calling `up`; the tunnel is brought down by
/// [`TunnelGuard::release`] or, if the guard is dropped on an early return,
/// by `Drop`. Teardown problems are logged and never propagated.
pub struct TunnelGuard<'a, T: TunnelControl + ?Sized> {
    tunnel: &'a T,
    armed: bool,
}

impl<'a, T: TunnelControl + ?Sized> TunnelGuard<'a, T> {
    pub fn new(tunnel: &'a T) -> Self {
        Self {
            tunnel,
            armed: true,
        }
    }

    pub fn activate(&mut self) -> Result<Activation, SweepError> {
        self.tunnel.up()
    }

    pub fn handshake_established(&self) -> Result<bool, SweepError> {
        self.tunnel.handshake_established()
    }

    pub fn release(mut self) -> Teardown {
        self.armed = false;
        teardown(self.tunnel)
    }
}

impl<T: TunnelControl + ?Sized> Drop for TunnelGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            teardown(self.tunnel);
        }
    }
}

fn teardown<T: TunnelControl + ?Sized>(tunnel: &T) -> Teardown {
    match tunnel.down() {
        Ok(Teardown::Failed(reason)) => {
            warn!(%reason, "failed to bring tunnel down");
            Teardown::Failed(reason)
        }
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(%error, "failed to bring tunnel down");
            Teardown::Failed(error.to_string())
        }
    }
}
