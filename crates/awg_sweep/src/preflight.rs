//! Checks that run before any tunnel is touched.
//!
//! Tool discovery goes through `PATH`. AmneziaWG tools (`awg-quick`, `awg`)
//! are preferred; the standard WireGuard tools are accepted as a fallback but
//! reject the obfuscation fields, so using them needs `force`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::SweepError;
use crate::settings::SweepSettings;

const AWG_QUICK: &str = "awg-quick";
const AWG_SHOW: &str = "awg";
const WG_QUICK: &str = "wg-quick";
const WG_SHOW: &str = "wg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFlavor {
    AmneziaWg,
    Standard,
}

/// The external tools a sweep drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub flavor: ToolFlavor,
    /// `awg-quick` or `wg-quick`.
    pub activation: PathBuf,
    /// `awg` or `wg`; only needed for handshake checks.
    pub show: Option<PathBuf>,
}

impl Toolchain {
    /// Locate tools through `PATH`.
    pub fn detect() -> Result<Self, SweepError> {
        Self::detect_with(|program| which::which(program).ok())
    }

    /// Locate tools with a custom lookup.
    pub fn detect_with(lookup: impl Fn(&str) -> Option<PathBuf>) -> Result<Self, SweepError> {
        let (flavor, activation) = match lookup(AWG_QUICK) {
            Some(path) => (ToolFlavor::AmneziaWg, path),
            None => match lookup(WG_QUICK) {
                Some(path) => (ToolFlavor::Standard, path),
                None => return Err(SweepError::ToolMissing(AWG_QUICK.to_string())),
            },
        };
        let show = lookup(AWG_SHOW).or_else(|| lookup(WG_SHOW));

        info!(
            ?flavor,
            activation = %activation.display(),
            show = ?show.as_ref().map(|path| path.display().to_string()),
            "detected tunnel tools"
        );

        Ok(Self {
            flavor,
            activation,
            show,
        })
    }

    /// Fixed tools, for callers that already know where they live.
    pub fn with_programs(
        flavor: ToolFlavor,
        activation: impl Into<PathBuf>,
        show: Option<PathBuf>,
    ) -> Self {
        Self {
            flavor,
            activation: activation.into(),
            show,
        }
    }

    /// Reject tool setups that cannot run the sweep as configured.
    pub fn validate(&self, settings: &SweepSettings) -> Result<(), SweepError> {
        if self.flavor == ToolFlavor::Standard {
            if !settings.force {
                return Err(SweepError::UnsupportedTool {
                    tool: self.activation_name(),
                });
            }
            warn!(
                tool = %self.activation.display(),
                "standard WireGuard tools detected, obfuscation fields will likely be rejected"
            );
        }
        if settings.check_handshake && self.show.is_none() {
            return Err(SweepError::ToolMissing(AWG_SHOW.to_string()));
        }
        Ok(())
    }

    /// Where the activation tool expects `<interface>.conf`.
    pub fn default_artifact_path(&self, interface: &str) -> PathBuf {
        let dir = match self.flavor {
            ToolFlavor::AmneziaWg => Path::new("/etc/amnezia/amneziawg"),
            ToolFlavor::Standard => Path::new("/etc/wireguard"),
        };
        dir.join(format!("{interface}.conf"))
    }

    fn activation_name(&self) -> String {
        self.activation
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.activation.display().to_string())
    }
}

/// Fail unless the process runs with an effective UID of 0.
pub fn ensure_privileged() -> Result<(), SweepError> {
    if is_privileged() {
        Ok(())
    } else {
        Err(SweepError::PrivilegeRequired)
    }
}

#[cfg(unix)]
pub fn is_privileged() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_privileged() -> bool {
    false
}

/// Resolve a single program through `PATH`.
pub fn require_tool(program: &str) -> Result<PathBuf, SweepError> {
    which::which(program).map_err(|_| SweepError::ToolMissing(program.to_string()))
}
