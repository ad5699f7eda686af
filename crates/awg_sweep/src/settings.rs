//! Sweep settings.
//!
//! Everything that controls how a single combination is exercised: interface
//! name, probe target, timeouts and pauses. Settings have sensible defaults,
//! can be loaded from a JSON file and are overridden by command-line flags.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Linux limits interface names to 15 bytes (`IFNAMSIZ - 1`).
const MAX_INTERFACE_NAME_LEN: usize = 15;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Name of the tunnel interface (and of the artifact file stem).
    pub interface: String,
    pub ping_target: String,
    pub ping_count: u32,
    /// Per-reply wait passed to `ping -W`.
    pub ping_wait_secs: u32,
    /// Highest packet loss that still counts as success (inclusive).
    pub max_packet_loss_percent: f64,
    pub up_timeout_secs: u64,
    pub down_timeout_secs: u64,
    /// Probe timeout override; defaults to `ping_count * 3 + 10` seconds.
    pub probe_timeout_secs: Option<u64>,
    pub show_timeout_secs: u64,
    /// Pause between activation and handshake check / probe.
    pub settle_ms: u64,
    /// Pause after teardown before the next combination.
    pub cooldown_ms: u64,
    pub check_handshake: bool,
    /// Keep going with tools that reject obfuscation fields.
    pub force: bool,
    pub skip_invalid_jitter: bool,
    pub top_results: usize,
    pub show_progress: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            interface: "awg-test".to_string(),
            ping_target: "1.1.1.1".to_string(),
            ping_count: 5,
            ping_wait_secs: 2,
            max_packet_loss_percent: 0.0,
            up_timeout_secs: 30,
            down_timeout_secs: 10,
            probe_timeout_secs: None,
            show_timeout_secs: 5,
            settle_ms: 3000,
            cooldown_ms: 2000,
            check_handshake: true,
            force: false,
            skip_invalid_jitter: false,
            top_results: 20,
            show_progress: true,
        }
    }
}

impl SweepSettings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.ping_count == 0 {
            return Err(invalid("ping_count", "must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.max_packet_loss_percent) {
            return Err(invalid(
                "max_packet_loss_percent",
                format!("{} is outside 0..=100", self.max_packet_loss_percent),
            ));
        }
        if self.ping_target.trim().is_empty() {
            return Err(invalid("ping_target", "must not be empty"));
        }
        validate_interface_name(&self.interface)?;
        if self.up_timeout_secs == 0 || self.down_timeout_secs == 0 {
            return Err(invalid("timeouts", "must be at least one second"));
        }
        Ok(())
    }

    pub fn up_timeout(&self) -> Duration {
        Duration::from_secs(self.up_timeout_secs)
    }

    pub fn down_timeout(&self) -> Duration {
        Duration::from_secs(self.down_timeout_secs)
    }

    pub fn show_timeout(&self) -> Duration {
        Duration::from_secs(self.show_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| default_probe_timeout(self.ping_count))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Settings with no pauses, for tests and dry runs.
    pub fn without_delays(mut self) -> Self {
        self.settle_ms = 0;
        self.cooldown_ms = 0;
        self
    }
}

/// Time allowed for `count` echo requests when no override is set.
pub fn default_probe_timeout(count: u32) -> Duration {
    Duration::from_secs(u64::from(count) * 3 + 10)
}

fn validate_interface_name(name: &str) -> Result<(), SettingsError> {
    if name.is_empty() {
        return Err(invalid("interface", "must not be empty"));
    }
    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(invalid(
            "interface",
            format!("`{name}` is longer than {MAX_INTERFACE_NAME_LEN} characters"),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '=' | '+' | '.' | '-'))
    {
        return Err(invalid(
            "interface",
            format!("`{name}` contains characters not allowed in interface names"),
        ));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}
