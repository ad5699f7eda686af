//! Exit codes for the `awg-sweep` CLI.
//!
//! Following Unix conventions for exit codes.

use awg_sweep::settings::SettingsError;
use awg_sweep::template::TemplateError;
use awg_sweep::SweepError;

use crate::app::AppError;

/// Exit code constants.
pub mod codes {
    /// Sweep completed, whether or not any combination worked.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments, settings or template contents.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error.
    pub const IO_ERROR: i32 = 2;
    /// A required external tool is missing.
    pub const MISSING_TOOL: i32 = 3;
    /// Not running as root.
    pub const PRIVILEGE: i32 = 4;
    /// The activation tool cannot handle obfuscation fields.
    pub const UNSUPPORTED_TOOL: i32 = 5;
    /// No templates found.
    pub const NO_TEMPLATES: i32 = 6;
    /// Interrupted by signal (128 + signal number).
    pub const SIGINT: i32 = 130;
}

/// Map an [`AppError`] to an exit code.
pub fn exit_code(error: &AppError) -> i32 {
    match error {
        AppError::InvalidArgument(_) => codes::INVALID_ARGS,
        AppError::Settings(SettingsError::Read { .. }) => codes::IO_ERROR,
        AppError::Settings(_) => codes::INVALID_ARGS,
        AppError::Sweep(error) => sweep_exit_code(error),
        AppError::Export(_) => codes::IO_ERROR,
    }
}

fn sweep_exit_code(error: &SweepError) -> i32 {
    match error {
        SweepError::PrivilegeRequired => codes::PRIVILEGE,
        SweepError::ToolMissing(_) => codes::MISSING_TOOL,
        SweepError::UnsupportedTool { .. } => codes::UNSUPPORTED_TOOL,
        SweepError::Template(TemplateError::MissingInterface { .. }) => codes::INVALID_ARGS,
        SweepError::Template(_) => codes::IO_ERROR,
        SweepError::Artifact { .. } | SweepError::Output { .. } => codes::IO_ERROR,
        SweepError::Command(_) => codes::IO_ERROR,
        SweepError::NoTemplates(_) => codes::NO_TEMPLATES,
    }
}
