//! Fatal sweep errors.
//!
//! Anything that makes the whole sweep pointless ends up here. Problems with
//! a single combination (activation refused, packet loss, probe timeout) are
//! recorded as [`crate::FailureReason`] values on the report instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::command::CommandError;
use crate::template::TemplateError;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("administrative privileges are required to configure network interfaces (run as root)")]
    PrivilegeRequired,

    #[error("required tool `{0}` was not found in PATH")]
    ToolMissing(String),

    #[error("`{tool}` does not understand AmneziaWG obfuscation fields (use --force to continue anyway)")]
    UnsupportedTool { tool: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("cannot write configuration artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Command(CommandError),

    #[error("no templates found at {}", .0.display())]
    NoTemplates(PathBuf),
}

impl From<CommandError> for SweepError {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::NotFound { program } => SweepError::ToolMissing(program),
            other => SweepError::Command(other),
        }
    }
}
