//! Bounded execution of external tools.
//!
//! Every external program the sweep touches (`awg-quick`, `awg`, `ping`) runs
//! through a [`CommandRunner`]. The system implementation enforces a timeout
//! by polling the child and killing it once the deadline passes; the output
//! collected so far is still returned.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long to wait for pipe readers after the child has exited or was killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal or on timeout.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    /// Stdout and stderr joined, for diagnostics matching.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.trim().to_string(),
            (true, false) => self.stderr.trim().to_string(),
            (false, false) => format!("{}\n{}", self.stdout.trim(), self.stderr.trim()),
        }
    }

    /// Short human readable reason for a failed command.
    pub fn failure_summary(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        let detail = self.combined();
        let last_line = detail.lines().last().unwrap_or_default();
        match self.status {
            Some(code) if last_line.is_empty() => format!("exit status {code}"),
            Some(code) => format!("exit status {code}: {last_line}"),
            None => "terminated by signal".to_string(),
        }
    }

    pub fn exited(status: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            timed_out: false,
        }
    }

    pub fn timeout() -> Self {
        Self {
            status: None,
            timed_out: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{program}` was not found")]
    NotFound { program: String },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs an external program to completion or until `timeout` elapses.
///
/// A non-zero exit or a timeout is reported through [`CommandOutput`]; only
/// failing to start or supervise the process is an error.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        (**self).run(program, args, timeout)
    }
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        debug!(program, args = %args.join(" "), timeout_secs = timeout.as_secs_f64(), "running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // A terminal Ctrl+C must only reach the sweep; the command in flight
        // (often a teardown) runs to completion.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => CommandError::NotFound {
                    program: program.to_string(),
                },
                _ => CommandError::Spawn {
                    program: program.to_string(),
                    source,
                },
            })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let start = Instant::now();
        let (status, timed_out) = loop {
            match child.try_wait() {
                Ok(Some(status)) => break (status.code(), false),
                Ok(None) if start.elapsed() >= timeout => {
                    warn!(program, timeout_secs = timeout.as_secs_f64(), "command timed out, killing it");
                    kill_group(&mut child);
                    break (None, true);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    kill_group(&mut child);
                    return Err(CommandError::Wait {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        };

        Ok(CommandOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
            timed_out,
        })
    }
}

/// Kill the child and everything it started, so no grandchild keeps the
/// output pipes open.
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = i32::try_from(child.id()) {
        // SAFETY: plain kill(2) on the group the child leads.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Drains a pipe on its own thread so a chatty child never blocks on a full
/// pipe buffer.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = pipe.read_to_end(&mut bytes);
            let _ = tx.send(String::from_utf8_lossy(&bytes).into_owned());
        });
    }
    rx
}

// A grandchild may keep the pipe open after the child is gone; give up on the
// reader instead of blocking the sweep.
fn collect(rx: mpsc::Receiver<String>) -> String {
    rx.recv_timeout(DRAIN_GRACE).unwrap_or_default()
}
