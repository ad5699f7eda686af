#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use awg_sweep::{Activation, SweepError, Teardown, TunnelControl};

use super::EventLog;

/// Scriptable tunnel that logs `up`/`down`/`show` calls.
pub struct StubTunnel {
    log: EventLog,
    up_calls: Cell<usize>,
    /// Zero-based `up` calls that the tool refuses.
    pub refuse_up: Vec<usize>,
    /// Zero-based `up` call that fails with a fatal error.
    pub fatal_up: Option<usize>,
    pub handshake: bool,
    pub already_down: bool,
    /// Artifact to snapshot on every `up`.
    pub artifact: Option<PathBuf>,
    pub seen_configs: RefCell<Vec<String>>,
}

impl StubTunnel {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            up_calls: Cell::new(0),
            refuse_up: Vec::new(),
            fatal_up: None,
            handshake: true,
            already_down: false,
            artifact: None,
            seen_configs: RefCell::new(Vec::new()),
        }
    }

    pub fn watching(mut self, artifact: PathBuf) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

impl TunnelControl for StubTunnel {
    fn up(&self) -> Result<Activation, SweepError> {
        let call = self.up_calls.get();
        self.up_calls.set(call + 1);
        self.log.borrow_mut().push("up".to_string());

        if let Some(path) = &self.artifact {
            let contents = std::fs::read_to_string(path).unwrap_or_default();
            self.seen_configs.borrow_mut().push(contents);
        }

        if self.fatal_up == Some(call) {
            return Err(SweepError::UnsupportedTool {
                tool: "awg-quick".to_string(),
            });
        }
        if self.refuse_up.contains(&call) {
            return Ok(Activation::Failed(
                "exit status 1: RTNETLINK answers: Invalid argument".to_string(),
            ));
        }
        Ok(Activation::Up)
    }

    fn down(&self) -> Result<Teardown, SweepError> {
        self.log.borrow_mut().push("down".to_string());
        if self.already_down {
            Ok(Teardown::AlreadyDown)
        } else {
            Ok(Teardown::Down)
        }
    }

    fn handshake_established(&self) -> Result<bool, SweepError> {
        self.log.borrow_mut().push("show".to_string());
        Ok(self.handshake)
    }
}
