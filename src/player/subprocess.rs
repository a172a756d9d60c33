// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Player backed by an external program.
//!
//! The program is spawned with a piped stdin and receives one token per
//! line. Instrument changes are sent as `I<n>`.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info, warn};

use super::{Instrument, Player, PlayerError, STOP};

/// How to launch the external player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessConfig {
    /// Program to run
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Directory the program runs in
    pub working_dir: Option<PathBuf>,
    /// File that receives the program's stderr
    pub error_log: Option<PathBuf>,
}

impl SubprocessConfig {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            working_dir: None,
            error_log: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Player that pipes tokens to a child process
pub struct SubprocessPlayer {
    config: SubprocessConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    instrument: Option<Instrument>,
}

impl SubprocessPlayer {
    pub fn new(config: SubprocessConfig) -> Self {
        Self {
            config,
            child: None,
            stdin: None,
            instrument: None,
        }
    }

    /// Child process id while running
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    fn send(&mut self, line: &str) -> Result<(), PlayerError> {
        let stdin = self.stdin.as_mut().ok_or(PlayerError::NotStarted)?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }
}

impl Player for SubprocessPlayer {
    fn start(&mut self) -> Result<(), PlayerError> {
        if self.child.is_some() {
            return Ok(());
        }

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null());
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }
        match &self.config.error_log {
            Some(path) => {
                command.stderr(File::create(path)?);
            }
            None => {
                command.stderr(Stdio::inherit());
            }
        }

        let mut child = command.spawn()?;
        self.stdin = child.stdin.take();
        info!(program = %self.config.program, pid = child.id(), "player started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if let Err(e) = self.send(STOP) {
            debug!(error = %e, "player did not take stop token");
        }
        // Closing stdin lets the program see end of input
        self.stdin = None;
        let status = child.wait()?;
        info!(%status, "player stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.child.is_some()
    }

    fn play(&mut self, token: &str) -> Result<(), PlayerError> {
        self.send(token)
    }

    fn change_instrument(&mut self, instrument: Instrument) -> Result<(), PlayerError> {
        self.send(&format!("I<{}>", instrument))?;
        self.instrument = Some(instrument);
        Ok(())
    }

    fn instrument(&self) -> Option<Instrument> {
        self.instrument
    }
}

impl Drop for SubprocessPlayer {
    fn drop(&mut self) {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to kill player process");
            }
            let _ = child.wait();
        }
    }
}
