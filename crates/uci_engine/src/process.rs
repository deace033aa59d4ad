//! Managed engine child process
//!
//! Owns the child and its pipes. Writes are line-oriented and flushed per
//! command; reads are bounded by a deadline so a silent engine can never stall
//! the caller. The child is killed if the handle is dropped without
//! [`EngineProcess::shutdown`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::{timeout, timeout_at, Instant};

use crate::error::{EngineError, EngineResult};

#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    path: PathBuf,
}

impl EngineProcess {
    /// Launch the executable with piped stdin/stdout
    pub fn spawn(path: &Path) -> EngineResult<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| EngineError::Unavailable {
            message: "engine stdin was not captured".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| EngineError::Unavailable {
            message: "engine stdout was not captured".into(),
        })?;

        log::debug!("[ENGINE] Spawned {} (pid {:?})", path.display(), child.id());
        Ok(Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one command line and flush it
    pub async fn send(&mut self, command: &str) -> EngineResult<()> {
        log::trace!("[ENGINE] >> {command}");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> EngineResult<String> {
        match self.lines.next_line().await? {
            Some(line) => {
                log::trace!("[ENGINE] << {line}");
                Ok(line)
            }
            None => Err(EngineError::Disconnected),
        }
    }

    /// Feed output lines to `on_line` until it yields a value or `limit` elapses
    ///
    /// `command` only labels the timeout error.
    pub async fn read_until<T, F>(&mut self, command: &str, limit: Duration, mut on_line: F) -> EngineResult<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        let deadline = Instant::now() + limit;
        loop {
            let line = match timeout_at(deadline, self.next_line()).await {
                Ok(line) => line?,
                Err(_) => {
                    return Err(EngineError::Timeout {
                        command: command.to_owned(),
                        millis: limit.as_millis(),
                    })
                }
            };
            if let Some(done) = on_line(&line) {
                return Ok(done);
            }
        }
    }

    /// Ask the engine to quit, then kill it if it is still alive after `grace`
    pub async fn shutdown(mut self, grace: Duration) -> EngineResult<()> {
        if let Err(e) = self.send("quit").await {
            log::debug!("[ENGINE] Could not send quit: {e}");
        }

        match timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                log::info!("[ENGINE] Engine exited with {status}");
            }
            Err(_) => {
                log::warn!(
                    "[ENGINE] Engine still running after {}ms, killing it",
                    grace.as_millis()
                );
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}
