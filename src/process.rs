//! Bounded external process execution.
//!
//! Compiler probes and editor CLI calls go through [`run_with_timeout`] so a
//! hung child can never stall the pipeline. A timeout is reported the same way
//! as a non-zero exit status.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Grace period for collecting stdout after the child exited
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Captured stdout of a successful run
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
}

impl CapturedOutput {
    /// First line of stdout with surrounding whitespace removed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Runs `cmd` with stdin closed and stderr discarded, capturing stdout.
///
/// The child is killed once `timeout` elapses.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<CapturedOutput, ProcessError> {
    let program = cmd.get_program().to_string_lossy().into_owned();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let (tx, rx) = mpsc::channel();
    let stdout = child.stdout.take();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout {
            let _ = out.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::TimedOut { program, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(ProcessError::Wait { program, source });
            }
        }
    };

    if !status.success() {
        return Err(ProcessError::Failed { program, status });
    }

    let bytes = rx.recv_timeout(DRAIN_TIMEOUT).unwrap_or_default();
    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = run_with_timeout(
            Command::new("sh").args(["-c", "printf 'first line\\nsecond\\n'"]),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.first_line(), Some("first line"));
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let err = run_with_timeout(
            Command::new("sh").args(["-c", "echo nope; exit 3"]),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Failed { .. }));
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run_with_timeout(
            Command::new("sh").args(["-c", "sleep 10"]),
            Duration::from_millis(200),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = run_with_timeout(
            &mut Command::new("/definitely/not/here/g++"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
