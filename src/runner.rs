//! Blocking execution of external commands with a hard timeout.
//!
//! Every data provider goes through [`CommandRunner`]. Nothing here returns an
//! error: a missing binary, a timeout or a spawn failure all become a
//! [`CommandOutput`] with a synthetic exit code and a readable stderr, which
//! the providers turn into warning lines.

use std::{
    io::Read,
    process::{Child, Command, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::privilege::{escalated_argv, is_permission_error};

pub const EXIT_TIMEOUT: i32 = 124;
pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_SPAWN_FAILED: i32 = 1;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandFailure {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Timeout(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("exit status {code}: {message}")]
    Exit { code: i32, message: String },
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// stderr, or a placeholder when the command failed silently.
    pub fn error_text(&self) -> &str {
        if self.stderr.is_empty() {
            "unknown error"
        } else {
            &self.stderr
        }
    }

    pub fn failure(&self) -> Option<CommandFailure> {
        if self.success() {
            return None;
        }
        let message = self.error_text().to_string();
        Some(match self.code {
            EXIT_NOT_FOUND => CommandFailure::NotFound(message),
            EXIT_TIMEOUT if self.stdout.is_empty() => CommandFailure::Timeout(message),
            _ if is_permission_error(&self.stderr) => CommandFailure::PermissionDenied(message),
            code => CommandFailure::Exit { code, message },
        })
    }
}

pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[&str], timeout: Duration) -> CommandOutput;

    /// Whether a permission failure may be retried through `sudo -n`.
    fn may_escalate(&self) -> bool {
        false
    }

    /// Run once; if that fails with a permission error, retry once escalated.
    fn run_privileged(&self, argv: &[&str], timeout: Duration) -> CommandOutput {
        let first = self.run(argv, timeout);
        if first.success() || !self.may_escalate() || !is_permission_error(&first.stderr) {
            return first;
        }
        log::info!("Retrying with elevated privileges: {}", argv.join(" "));
        let retried = self.run(&escalated_argv(argv), timeout);
        if !retried.success() {
            log::warn!(
                "Elevated retry of `{}` failed: {}",
                argv.join(" "),
                retried.error_text()
            );
        }
        retried
    }
}

/// Runs real processes, no shell involved.
pub struct SystemRunner {
    escalate: bool,
}

impl SystemRunner {
    pub fn new(escalate: bool) -> Self {
        Self { escalate }
    }

    fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
        let mut pipe = pipe?;
        Some(thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = pipe.read_to_end(&mut bytes);
            String::from_utf8_lossy(&bytes).trim().to_string()
        }))
    }

    fn collect(reader: Option<JoinHandle<String>>) -> String {
        reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    /// Kill the child's whole process group, so `sudo` or `sh -c` descendants go too.
    #[cfg(unix)]
    fn kill(child: &mut Child) {
        let pgid = child.id() as libc::pid_t;
        if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
            log::debug!(
                "Failed to kill process group {pgid}: {}",
                std::io::Error::last_os_error()
            );
            let _ = child.kill();
        }
        let _ = child.wait();
    }

    #[cfg(not(unix))]
    fn kill(child: &mut Child) {
        if let Err(e) = child.kill() {
            log::debug!("Failed to kill timed out process: {e}");
        }
        let _ = child.wait();
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[&str], timeout: Duration) -> CommandOutput {
        let Some((program, args)) = argv.split_first() else {
            return CommandOutput::failed(EXIT_SPAWN_FAILED, "Error: empty command");
        };
        let command_line = argv.join(" ");
        log::debug!("Running `{command_line}` (timeout {}s)", timeout.as_secs());

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CommandOutput::failed(EXIT_NOT_FOUND, format!("Command not found: {program}"));
            }
            Err(e) => return CommandOutput::failed(EXIT_SPAWN_FAILED, format!("Error: {e}")),
        };

        let stdout = Self::spawn_reader(child.stdout.take());
        let stderr = Self::spawn_reader(child.stderr.take());
        let started = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= timeout => {
                    Self::kill(&mut child);
                    // A descendant outside the group may still hold the pipes open.
                    // The readers are detached rather than joined.
                    drop((stdout, stderr));
                    log::warn!("`{command_line}` timed out after {}s", timeout.as_secs());
                    return CommandOutput::failed(
                        EXIT_TIMEOUT,
                        format!("Timeout after {}s: {command_line}", timeout.as_secs()),
                    );
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    Self::kill(&mut child);
                    return CommandOutput::failed(EXIT_SPAWN_FAILED, format!("Error: {e}"));
                }
            }
        };

        CommandOutput {
            // Killed by a signal: report it the way a shell would.
            code: status.code().unwrap_or(128),
            stdout: Self::collect(stdout),
            stderr: Self::collect(stderr),
        }
    }

    fn may_escalate(&self) -> bool {
        self.escalate
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;
    use pretty_assertions::assert_eq;

    const T: Duration = Duration::from_secs(3);

    #[test]
    fn permission_failure_is_retried_once_with_sudo() {
        let runner = FakeRunner::new()
            .escalating()
            .respond("tcpdump -c 1", CommandOutput::failed(1, "You don't have permission to capture"))
            .respond("sudo -n tcpdump -c 1", CommandOutput::ok("packet"));
        let out = runner.run_privileged(&["tcpdump", "-c", "1"], T);
        assert_eq!(out, CommandOutput::ok("packet"));
        assert_eq!(runner.calls(), vec!["tcpdump -c 1", "sudo -n tcpdump -c 1"]);
    }

    #[test]
    fn other_failures_are_not_retried() {
        let runner = FakeRunner::new()
            .escalating()
            .respond("nmap -F host", CommandOutput::failed(2, "Failed to resolve host"));
        let out = runner.run_privileged(&["nmap", "-F", "host"], T);
        assert_eq!(out.code, 2);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn no_retry_when_escalation_is_disabled() {
        let runner = FakeRunner::new().respond("evtest /dev/input/event0", CommandOutput::failed(1, "Permission denied"));
        let out = runner.run_privileged(&["evtest", "/dev/input/event0"], T);
        assert_eq!(out.failure(), Some(CommandFailure::PermissionDenied("Permission denied".into())));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn failed_retry_is_reported() {
        let runner = FakeRunner::new()
            .escalating()
            .respond("tshark -c 5", CommandOutput::failed(1, "Permission denied"))
            .respond("sudo -n tshark -c 5", CommandOutput::failed(1, "sudo: a password is required"));
        let out = runner.run_privileged(&["tshark", "-c", "5"], T);
        assert_eq!(out.stderr, "sudo: a password is required");
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn classifies_failures() {
        assert_eq!(CommandOutput::ok("x").failure(), None);
        assert_eq!(
            CommandOutput::failed(EXIT_NOT_FOUND, "Command not found: iw").failure(),
            Some(CommandFailure::NotFound("Command not found: iw".into()))
        );
        assert_eq!(
            CommandOutput::failed(EXIT_TIMEOUT, "Timeout after 3s: ip addr").failure(),
            Some(CommandFailure::Timeout("Timeout after 3s: ip addr".into()))
        );
        assert_eq!(
            CommandOutput::failed(2, "").failure(),
            Some(CommandFailure::Exit {
                code: 2,
                message: "unknown error".into()
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_output_and_exit_code() {
        let runner = SystemRunner::new(false);
        let out = runner.run(&["sh", "-c", "echo out; echo err >&2; exit 3"], T);
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout, "out");
        assert_eq!(out.stderr, "err");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_missing_binaries() {
        let runner = SystemRunner::new(false);
        let out = runner.run(&["netdeck-no-such-binary"], T);
        assert_eq!(out.code, EXIT_NOT_FOUND);
        assert_eq!(out.stderr, "Command not found: netdeck-no-such-binary");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_kills_on_timeout() {
        let runner = SystemRunner::new(false);
        let started = Instant::now();
        let out = runner.run(&["sleep", "5"], Duration::from_millis(200));
        assert_eq!(out.code, EXIT_TIMEOUT);
        assert!(out.stderr.starts_with("Timeout after 0s: sleep 5"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_descendants_holding_the_pipes() {
        let runner = SystemRunner::new(false);
        let started = Instant::now();
        let out = runner.run(&["sh", "-c", "sleep 4; true"], Duration::from_millis(300));
        assert_eq!(out.code, EXIT_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_ignores_a_background_child_that_keeps_stdout() {
        let runner = SystemRunner::new(false);
        let started = Instant::now();
        // setsid moves the grandchild out of the killed group.
        let out = runner.run(&["sh", "-c", "setsid sleep 4 & sleep 4"], Duration::from_millis(300));
        assert_eq!(out.code, EXIT_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
