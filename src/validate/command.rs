//! External checker invocation.
//!
//! The command string is split with shell-words and run with the generated
//! tree as working directory. Output is drained on background threads so a
//! chatty checker cannot block on a full pipe while we poll for exit.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Maximum number of output lines kept in a failure detail.
pub const FAILURE_MAX_LINES: usize = 50;

/// Maximum characters kept in a failure detail.
pub const FAILURE_MAX_CHARS: usize = 4096;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a checker run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Passed,
    Failed(String),
    /// The program does not exist. Callers treat this as a soft warning.
    NotFound(String),
}

/// Run `command` in `cwd`, killing it after `timeout`.
pub fn run_checker(command: &str, cwd: &Path, timeout: Duration) -> CommandOutcome {
    let command = command.trim();
    let args = match shell_words::split(command) {
        Ok(args) => args,
        Err(e) => {
            return CommandOutcome::Failed(format!(
                "failed to parse command: {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
                e, command
            ));
        }
    };

    let Some((program, rest)) = args.split_first() else {
        return CommandOutcome::Failed("command is empty".to_string());
    };

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Own process group, so a timeout can take down everything the checker spawned.
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return CommandOutcome::NotFound(format!(
                "'{}' not found; type check not run\nFix: install it or disable type_check in the config.",
                program
            ));
        }
        Err(e) => {
            return CommandOutcome::Failed(format!(
                "failed to execute command: {}\nCommand: {}",
                e, command
            ));
        }
    };

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // Only a failed run reads the drained output. After a timeout a surviving
    // descendant may still hold the pipes open, so those threads are left to
    // finish on their own.
    let exit_code = match wait_with_timeout(&mut child, timeout) {
        Ok(Some(0)) => return CommandOutcome::Passed,
        Ok(Some(code)) => code.to_string(),
        Ok(None) => "none (terminated by signal)".to_string(),
        Err(WaitError::TimedOut) => {
            return CommandOutcome::Failed(format!(
                "Command timed out after {:?}\nCommand: {}",
                timeout, command
            ));
        }
        Err(WaitError::Io(e)) => {
            return CommandOutcome::Failed(format!("failed to check process status: {}", e));
        }
    };

    // Leftover descendants would keep the pipes open.
    kill_group(&child);
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    let combined = if stderr.is_empty() {
        stdout
    } else {
        format!("{}\n{}", stdout, stderr)
    };

    let mut msg = format!(
        "Command failed with exit code {}\nCommand: {}\n",
        exit_code, command
    );
    let truncated = truncate_output(&combined, FAILURE_MAX_LINES, FAILURE_MAX_CHARS);
    if !truncated.is_empty() {
        msg.push_str("\nOutput (truncated):\n");
        msg.push_str(&truncated);
    }
    CommandOutcome::Failed(msg)
}

enum WaitError {
    TimedOut,
    Io(io::Error),
}

/// Poll until exit or timeout. A timed out child is killed with its process
/// group and reaped.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Option<i32>, WaitError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code()),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_group(child);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(WaitError::TimedOut);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(WaitError::Io(e)),
        }
    }
}

/// Kill the process group led by `child`.
#[cfg(unix)]
fn kill_group(child: &Child) {
    let _ = Command::new("kill")
        .args(["-s", "KILL", "--", &format!("-{}", child.id())])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Keep the last `max_lines` lines, then the last `max_chars` characters.
pub fn truncate_output(output: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = output.trim_end().lines().collect();
    let kept = &lines[lines.len().saturating_sub(max_lines)..];
    let result = kept.join("\n");

    let chars = result.chars().count();
    if chars <= max_chars {
        return result;
    }
    let tail: String = result.chars().skip(chars - max_chars).collect();
    format!("...(truncated)...\n{}", tail)
}
