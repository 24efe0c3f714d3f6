//! Runs the target program against a single crash input.
//!
//! The target is invoked as `<executable> <input>`. stdout and stderr are
//! both pointed at one anonymous temp file, so the streams interleave the
//! way a terminal would show them and the child never blocks on a full pipe.
//!
//! On Unix the child leads its own process group and a timeout kills the
//! whole group, so wrapper scripts cannot leave grandchildren behind.

use super::types::ExecutionRecord;
use crate::utils::error::ExecError;
use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Interval between `try_wait` polls
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `executable input` with a timeout
///
/// **Public** - main entry point of the executor
///
/// A non-zero exit code is a normal result: a crashing target is what we
/// expect to see.
///
/// # Errors
/// * `ExecError::Spawn` - the executable could not be started
/// * `ExecError::Wait` - polling the child failed
/// * `ExecError::Capture` - the merged output could not be set up or read
/// * `ExecError::Timeout` - the child was killed after `timeout`
pub fn run_target(
    executable: &Path,
    input: &Path,
    timeout: Duration,
) -> Result<ExecutionRecord, ExecError> {
    let mut capture = tempfile::tempfile().map_err(ExecError::Capture)?;
    let stdout = capture.try_clone().map_err(ExecError::Capture)?;
    let stderr = capture.try_clone().map_err(ExecError::Capture)?;

    debug!("Running {} {}", executable.display(), input.display());

    let mut command = Command::new(executable);
    command
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let start = Instant::now();
    let child = command.spawn().map_err(|source| ExecError::Spawn {
        path: executable.to_path_buf(),
        source,
    })?;

    let waited = wait_with_timeout(child, timeout);
    let elapsed = start.elapsed();
    let output = read_capture(&mut capture)?;

    match waited? {
        Some(status) => {
            let exit_code = exit_code(status);
            debug!(
                "{} exited with {} after {:.2}s ({} bytes of output)",
                input.display(),
                exit_code,
                elapsed.as_secs_f64(),
                output.len()
            );
            Ok(ExecutionRecord {
                exit_code,
                output,
                timeout,
                elapsed,
            })
        }
        None => Err(ExecError::Timeout { timeout, output }),
    }
}

/// Poll the child until it exits. Returns `None` after killing and reaping
/// a child that outlived `timeout`.
///
/// **Private** - internal helper for run_target
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, ExecError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    warn!(
                        "Target exceeded {:.2}s, killing pid {}",
                        timeout.as_secs_f64(),
                        child.id()
                    );
                    kill_tree(&mut child);
                    child.wait().map_err(ExecError::Wait)?;
                    return Ok(None);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_tree(&mut child);
                let _ = child.wait();
                return Err(ExecError::Wait(e));
            }
        }
    }
}

/// Kill the child and everything it spawned
///
/// Failure only means the processes are already gone; the caller's
/// `wait()` reaps the child either way.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };

    // SAFETY: kill(2) takes no pointers; a negative pid targets the group
    // the child leads since spawn.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        debug!("kill of process group {} failed", pgid);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill failed: {}", e);
    }
}

/// Read everything the child wrote, replacing invalid UTF-8
///
/// **Private** - internal helper for run_target
fn read_capture(capture: &mut File) -> Result<String, ExecError> {
    capture.rewind().map_err(ExecError::Capture)?;
    let mut bytes = Vec::new();
    capture.read_to_end(&mut bytes).map_err(ExecError::Capture)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Exit code with signal deaths mapped to `-signal`
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_nonzero_exit_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "crash.sh", "echo boom; exit 1");
        let input = dir.path().join("input");
        fs::write(&input, b"x").unwrap();

        let record = run_target(&script, &input, Duration::from_secs(5)).unwrap();
        assert_eq!(record.exit_code, 1);
        assert_eq!(record.output, "boom\n");
    }

    #[test]
    fn test_stdout_and_stderr_are_merged_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "mixed.sh", "echo one; echo two >&2; echo three");
        let input = dir.path().join("input");
        fs::write(&input, b"x").unwrap();

        let record = run_target(&script, &input, Duration::from_secs(5)).unwrap();
        assert_eq!(record.exit_code, 0);
        assert_eq!(record.output, "one\ntwo\nthree\n");
    }

    #[test]
    fn test_input_path_is_sole_argument() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "args.sh", "echo \"$#:$1\"");
        let input = dir.path().join("crash-abc");
        fs::write(&input, b"x").unwrap();

        let record = run_target(&script, &input, Duration::from_secs(5)).unwrap();
        assert_eq!(record.output.trim(), format!("1:{}", input.display()));
    }

    #[test]
    fn test_timeout_kills_child_and_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "hang.sh", "echo started\nexec sleep 5");
        let input = dir.path().join("input");
        fs::write(&input, b"x").unwrap();

        let start = Instant::now();
        let err = run_target(&script, &input, Duration::from_secs(1)).unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(4));

        match err {
            ExecError::Timeout { output, .. } => assert_eq!(output, "started\n"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let body = format!("(sleep 2; touch '{}') &\nwait", marker.display());
        let script = write_script(dir.path(), "wrapper.sh", &body);
        let input = dir.path().join("input");
        fs::write(&input, b"x").unwrap();

        let err = run_target(&script, &input, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));

        std::thread::sleep(Duration::from_secs(3));
        assert!(!marker.exists());
    }

    #[test]
    fn test_signal_death_is_negative() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "abort.sh", "kill -SEGV $$");
        let input = dir.path().join("input");
        fs::write(&input, b"x").unwrap();

        let record = run_target(&script, &input, Duration::from_secs(5)).unwrap();
        assert_eq!(record.exit_code, -11);
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_target(
            &dir.path().join("nope"),
            &dir.path().join("input"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
