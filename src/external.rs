//! Bounded execution of the external inventory tools
//!
//! Both inventory queries are one-shot commands whose stdout is the payload.
//! Each call is bounded by a timeout; on expiry the child is killed. Pipes are
//! drained on their own threads while waiting so a chatty child cannot block
//! on a full pipe buffer. Nothing here retries.

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;
use wait_timeout::ChildExt;

use crate::error::{Error, Result};

/// Grace period for reader threads once the child has exited
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `program args...` and return its stdout.
///
/// Spawn failure, a non-zero exit, a timeout, stdout that is still open after
/// the child exits, or non-UTF-8 output are all reported as
/// [`Error::InventoryFetch`].
pub fn run_captured<S: AsRef<OsStr>>(program: &Path, args: &[S], timeout: Duration) -> Result<String> {
    let command = describe(program, args);
    debug!("running `{}` (timeout {:?})", command, timeout);

    let fail = |message: String| Error::InventoryFetch {
        command: command.clone(),
        message,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(format!("failed to start: {}", e)))?;

    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(&mut child);
            return Err(fail(format!("timed out after {:?}", timeout)));
        }
        Err(e) => {
            kill(&mut child);
            return Err(fail(format!("failed to wait: {}", e)));
        }
    };

    // A descendant that inherited the pipe can keep it open past our child's
    // exit; partial stdout is never returned as a result.
    let stdout = stdout_rx.recv_timeout(OUTPUT_COLLECTION_TIMEOUT).map_err(|_| {
        fail(format!(
            "output not collected within {:?} of exit",
            OUTPUT_COLLECTION_TIMEOUT
        ))
    })?;
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_default();

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(fail(format!("exited with status {}: {}", code, stderr.trim())));
    }

    String::from_utf8(stdout).map_err(|_| fail("output is not valid UTF-8".to_string()))
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(mut stream) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stream.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
        }
        None => {
            let _ = tx.send(Vec::new());
        }
    }
    rx
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn describe<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    #[test]
    fn test_captures_stdout() {
        let out = run_captured(&sh(), &["-c", "echo hello"], Duration::from_secs(10)).unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_non_zero_exit_reports_stderr() {
        let err = run_captured(&sh(), &["-c", "echo broken >&2; exit 3"], Duration::from_secs(10))
            .unwrap_err();
        let display = err.to_string();
        assert!(matches!(err, Error::InventoryFetch { .. }));
        assert!(display.contains("status 3"));
        assert!(display.contains("broken"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let err = run_captured(&sh(), &["-c", "sleep 10"], Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[test]
    fn test_sub_second_timeout_is_reported_exactly() {
        let err = run_captured(&sh(), &["-c", "sleep 10"], Duration::from_millis(200)).unwrap_err();
        assert!(err.to_string().contains("timed out after 200ms"), "{}", err);
    }

    #[test]
    fn test_stdout_held_open_by_descendant_is_an_error() {
        let err = run_captured(
            &sh(),
            &["-c", "echo /etc/puppetlabs/code/environments; sleep 8 &"],
            Duration::from_secs(30),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InventoryFetch { .. }));
        assert!(err.to_string().contains("output not collected"), "{}", err);
    }

    #[test]
    fn test_missing_program() {
        let err = run_captured(
            Path::new("/nonexistent/envlink-tool"),
            &["deploy", "display"],
            Duration::from_secs(1),
        )
        .unwrap_err();
        let display = err.to_string();
        assert!(display.contains("failed to start"));
        assert!(display.contains("/nonexistent/envlink-tool deploy display"));
    }
}
