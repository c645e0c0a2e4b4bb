// src/utils.rs
use crate::config::CHILD_POLL_INTERVAL;
use crate::probe::{ProbeError, ProbeResult};
use log::debug;
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Runs `program` and returns its stdout. A child still running at `timeout` is
/// killed and reaped before returning `ProbeError::Timeout`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> ProbeResult<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProbeError::Unavailable(format!("{} not found", program)),
            ErrorKind::PermissionDenied => {
                ProbeError::PermissionDenied(format!("cannot execute {}", program))
            }
            _ => ProbeError::Unavailable(format!("failed to spawn {}: {}", program, e)),
        })?;

    // Drain stdout concurrently so a chatty child never blocks on a full pipe.
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    debug!("{} killed after exceeding {:?}", program, timeout);
                    return Err(ProbeError::Timeout(timeout));
                }
                thread::sleep(CHILD_POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Unavailable(format!(
                    "failed to wait for {}: {}",
                    program, e
                )));
            }
        }
    };

    if !status.success() {
        return Err(ProbeError::Unavailable(format!("{} exited with {}", program, status)));
    }
    let stdout = match reader.map(|handle| handle.join()) {
        Some(Ok(Ok(buf))) => buf,
        Some(Ok(Err(e))) => {
            return Err(ProbeError::Unavailable(format!(
                "failed to read {} output: {}",
                program, e
            )));
        }
        Some(Err(_)) => {
            return Err(ProbeError::Unavailable(format!("{} output reader panicked", program)));
        }
        None => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}
