//! Child process execution with a wall-clock bound.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::CleanerError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `command` to completion, killing it once `timeout` has elapsed.
///
/// Both pipes are drained on background threads so a chatty child cannot
/// block on a full pipe while we wait for it.
pub(crate) fn run_with_timeout(
    program: &Path,
    mut command: Command,
    timeout: Duration,
) -> Result<Captured, CleanerError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CleanerError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_until(&mut child, program, Instant::now() + timeout, timeout)?;

    Ok(Captured {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn wait_until(
    child: &mut Child,
    program: &Path,
    deadline: Instant,
    timeout: Duration,
) -> Result<ExitStatus, CleanerError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                tracing::warn!("killing {} after {timeout:?}", program.display());
                let _ = child.kill();
                let _ = child.wait();
                return Err(CleanerError::Timeout { after: timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(CleanerError::Spawn {
                    program: program.to_path_buf(),
                    source,
                });
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
