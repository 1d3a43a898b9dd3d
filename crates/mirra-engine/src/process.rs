//! Cancellable supervision of one external transfer process.
//!
//! Streams the child's stdout and stderr line by line to a callback as they
//! arrive, decoding lossily so invalid UTF-8 from the tool never aborts the
//! stream. Cancellation is forceful: the child is killed, not signalled to
//! wind down.

use std::io;
use std::process::Stdio;

use mirra_core::{MirrorError, MirrorResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::debug;

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessEnd {
    /// The process ran to completion on its own.
    Exited {
        /// Exit code, when the OS reported one.
        exit_code: Option<i32>,
    },
    /// The process was killed through the cancel signal.
    Cancelled,
}

/// Run `command`, forwarding every output line to `on_line` with trailing
/// whitespace removed. Returns once the process exits or the cancel signal
/// fires.
pub(crate) async fn stream_lines(
    mut command: Command,
    tool: &str,
    cancel: &mut watch::Receiver<bool>,
    mut on_line: impl FnMut(String),
) -> MirrorResult<ProcessEnd> {
    if *cancel.borrow() {
        return Ok(ProcessEnd::Cancelled);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| MirrorError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    let mut stdout = BufReader::new(child.stdout.take().ok_or_else(|| MirrorError::Io {
        operation: "capture stdout",
        source: io::Error::other("child stdout not piped"),
    })?);
    let mut stderr = BufReader::new(child.stderr.take().ok_or_else(|| MirrorError::Io {
        operation: "capture stderr",
        source: io::Error::other("child stderr not piped"),
    })?);

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let mut stdout_done = false;
    let mut stderr_done = false;
    let mut cancel_armed = true;

    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = next_line(&mut stdout, &mut stdout_buf), if !stdout_done => {
                match line.map_err(read_error)? {
                    Some(line) => on_line(line),
                    None => stdout_done = true,
                }
            }
            line = next_line(&mut stderr, &mut stderr_buf), if !stderr_done => {
                match line.map_err(read_error)? {
                    Some(line) => on_line(line),
                    None => stderr_done = true,
                }
            }
            changed = cancel.changed(), if cancel_armed => {
                if changed.is_err() {
                    // Cancel handle dropped; the process keeps running.
                    cancel_armed = false;
                } else if *cancel.borrow() {
                    debug!(tool, "killing transfer process on cancellation");
                    let _ = child.kill().await;
                    return Ok(ProcessEnd::Cancelled);
                }
            }
        }
    }

    let status = child.wait().await.map_err(|source| MirrorError::Io {
        operation: "wait for transfer tool",
        source,
    })?;
    Ok(ProcessEnd::Exited {
        exit_code: status.code(),
    })
}

const fn read_error(source: io::Error) -> MirrorError {
    MirrorError::Io {
        operation: "read transfer output",
        source,
    }
}

/// Read one line, lossily decoded, with trailing whitespace stripped.
///
/// The scratch buffer persists across calls so a read cancelled by the
/// surrounding `select!` resumes without losing partial data. Returns `None`
/// at end of stream.
async fn next_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>> {
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf).trim_end().to_string();
    buf.clear();
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unarmed_cancel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn streams_stdout_and_stderr_lines() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out-line; echo err-line >&2"]);
        let (_tx, mut cancel) = unarmed_cancel();

        let mut lines = Vec::new();
        let end = stream_lines(command, "sh", &mut cancel, |line| lines.push(line))
            .await
            .unwrap();

        assert_eq!(end, ProcessEnd::Exited { exit_code: Some(0) });
        lines.sort();
        assert_eq!(lines, ["err-line", "out-line"]);
    }

    #[tokio::test]
    async fn reports_exit_code() {
        let mut command = Command::new("sh");
        command.args(["-c", "exit 3"]);
        let (_tx, mut cancel) = unarmed_cancel();

        let end = stream_lines(command, "sh", &mut cancel, |_| {}).await.unwrap();
        assert_eq!(end, ProcessEnd::Exited { exit_code: Some(3) });
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let command = Command::new("/nonexistent/transfer-tool");
        let (_tx, mut cancel) = unarmed_cancel();

        let err = stream_lines(command, "transfer-tool", &mut cancel, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Spawn { .. }));
    }

    #[tokio::test]
    async fn cancellation_kills_the_process() {
        let (tx, mut cancel) = watch::channel(false);
        let mut command = Command::new("sh");
        command.args(["-c", "echo started; sleep 30"]);

        let supervise = tokio::spawn(async move {
            stream_lines(command, "sh", &mut cancel, |_| {}).await
        });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx.send(true).unwrap();

        let end = supervise.await.unwrap().unwrap();
        assert_eq!(end, ProcessEnd::Cancelled);
    }

    #[tokio::test]
    async fn trims_trailing_whitespace_only() {
        let mut command = Command::new("sh");
        command.args(["-c", "printf '  indented line   \\n'"]);
        let (_tx, mut cancel) = unarmed_cancel();

        let mut lines = Vec::new();
        stream_lines(command, "sh", &mut cancel, |line| lines.push(line))
            .await
            .unwrap();
        assert_eq!(lines, ["  indented line"]);
    }
}
