//! Operator console output.
//!
//! [`Console`] is a cheap, cloneable handle over an unbounded channel.
//! Pumps and the reconnect loop push status lines into it; a single
//! writer task ([`write_lines`]) drains the channel onto standard output,
//! so no writer is ever shared between concurrent activities.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Command reference shown for a `?` line.
pub const HELP_TEXT: &str = "\
Available commands (set):
- enable
- disable
- target:<float temperature>
- relay:<int>:[\"on\"|\"off\"|\"pid\"]
Available commands (query):
- enabled
- ambiant
- temp
- door
- relays";

/// Handle for printing newline-terminated lines to the operator.
#[derive(Debug, Clone)]
pub struct Console {
    tx: mpsc::UnboundedSender<String>,
}

impl Console {
    /// Creates a console handle and the receiver its lines arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Creates a console handle backed by a task writing to stdout.
    ///
    /// The task ends once every handle has been dropped and all queued
    /// lines are written.
    #[must_use]
    pub fn spawn_stdout() -> (Self, JoinHandle<()>) {
        let (console, rx) = Self::channel();
        let writer = tokio::spawn(async move {
            if let Err(e) = write_lines(rx, tokio::io::stdout()).await {
                tracing::error!(error = %e, "console writer stopped");
            }
        });
        (console, writer)
    }

    /// Queues one line for output.
    pub fn line(&self, text: impl Into<String>) {
        if self.tx.send(text.into()).is_err() {
            tracing::warn!("console writer is gone; line dropped");
        }
    }
}

/// Writes every received line to `writer`, newline-terminated and flushed
/// per line, until the channel closes.
///
/// # Errors
///
/// Returns the first I/O error from `writer`.
pub async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<String>, mut writer: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
