//! Console → socket relay.

use tokio::io::{AsyncBufRead, Lines};

use crate::console::{Console, HELP_TEXT};
use crate::error::LinkError;
use crate::framing::Framer;
use crate::transport::CommandSink;

/// Classification of one operator line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLine<'a> {
    /// Nothing but whitespace; ignored.
    Blank,
    /// `?`; shows the command reference locally.
    Help,
    /// A command to frame and send, already trimmed.
    Command(&'a str),
}

impl<'a> ConsoleLine<'a> {
    /// Trims `raw` and classifies it.
    #[must_use]
    pub fn classify(raw: &'a str) -> Self {
        match raw.trim() {
            "" => Self::Blank,
            "?" => Self::Help,
            command => Self::Command(command),
        }
    }
}

/// Relays console lines to `sink` until end of input.
///
/// Returns `Ok(())` on end of input. Lines are read with the cancel-safe
/// [`Lines::next_line`], so dropping this future while it waits for input
/// loses nothing and sends nothing.
///
/// # Errors
///
/// Returns [`LinkError::Console`] if the console cannot be read, or the
/// framing or transport error that stopped a send.
pub async fn pump_input<R, S>(
    lines: &mut Lines<R>,
    sink: &mut S,
    framer: &Framer,
    console: &Console,
) -> Result<(), LinkError>
where
    R: AsyncBufRead + Unpin,
    S: CommandSink,
{
    while let Some(raw) = lines.next_line().await.map_err(LinkError::Console)? {
        match ConsoleLine::classify(&raw) {
            ConsoleLine::Blank => {}
            ConsoleLine::Help => console.line(HELP_TEXT),
            ConsoleLine::Command(command) => {
                let wire = framer.frame(command)?;
                sink.send_text(wire.as_str()).await?;
                tracing::debug!(bytes = wire.len(), authenticated = framer.is_authenticated(), "command sent");
                console.line(format!("Sent: {wire}"));
            }
        }
    }

    tracing::debug!("console input reached end of file");
    Ok(())
}
