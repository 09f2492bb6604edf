//! One connect-to-disconnect lifetime of the duplex link.
//!
//! [`run_session`] races the input pump against the output pump inside a
//! single task. Whichever finishes first decides the [`SessionOutcome`];
//! the other is dropped at its current suspension point, and only then is
//! the connection closed, exactly once.

pub mod input_pump;
pub mod output_pump;

use std::fmt;

use tokio::io::{AsyncBufRead, Lines};

use crate::console::Console;
use crate::error::LinkError;
use crate::framing::Framer;
use crate::transport::{CloseInfo, CommandSink, TelemetrySource};

pub use input_pump::{ConsoleLine, pump_input};
pub use output_pump::pump_output;

/// Why a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The operator closed standard input.
    EndOfInput,
    /// The device closed the connection or the stream ended.
    RemoteClosed(Option<CloseInfo>),
    /// The connection failed at the I/O level.
    TransportError(LinkError),
    /// Handshake, protocol, or framing failure.
    ProtocolError(LinkError),
}

impl SessionOutcome {
    /// Classifies an error that ended a session.
    #[must_use]
    pub fn from_error(err: LinkError) -> Self {
        if err.is_protocol() {
            Self::ProtocolError(err)
        } else {
            Self::TransportError(err)
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfInput => f.write_str("Input closed"),
            Self::RemoteClosed(_) => f.write_str("Connection closed by server"),
            Self::TransportError(e) => write!(f, "Connection closed unexpectedly: {e}"),
            Self::ProtocolError(e) => write!(f, "Connection failed: {e}"),
        }
    }
}

/// Runs both pumps over one connection until the first one stops, then
/// closes the connection.
pub async fn run_session<R, K, S>(
    mut sink: K,
    mut source: S,
    lines: &mut Lines<R>,
    framer: &Framer,
    console: &Console,
) -> SessionOutcome
where
    R: AsyncBufRead + Unpin,
    K: CommandSink,
    S: TelemetrySource,
{
    let outcome = tokio::select! {
        result = pump_input(lines, &mut sink, framer, console) => match result {
            Ok(()) => SessionOutcome::EndOfInput,
            Err(e) => SessionOutcome::from_error(e),
        },
        outcome = pump_output(&mut source, console) => outcome,
    };

    if let Err(e) = sink.close().await {
        tracing::warn!(error = %e, "close after session end failed");
    }
    outcome
}
