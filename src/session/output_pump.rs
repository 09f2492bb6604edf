//! Socket → console relay.

use super::SessionOutcome;
use crate::console::Console;
use crate::transport::{Incoming, TelemetrySource};

/// Prints every received message until the connection closes or fails.
///
/// Messages are passed through unmodified; inbound payloads are never
/// de-framed or verified.
pub async fn pump_output<S>(source: &mut S, console: &Console) -> SessionOutcome
where
    S: TelemetrySource,
{
    loop {
        match source.recv().await {
            Some(Ok(Incoming::Text(text))) => console.line(format!("Received: {text}")),
            Some(Ok(Incoming::Binary(data))) => console.line(render_binary(&data)),
            Some(Ok(Incoming::Close(info))) => {
                tracing::debug!(code = info.as_ref().map(|i| i.code), "close frame received");
                return SessionOutcome::RemoteClosed(info);
            }
            None => return SessionOutcome::RemoteClosed(None),
            Some(Err(e)) => return SessionOutcome::from_error(e),
        }
    }
}

/// Renders a binary frame without losing bytes: valid UTF-8 is printed as
/// text, anything else as lowercase hex.
fn render_binary(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => format!("Received: {text}"),
        Err(_) => format!("Received (binary): {}", hex::encode(data)),
    }
}
