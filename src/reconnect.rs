//! Reconnect loop: `Connecting → Active → Backoff → Connecting → …`.
//!
//! Every failure is retryable: a failed connect and a finished session
//! both lead to exactly one fixed-length backoff before the next attempt.
//! The loop never returns; the process stops it by dropping the future
//! (operator interrupt).

use std::convert::Infallible;
use std::time::Duration;

use tokio::io::{AsyncBufRead, Lines};

use crate::config::{Endpoint, LinkConfig};
use crate::console::Console;
use crate::framing::Framer;
use crate::session::{SessionOutcome, run_session};
use crate::transport::Connector;

/// States of the link.
#[derive(Debug)]
enum LinkState<K, S> {
    Connecting,
    Active(K, S),
    Backoff,
}

/// Drives sessions against one endpoint, one at a time, forever.
#[derive(Debug)]
pub struct ReconnectLoop<C, R> {
    connector: C,
    endpoint: Endpoint,
    framer: Framer,
    console: Console,
    delay: Duration,
    lines: Lines<R>,
}

impl<C, R> ReconnectLoop<C, R>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
{
    /// Creates a loop reading operator lines from `lines`.
    ///
    /// The console reader is owned by the loop, not by a session, so input
    /// buffered while the link is down carries over to the next session.
    #[must_use]
    pub fn new(connector: C, config: &LinkConfig, console: Console, lines: Lines<R>) -> Self {
        Self {
            connector,
            endpoint: config.endpoint.clone(),
            framer: Framer::new(config.secret.clone()),
            console,
            delay: config.reconnect_delay,
            lines,
        }
    }

    /// Runs the state machine until the future is dropped.
    pub async fn run(&mut self) -> Infallible {
        let uri = self.endpoint.uri();
        let mut state = LinkState::Connecting;

        loop {
            state = match state {
                LinkState::Connecting => {
                    tracing::info!(uri = %uri, "connecting");
                    match self.connector.connect(&uri).await {
                        Ok((sink, source)) => {
                            self.console.line(format!("Connected to {uri}"));
                            LinkState::Active(sink, source)
                        }
                        Err(e) => {
                            tracing::warn!(uri = %uri, error = %e, "connect failed");
                            self.console.line(format!("Connection failed: {e}"));
                            LinkState::Backoff
                        }
                    }
                }
                LinkState::Active(sink, source) => {
                    let outcome =
                        run_session(sink, source, &mut self.lines, &self.framer, &self.console)
                            .await;
                    self.report(&outcome);
                    LinkState::Backoff
                }
                LinkState::Backoff => {
                    self.console
                        .line(format!("Reconnecting in {}s...", self.delay.as_secs()));
                    tokio::time::sleep(self.delay).await;
                    LinkState::Connecting
                }
            };
        }
    }

    fn report(&self, outcome: &SessionOutcome) {
        match outcome {
            SessionOutcome::EndOfInput => tracing::info!("session ended: end of input"),
            SessionOutcome::RemoteClosed(info) => tracing::info!(
                code = info.as_ref().map(|i| i.code),
                reason = info.as_ref().map_or("", |i| i.reason.as_str()),
                "session ended: remote closed"
            ),
            SessionOutcome::TransportError(e) => {
                tracing::warn!(error = %e, "session ended: transport error");
            }
            SessionOutcome::ProtocolError(e) => {
                tracing::warn!(error = %e, "session ended: protocol error");
            }
        }
        self.console.line(outcome.to_string());
    }
}
