//! Transport seam: connect, send, receive, close.
//!
//! The session engine only sees these traits. [`ws`] provides the
//! `tokio-tungstenite` implementation used by the binary; tests drive the
//! engine through an in-memory double.

use std::future::Future;

use crate::error::LinkError;

pub mod ws;

pub use ws::{WsConnector, WsSink, WsSource};

/// Close frame details sent by the remote end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// WebSocket close code (1000 = normal).
    pub code: u16,
    /// Human-readable close reason.
    pub reason: String,
}

/// Application-level message received from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
    /// Close frame; `None` when the peer sent no status code.
    Close(Option<CloseInfo>),
}

/// Outbound half of a connection.
pub trait CommandSink {
    /// Sends one text message.
    fn send_text(&mut self, text: &str) -> impl Future<Output = Result<(), LinkError>>;

    /// Closes the connection.
    fn close(&mut self) -> impl Future<Output = Result<(), LinkError>>;
}

/// Inbound half of a connection.
pub trait TelemetrySource {
    /// Receives the next message, or `None` once the stream has ended.
    fn recv(&mut self) -> impl Future<Output = Option<Result<Incoming, LinkError>>>;
}

/// Establishes connections.
pub trait Connector {
    /// Outbound half produced by a successful connect.
    type Sink: CommandSink;
    /// Inbound half produced by a successful connect.
    type Source: TelemetrySource;

    /// Connects to `uri`, returning independent send and receive halves.
    fn connect(
        &mut self,
        uri: &str,
    ) -> impl Future<Output = Result<(Self::Sink, Self::Source), LinkError>>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory connection double.

    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::{CommandSink, Connector, Incoming, TelemetrySource};
    use crate::error::LinkError;

    /// Test-side view of one mock connection.
    #[derive(Debug)]
    pub(crate) struct RemoteEnd {
        pub(crate) sent: mpsc::UnboundedReceiver<String>,
        pub(crate) inbound: mpsc::UnboundedSender<Result<Incoming, LinkError>>,
        pub(crate) closes: Arc<AtomicUsize>,
    }

    impl RemoteEnd {
        pub(crate) fn close_count(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        pub(crate) fn drain_sent(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(msg) = self.sent.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    #[derive(Debug)]
    pub(crate) struct MockSink {
        sent: mpsc::UnboundedSender<String>,
        closes: Arc<AtomicUsize>,
    }

    impl CommandSink for MockSink {
        async fn send_text(&mut self, text: &str) -> Result<(), LinkError> {
            if self.closes.load(Ordering::SeqCst) > 0 {
                return Err(LinkError::Transport("send after close".to_string()));
            }
            self.sent
                .send(text.to_string())
                .map_err(|_| LinkError::Transport("remote end dropped".to_string()))
        }

        async fn close(&mut self) -> Result<(), LinkError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug)]
    pub(crate) struct MockSource {
        inbound: mpsc::UnboundedReceiver<Result<Incoming, LinkError>>,
    }

    impl TelemetrySource for MockSource {
        async fn recv(&mut self) -> Option<Result<Incoming, LinkError>> {
            self.inbound.recv().await
        }
    }

    /// Creates a connected sink/source pair plus the remote view of it.
    pub(crate) fn pair() -> (MockSink, MockSource, RemoteEnd) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let closes = Arc::new(AtomicUsize::new(0));
        (
            MockSink {
                sent: sent_tx,
                closes: Arc::clone(&closes),
            },
            MockSource { inbound: inbound_rx },
            RemoteEnd {
                sent: sent_rx,
                inbound: inbound_tx,
                closes,
            },
        )
    }

    /// Connector replaying a scripted list of results, recording the
    /// instant of each attempt. Once the script is exhausted every
    /// attempt fails.
    #[derive(Debug)]
    pub(crate) struct ScriptedConnector {
        script: VecDeque<Result<(MockSink, MockSource), LinkError>>,
        pub(crate) attempts: mpsc::UnboundedSender<(String, Instant)>,
    }

    impl ScriptedConnector {
        pub(crate) fn new(
            script: Vec<Result<(MockSink, MockSource), LinkError>>,
        ) -> (Self, mpsc::UnboundedReceiver<(String, Instant)>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Self {
                    script: script.into(),
                    attempts: tx,
                },
                rx,
            )
        }
    }

    impl Connector for ScriptedConnector {
        type Sink = MockSink;
        type Source = MockSource;

        async fn connect(&mut self, uri: &str) -> Result<(MockSink, MockSource), LinkError> {
            let _ = self.attempts.send((uri.to_string(), Instant::now()));
            self.script
                .pop_front()
                .unwrap_or_else(|| Err(LinkError::Connect("connection refused".to_string())))
        }
    }
}
