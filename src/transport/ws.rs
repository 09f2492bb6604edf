//! `tokio-tungstenite` transport.
//!
//! [`WsConnector::connect`] performs the `ws://` handshake and splits the
//! stream into [`WsSink`] and [`WsSource`] halves that the two pumps drive
//! independently. Ping and Pong frames are answered by tungstenite and
//! never surface.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{CloseInfo, CommandSink, Connector, Incoming, TelemetrySource};
use crate::error::LinkError;

/// Concrete client stream type.
type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Write half of a WebSocket connection.
#[derive(Debug)]
pub struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

impl CommandSink for WsSink {
    async fn send_text(&mut self, text: &str) -> Result<(), LinkError> {
        self.sink
            .send(Message::text(text.to_owned()))
            .await
            .map_err(LinkError::from)
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        match self.sink.close().await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Read half of a WebSocket connection.
#[derive(Debug)]
pub struct WsSource {
    stream: SplitStream<WsStream>,
}

impl TelemetrySource for WsSource {
    async fn recv(&mut self) -> Option<Result<Incoming, LinkError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };
            match message {
                Message::Text(text) => return Some(Ok(Incoming::Text(text.to_string()))),
                Message::Binary(data) => return Some(Ok(Incoming::Binary(data.to_vec()))),
                Message::Close(frame) => {
                    let info = frame.map(|cf| CloseInfo {
                        code: cf.code.into(),
                        reason: cf.reason.to_string(),
                    });
                    return Some(Ok(Incoming::Close(info)));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

/// Connector for plaintext `ws://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Sink = WsSink;
    type Source = WsSource;

    async fn connect(&mut self, uri: &str) -> Result<(WsSink, WsSource), LinkError> {
        let (stream, response) = tokio_tungstenite::connect_async(uri)
            .await
            .map_err(connect_error)?;
        tracing::debug!(uri, status = %response.status(), "websocket handshake complete");

        let (sink, stream) = stream.split();
        Ok((WsSink { sink }, WsSource { stream }))
    }
}

/// Maps a connect-time failure; I/O errors before the upgrade mean the
/// endpoint was never reached.
fn connect_error(err: tungstenite::Error) -> LinkError {
    match err {
        tungstenite::Error::Io(e) => LinkError::Connect(e.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        // Bind then drop to get a port with no listener.
        let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        drop(listener);

        let result = WsConnector.connect(&format!("ws://{addr}/ws")).await;
        let Err(err) = result else {
            panic!("expected connect failure");
        };
        assert!(matches!(err, LinkError::Connect(_)), "{err:?}");
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn malformed_uri_is_a_handshake_error() {
        let result = WsConnector.connect("not a uri").await;
        let Err(err) = result else {
            panic!("expected handshake failure");
        };
        assert!(err.is_protocol(), "{err:?}");
    }

    #[test]
    fn io_failure_at_connect_maps_to_connect() {
        let err = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(connect_error(err), LinkError::Connect(_)));
    }
}
