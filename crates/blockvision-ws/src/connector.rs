//! The connector seam between the subscription engine and the socket.
//!
//! Production code uses [`TungsteniteConnector`]; tests drive the engine
//! with scripted connections instead of a live endpoint.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use blockvision_core::error::ProviderError;

/// A frame the subscription engine cares about. Everything else (pings,
/// binary payloads) is handled inside the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum WsFrame {
    Text(String),
    Close,
}

/// One established WebSocket connection.
#[async_trait]
pub trait WsConnection: Send {
    async fn send_text(&mut self, text: String) -> Result<(), ProviderError>;

    /// Next relevant frame. `None` means the remote end closed the stream.
    async fn next_frame(&mut self) -> Option<Result<WsFrame, ProviderError>>;

    async fn close(&mut self);
}

/// Dials a WebSocket endpoint.
#[async_trait]
pub trait WsConnector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn WsConnection>, ProviderError>;
}

/// Production connector backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl WsConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn WsConnection>, ProviderError> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ProviderError::WebSocket(e.to_string()))?;
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

#[async_trait]
impl WsConnection for TungsteniteConnection {
    async fn send_text(&mut self, text: String) -> Result<(), ProviderError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ProviderError::WebSocket(e.to_string()))
    }

    async fn next_frame(&mut self) -> Option<Result<WsFrame, ProviderError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(WsFrame::Text(text.to_string()))),
                Ok(Message::Close(_)) => return Some(Ok(WsFrame::Close)),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Ok(Message::Binary(_)) => continue,
                Err(e) => return Some(Err(ProviderError::WebSocket(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
