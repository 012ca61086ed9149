use anyhow::{Context, bail};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{Wire, WireRx, WireTx};
use crate::message::Message;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production wire: one JSON message object per websocket text frame.
pub struct WsWire;

#[async_trait]
impl Wire for WsWire {
    async fn connect(
        &self,
        endpoint: &str,
    ) -> anyhow::Result<(Box<dyn WireTx>, Box<dyn WireRx>)> {
        tracing::info!(endpoint, "opening websocket");
        let (stream, _) = tokio_tungstenite::connect_async(endpoint)
            .await
            .context("websocket connect failed")?;
        let (write, read) = stream.split();

        Ok((Box::new(WsTx { write }), Box::new(WsRx { read })))
    }
}

struct WsTx {
    write: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl WireTx for WsTx {
    async fn send(&mut self, message: &Message) -> anyhow::Result<()> {
        let json = serde_json::to_string(message).context("failed to encode message")?;
        self.write
            .send(WsMessage::Text(json.into()))
            .await
            .context("websocket send failed")?;
        Ok(())
    }
}

struct WsRx {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl WireRx for WsRx {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        loop {
            let frame = match self.read.next().await {
                Some(frame) => frame.context("websocket receive failed")?,
                None => bail!("websocket stream ended"),
            };

            match frame {
                WsMessage::Text(text) => {
                    let message = serde_json::from_str(&text)
                        .context("inbound frame was not a valid message")?;
                    return Ok(message);
                }
                WsMessage::Close(_) => bail!("websocket closed by remote"),
                // Pings are answered by tungstenite itself; nothing else on
                // this socket carries messages.
                _ => continue,
            }
        }
    }
}
