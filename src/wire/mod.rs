//! The duplex message channel a bot talks over: a trait seam with the
//! production websocket implementation behind it.
//!
//! Failure on either direction is fatal to the channel. There is no
//! reconnect at this layer; the dispatch engine treats the first error as
//! terminal for the bot.

pub mod ws;

use async_trait::async_trait;

use crate::message::Message;

pub use ws::WsWire;

/// Sending half of an open channel.
#[async_trait]
pub trait WireTx: Send {
    /// Blocking send of one structured message.
    async fn send(&mut self, message: &Message) -> anyhow::Result<()>;
}

/// Receiving half of an open channel.
#[async_trait]
pub trait WireRx: Send {
    /// Blocking receive of one structured message.
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

/// Opens the duplex channel at a negotiated endpoint.
#[async_trait]
pub trait Wire: Send + Sync {
    async fn connect(
        &self,
        endpoint: &str,
    ) -> anyhow::Result<(Box<dyn WireTx>, Box<dyn WireRx>)>;
}
