//! The dispatch engine: one connection, one command table, and the
//! receive/dispatch loops between them.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::commands::{Command, is_mentioned};
use crate::config::BotConfig;
use crate::error::BotError;
use crate::message::{Message, MessageSequence};
use crate::session::Negotiator;
use crate::wire::{Wire, WireTx, WsWire};

/// A single bot: credential, command table and (once running) one duplex
/// connection to the messaging backend.
pub struct Bot {
    token: String,
    commands: Vec<Command>,
    sequence: Arc<MessageSequence>,
    negotiator: Negotiator,
    wire: Box<dyn Wire>,
}

impl Bot {
    /// A bot holds its credential and command table at construction time;
    /// nothing connects until [`Bot::run`].
    ///
    /// Bots that should share the process-wide outbound id space are given
    /// clones of the same `Arc<MessageSequence>`.
    pub fn new(token: impl Into<String>, sequence: Arc<MessageSequence>) -> Self {
        Self {
            token: token.into(),
            commands: Vec::new(),
            sequence,
            negotiator: Negotiator::new(),
            wire: Box::new(WsWire),
        }
    }

    pub fn from_config(config: &BotConfig, sequence: Arc<MessageSequence>) -> Self {
        let mut bot = Self::new(config.token.clone(), sequence);
        if let Some(api_base) = &config.api_base {
            bot = bot.with_api_base(api_base.clone());
        }
        bot
    }

    /// Point session negotiation at a different API base (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.negotiator = self.negotiator.with_api_base(api_base);
        self
    }

    /// Swap the transport (tests, alternate backends).
    pub fn with_wire(mut self, wire: Box<dyn Wire>) -> Self {
        self.wire = wire;
        self
    }

    /// Append a command to the table. Registration order is dispatch order;
    /// register everything before [`Bot::run`] starts consuming.
    pub fn register_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Negotiate a session, open the channel and dispatch messages until the
    /// connection dies.
    ///
    /// Normal operation never returns. The first I/O failure on either
    /// direction is fatal for this bot: it is logged, the bot stops
    /// dispatching permanently and the error goes back to the supervisor.
    /// No retry, no reconnect.
    pub async fn run(&self) -> Result<(), BotError> {
        let session = match self.negotiator.negotiate(&self.token).await {
            Ok(session) => session,
            Err(e) => {
                let err = BotError::Negotiation(format!("{e:#}"));
                tracing::error!(error = %err, "bot failed to start");
                return Err(err);
            }
        };

        tracing::info!(self_id = %session.self_id, "session negotiated, opening channel");

        let (mut tx, mut rx) = match self.wire.connect(&session.endpoint).await {
            Ok(halves) => halves,
            Err(e) => {
                let err = BotError::Channel(format!("{e:#}"));
                tracing::error!(error = %err, "bot failed to start");
                return Err(err);
            }
        };

        // Single-producer/single-consumer handoff. The receiver only ever
        // blocks on the socket, never on the queue, and messages stay in
        // receipt order.
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<Message>();

        let receiver = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        tracing::debug!(kind = %message.kind, channel = %message.channel, "received");
                        if queue_tx.send(message).is_err() {
                            // Dispatcher is gone; it already has its own error.
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(BotError::Channel(format!("{e:#}"))),
                }
            }
        });

        while let Some(message) = queue_rx.recv().await {
            if let Err(err) = self.dispatch(&session.self_id, &message, tx.as_mut()).await {
                receiver.abort();
                tracing::error!(error = %err, "reply send failed, stopping bot");
                return Err(err);
            }
        }

        // The queue only closes once the receiver loop ended; surface its error.
        match receiver.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "receive failed, stopping bot");
                Err(err)
            }
            Err(e) => {
                let err = BotError::Channel(format!("receiver task failed: {e}"));
                tracing::error!(error = %err, "receive failed, stopping bot");
                Err(err)
            }
        }
    }

    /// Evaluate the command table against one message, in registration
    /// order. Every matching entry fires and its reply is sent immediately;
    /// there is no early exit after the first match.
    async fn dispatch(
        &self,
        self_id: &str,
        message: &Message,
        tx: &mut dyn WireTx,
    ) -> Result<(), BotError> {
        for command in &self.commands {
            // The command expects a mention the message doesn't carry.
            if command.requires_mention() && !is_mentioned(self_id, &message.text) {
                continue;
            }
            if !command.matches(&message.text) {
                continue;
            }

            tracing::info!(text = %message.text, "processing command");
            let mut reply = command.invoke(message);
            reply.id = self.sequence.next();
            tracing::info!(id = reply.id, text = %reply.text, "sending reply");

            if let Err(e) = tx.send(&reply).await {
                return Err(BotError::Channel(format!("{e:#}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use regex::Regex;

    use super::*;

    struct RecordingTx(Vec<Message>);

    #[async_trait]
    impl WireTx for RecordingTx {
        async fn send(&mut self, message: &Message) -> anyhow::Result<()> {
            self.0.push(message.clone());
            Ok(())
        }
    }

    struct FailingTx;

    #[async_trait]
    impl WireTx for FailingTx {
        async fn send(&mut self, _message: &Message) -> anyhow::Result<()> {
            anyhow::bail!("socket went away")
        }
    }

    fn inbound(text: &str) -> Message {
        Message {
            id: 7,
            kind: "message".into(),
            channel: "C1".into(),
            text: text.into(),
        }
    }

    fn ping_bot() -> Bot {
        let mut bot = Bot::new("TOKEN", Arc::new(MessageSequence::new()));
        bot.register_command(Command::new(Regex::new("ping").unwrap(), false, |m| {
            m.reply("pong")
        }));
        bot.register_command(Command::new(Regex::new("ping").unwrap(), true, |m| {
            m.reply("you rang")
        }));
        bot
    }

    #[tokio::test]
    async fn test_mention_gated_command_stays_silent() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        bot.dispatch("U1", &inbound("ping"), &mut tx).await.unwrap();

        let texts: Vec<_> = tx.0.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["pong"]);
    }

    #[tokio::test]
    async fn test_all_matching_commands_fire_in_registration_order() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        bot.dispatch("U1", &inbound("ping <@U1>"), &mut tx)
            .await
            .unwrap();

        let texts: Vec<_> = tx.0.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["pong", "you rang"]);
        let ids: Vec<_> = tx.0.iter().map(|m| m.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[tokio::test]
    async fn test_unmentioned_command_ignores_mention_content() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        // The first command has no mention requirement; it fires either way.
        bot.dispatch("U1", &inbound("<@U1> ping"), &mut tx)
            .await
            .unwrap();
        bot.dispatch("U1", &inbound("ping again"), &mut tx)
            .await
            .unwrap();

        assert_eq!(tx.0.len(), 3); // mentioned message fired both commands
    }

    #[tokio::test]
    async fn test_empty_self_id_disables_mention_matching() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        bot.dispatch("", &inbound("ping <@> mention-ish"), &mut tx)
            .await
            .unwrap();

        let texts: Vec<_> = tx.0.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["pong"]);
    }

    #[tokio::test]
    async fn test_no_match_sends_nothing() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        bot.dispatch("U1", &inbound("hello there"), &mut tx)
            .await
            .unwrap();

        assert!(tx.0.is_empty());
    }

    #[tokio::test]
    async fn test_reply_send_failure_is_fatal() {
        let bot = ping_bot();
        let mut tx = FailingTx;

        let err = bot.dispatch("U1", &inbound("ping"), &mut tx).await.unwrap_err();
        assert!(matches!(err, BotError::Channel(_)));
        assert!(err.to_string().contains("socket went away"));
    }

    #[tokio::test]
    async fn test_replies_keep_the_inbound_conversation() {
        let bot = ping_bot();
        let mut tx = RecordingTx(Vec::new());

        bot.dispatch("U1", &inbound("ping"), &mut tx).await.unwrap();

        assert_eq!(tx.0[0].channel, "C1");
        assert_eq!(tx.0[0].kind, "message");
    }
}
