//! Process-wide registry mapping bot names to dispatch engines.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::bot::Bot;
use crate::error::BotError;

/// Explicit registry object: construct one at startup and hand it to
/// whatever launches bots. Entries are added by registration and never
/// removed; registering a name twice replaces the prior engine (last
/// writer wins).
#[derive(Default)]
pub struct BotRegistry {
    bots: Mutex<HashMap<String, Arc<Bot>>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. The previous engine under `name`, if any, is
    /// returned rather than silently dropped.
    pub fn register(&self, name: impl Into<String>, bot: Bot) -> Option<Arc<Bot>> {
        self.bots.lock().insert(name.into(), Arc::new(bot))
    }

    /// All registered engines, in no particular order.
    pub fn list(&self) -> Vec<Arc<Bot>> {
        self.bots.lock().values().cloned().collect()
    }

    /// Launch the named bot's [`Bot::run`] as an independent task and
    /// return immediately. The handle resolves to the bot's fatal error
    /// once its connection dies.
    pub fn start(&self, name: &str) -> Result<JoinHandle<Result<(), BotError>>, BotError> {
        let bot = self.bots.lock().get(name).cloned().ok_or_else(|| {
            let err = BotError::NotRegistered(name.to_string());
            tracing::warn!(error = %err, "start failed");
            err
        })?;

        tracing::info!(name, "starting bot");
        Ok(tokio::spawn(async move { bot.run().await }))
    }
}
