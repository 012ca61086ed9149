//! Minimal wiring example: one bot, two commands, run until the connection
//! dies. Expects a token in `SLACK_TOKEN`.

use std::sync::Arc;

use botwire::{Bot, BotConfig, BotRegistry, Command, Message, MessageSequence};
use regex::Regex;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig {
        name: "pingbot".to_string(),
        token: std::env::var("SLACK_TOKEN")?,
        api_base: None,
    };

    let sequence = Arc::new(MessageSequence::new());
    let mut bot = Bot::from_config(&config, sequence);

    bot.register_command(Command::new(Regex::new("ping")?, false, |message: &Message| {
        message.reply("pong")
    }));
    bot.register_command(Command::new(Regex::new("help")?, true, |message: &Message| {
        message.reply("try: ping")
    }));

    let registry = BotRegistry::new();
    registry.register(config.name.clone(), bot);

    let handle = registry.start(&config.name)?;
    handle.await??;
    Ok(())
}
