//! TOML-loadable bot definitions, for applications that keep their bots in
//! a config file rather than wiring everything programmatically.

use serde::Deserialize;

/// One bot definition.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Registry name the bot is launched under.
    pub name: String,
    /// Credential presented during session negotiation.
    pub token: String,
    /// Override for the negotiation API base; the production endpoint is
    /// used when absent.
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Top-level config file shape: a list of `[[bots]]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotsConfig {
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

impl BotsConfig {
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
