//! Session negotiation: trades a credential token for a live websocket
//! endpoint and the bot's own identity.

use anyhow::{Context, bail};
use serde::Deserialize;

/// API base the production handshake runs against.
pub const DEFAULT_API_BASE: &str = "https://slack.com";

/// Result of a successful negotiation.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Websocket endpoint to open the duplex channel at.
    pub endpoint: String,
    /// The bot's own user id, used for mention detection. May come back
    /// empty, in which case mention-gated commands simply never fire.
    pub self_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct RtmStartResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "self", default)]
    identity: ResponseSelf,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseSelf {
    #[serde(default)]
    id: String,
}

/// Performs the `rtm.start` handshake.
pub struct Negotiator {
    client: reqwest::Client,
    api_base: String,
}

impl Negotiator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point negotiation at a different API base (tests, proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Exchange `token` for a session endpoint and self identity.
    pub async fn negotiate(&self, token: &str) -> anyhow::Result<SessionHandle> {
        let url = format!("{}/api/rtm.start", self.api_base);

        let resp = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await
            .context("rtm.start request failed")?;

        if !resp.status().is_success() {
            bail!("rtm.start failed with status {}", resp.status());
        }

        let reply: RtmStartResponse = resp
            .json()
            .await
            .context("rtm.start reply was not the expected JSON")?;

        if !reply.ok {
            bail!("remote rejected session: {}", reply.error);
        }

        Ok(SessionHandle {
            endpoint: reply.url,
            self_id: reply.identity.id,
        })
    }
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new()
    }
}
