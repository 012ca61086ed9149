use thiserror::Error;

/// Fatal failures surfaced by a bot's connection lifecycle and the registry.
///
/// None of these are recoverable for the affected connection: a bot whose
/// `run` returns one has stopped dispatching permanently, with no retry.
/// The supervisor that launched it decides whether to restart or exit.
#[derive(Debug, Error)]
pub enum BotError {
    /// Session negotiation failed before any channel was opened: the
    /// endpoint was unreachable, returned a bad status or malformed reply,
    /// or explicitly rejected the credential.
    #[error("session negotiation failed: {0}")]
    Negotiation(String),

    /// Send or receive on the open duplex channel failed.
    #[error("channel error: {0}")]
    Channel(String),

    /// A lookup for a name no bot was registered under.
    #[error("no bot registered under '{0}'")]
    NotRegistered(String),
}
