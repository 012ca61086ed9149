#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

//! botwire: a minimal framework for running chat bots against Slack's
//! real-time messaging API.
//!
//! A [`Bot`] owns one duplex connection and an ordered table of
//! [`Command`]s. [`Bot::run`] negotiates a session, opens the websocket and
//! dispatches every inbound message against the command table, sending any
//! produced replies back over the wire. A [`BotRegistry`] lets several
//! independently configured bots run concurrently in one process, sharing
//! one [`MessageSequence`] so outbound message ids stay unique process-wide.

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod session;
pub mod wire;

pub use bot::Bot;
pub use commands::Command;
pub use config::{BotConfig, BotsConfig};
pub use error::BotError;
pub use message::{Message, MessageSequence};
pub use registry::BotRegistry;
pub use session::{Negotiator, SessionHandle};
