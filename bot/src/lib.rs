//! The hush bot: connects the moderation core to a chat platform.
//!
//! Gateway events and unmute timers flow through a single channel into
//! [`HushBot::run`], which parses text commands, drives the
//! [`hush_moderation::Moderator`] and posts notices back through the
//! [`hush_gateway::Gateway`].

pub mod audit;
pub mod bot;
pub mod command;
pub mod config;
pub mod error;
pub mod notices;
pub mod roster;
pub mod scheduler;
pub mod shutdown;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use bot::{BotEvent, HushBot, EVENT_CHANNEL_CAPACITY};
pub use command::Command;
pub use config::BotConfig;
pub use error::BotError;
pub use roster::VoiceRoster;
pub use scheduler::TokioScheduler;
pub use shutdown::{ShutdownController, ShutdownReason};
