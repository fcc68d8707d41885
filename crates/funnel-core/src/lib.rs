//! Core of the channel onboarding bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging and channel
//! ports (traits) implemented in `funnel-telegram`.

pub mod broadcast;
pub mod channel;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod invite;
pub mod logging;
pub mod membership;
pub mod messaging;
pub mod onboarding;
pub mod store;
pub mod texts;

#[cfg(test)]
mod test_support;

pub use errors::{Error, Result};
