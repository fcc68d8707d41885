//! Messenger abstractions: inbound update model, outbound port, throttling decorator.

pub mod port;
pub mod throttled;
pub mod types;
