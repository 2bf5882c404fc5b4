//! Order-created listener.
//!
//! This crate provides:
//! - [`OrderCreatedListener`]: drains raw notification messages from a channel
//!   and hands each one to the order service
//! - [`channel`] for building the sender/receiver pair the transport feeds
//! - [`ListenerStats`] and [`MessageOutcome`] describing what happened

pub mod error;
pub mod processor;

pub use error::{ListenerError, Result};
pub use processor::{ListenerStats, MessageOutcome, OrderCreatedListener, channel};
