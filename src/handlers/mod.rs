//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! incoming IRC messages to appropriate handlers.
//!
//! Handlers receive a `MessageRef<'_>` borrowing the framed line and return
//! the single reply (if any) for the event loop to write. They never touch
//! the socket themselves.

mod channel;
mod connection;
mod core;
mod messaging;

pub use self::core::{Context, Dispatcher, Handler, HandlerResult};
