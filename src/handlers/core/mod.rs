//! Core handler infrastructure.
//!
//! The handler trait, the context every handler receives, the registry that
//! maps command tokens to handlers, and the dispatcher that ties them to a
//! raw inbound line.

pub mod context;
pub mod dispatcher;
pub mod registry;

pub use context::{Context, Handler, HandlerResult};
pub use dispatcher::Dispatcher;
