//! Network module.
//!
//! Contains the server Connection and the descriptor handoff used by hot reload.

mod connection;
mod resume;

pub use connection::Connection;
pub use resume::{ResumeToken, reexec};
