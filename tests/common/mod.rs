//! Integration test common infrastructure.
//!
//! The bot is the client here, so the harness plays the IRC server: it
//! listens on a loopback port, spawns the real `vanira` binary pointed at it,
//! and talks to the bot over the accepted connection.

pub mod bot;
pub mod server;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use server::{BotLink, FakeServer, StalledServer};
