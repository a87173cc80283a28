//! Command handler registry and dispatch.
//!
//! The `Registry` maps exact, case-sensitive command tokens to handlers and
//! counts how often each one fired.

use super::context::{Context, Handler, HandlerResult};
use crate::handlers::{
    channel::{JoinHandler, KickHandler},
    connection::{PingHandler, WelcomeHandler},
    messaging::PrivmsgHandler,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;
use vanira_proto::MessageRef;

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    /// Per-command dispatch counters.
    command_counts: HashMap<&'static str, AtomicU64>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // RPL_LUSERCLIENT arrives once registration is complete
        handlers.insert("251", Box::new(WelcomeHandler));
        handlers.insert("PING", Box::new(PingHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("KICK", Box::new(KickHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));

        let command_counts = handlers.keys().map(|&k| (k, AtomicU64::new(0))).collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Route `msg` to its handler. Unknown commands produce nothing.
    pub fn dispatch(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let Some(handler) = self.handlers.get(msg.command) else {
            trace!(command = msg.command, "No handler");
            return None;
        };
        if let Some(counter) = self.command_counts.get(msg.command) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        handler.handle(ctx, msg)
    }

    /// Number of times each registered command has been dispatched, sorted by command.
    pub fn get_command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(&name, count)| (name, count.load(Ordering::Relaxed)))
            .collect();
        stats.sort_unstable_by_key(|&(name, _)| name);
        stats
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
