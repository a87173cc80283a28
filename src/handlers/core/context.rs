//! Command handler context and core types.
//!
//! Handlers are synchronous and side-effect free: they look at one parsed
//! message and the fixed session identity, and return at most one command
//! for the event loop to send.

use crate::config::{Identity, OperList};
use vanira_proto::{Command, MessageRef};

/// What a handler produced: a reply to send, or nothing.
pub type HandlerResult = Option<Command>;

/// Handler context passed to each command handler.
///
/// Everything here is fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Who we are on the network.
    pub identity: &'a Identity,
    /// Hostmasks that get channel operator status on join.
    pub opers: &'a OperList,
    /// Text sent in answer to a CTCP VERSION query.
    pub version: &'a str,
}

impl Context<'_> {
    /// Our own nickname.
    #[inline]
    pub fn nick(&self) -> &str {
        &self.identity.nick
    }

    /// The channel we live in.
    #[inline]
    pub fn channel(&self) -> &str {
        &self.identity.channel
    }

    /// Build the JOIN for our channel.
    pub fn join(&self) -> Command {
        Command::JOIN(self.identity.channel.clone())
    }
}

/// Handler trait for inbound commands.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult;
}
