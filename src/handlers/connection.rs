//! Registration sequencing and keepalive.

use super::{Context, Handler, HandlerResult};
use tracing::{debug, info};
use vanira_proto::{Command, MessageRef};

/// Handler for `251` (RPL_LUSERCLIENT).
///
/// Servers send it as part of the welcome burst, so it doubles as the signal
/// that registration went through and the channel can be joined.
pub struct WelcomeHandler;

impl Handler for WelcomeHandler {
    fn handle(&self, ctx: &Context<'_>, _msg: &MessageRef<'_>) -> HandlerResult {
        info!(channel = ctx.channel(), "Registered, joining");
        Some(ctx.join())
    }
}

/// Handler for PING command.
pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&self, _ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // PING <token>
        let token = msg.param(0)?;
        debug!(token, "PING");
        Some(Command::PONG(token.to_owned()))
    }
}
