//! PRIVMSG handling: CTCP VERSION and the in-channel `about` query.

use super::{Context, Handler, HandlerResult};
use tracing::debug;
use vanira_proto::{Command, Ctcp, MessageRef};

/// Handler for PRIVMSG command.
pub struct PrivmsgHandler;

impl Handler for PrivmsgHandler {
    fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // PRIVMSG <target> :<text>
        let target = msg.param(0)?;
        let text = msg.param(1)?;

        if target == ctx.nick() {
            if !Ctcp::is_version_query(text) {
                return None;
            }
            let sender = msg.source_nickname()?;
            debug!(sender, "CTCP VERSION");
            let reply = Ctcp::version_reply(ctx.version).to_string();
            return Some(Command::NOTICE(sender.to_owned(), reply));
        }

        // "<nick>: about" said in our channel
        if target == ctx.channel() && is_about(text, ctx.nick()) {
            debug!(sender = msg.source_nickname(), "about");
            return Some(Command::PRIVMSG(
                ctx.channel().to_owned(),
                ctx.version.to_owned(),
            ));
        }

        None
    }
}

fn is_about(text: &str, nick: &str) -> bool {
    text.strip_prefix(nick) == Some(": about")
}
