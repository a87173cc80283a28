//! Channel membership: auto-op on join and rejoin on kick.

use super::{Context, Handler, HandlerResult};
use crate::config::{Capability, MAX_NAME_LEN};
use tracing::{debug, info};
use vanira_proto::{Command, MessageRef};

/// Handler for JOIN: grants channel operator status to listed hostmasks.
pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let prefix = msg.prefix.as_ref()?;
        // No '!' means a server or a bare nick: nothing to match against.
        let mask = prefix.mask()?;
        let nick = prefix.nickname()?;

        if mask.len() > MAX_NAME_LEN {
            debug!(nick, len = mask.len(), "Ignoring join with oversized hostmask");
            return None;
        }

        let entry = ctx.opers.lookup(mask)?;
        match entry.capability {
            Capability::ChannelOperator => {
                info!(nick, mask, matched = entry.mask(), "Granting channel operator");
                Some(Command::op(ctx.channel(), nick))
            }
        }
    }
}

/// Handler for KICK: rejoins when we are the one kicked.
pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // KICK <channel> <nick> [:reason]
        let target = msg.param(1)?;
        if target != ctx.nick() {
            return None;
        }
        info!(
            channel = msg.param(0),
            by = msg.source_nickname(),
            reason = msg.param(2),
            "Kicked, rejoining"
        );
        Some(ctx.join())
    }
}
