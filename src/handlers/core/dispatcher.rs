//! Line dispatch: parse one framed line and run its handler.

use super::context::{Context, HandlerResult};
use super::registry::Registry;
use crate::config::{Identity, OperList};
use tracing::{debug, trace};
use vanira_proto::MessageRef;

/// Session-wide dispatch state, built once at startup and reused across
/// reconnections.
pub struct Dispatcher {
    identity: Identity,
    opers: OperList,
    version: String,
    registry: Registry,
}

impl Dispatcher {
    pub fn new(identity: Identity, opers: OperList, version: impl Into<String>) -> Self {
        Self {
            identity,
            opers,
            version: version.into(),
            registry: Registry::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one line (terminator already stripped). Malformed lines are dropped.
    pub fn dispatch(&self, line: &str) -> HandlerResult {
        trace!(line, "<-");
        let msg = match MessageRef::parse(line) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, line, "Dropping malformed line");
                return None;
            }
        };
        let ctx = Context {
            identity: &self.identity,
            opers: &self.opers,
            version: &self.version,
        };
        self.registry.dispatch(&ctx, &msg)
    }
}
