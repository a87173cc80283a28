//! CTCP (Client-to-Client Protocol) helpers.
//!
//! CTCP messages ride inside PRIVMSG/NOTICE bodies, framed by `\x01`. The bot
//! only answers the VERSION query, so this module stays small.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! ```
//! use vanira_proto::ctcp::{Ctcp, VERSION_QUERY};
//!
//! assert!(Ctcp::is_version_query(VERSION_QUERY));
//! assert_eq!(Ctcp::version_reply("vanira 0.3").to_string(), "\x01VERSION vanira 0.3\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// The exact body of a CTCP VERSION request.
pub const VERSION_QUERY: &str = "\x01VERSION\x01";

/// A CTCP message, as sent in a reply body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP command, e.g. `VERSION`.
    pub command: &'a str,
    /// Optional parameters following the command.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// True only for the exact VERSION request body.
    #[inline]
    pub fn is_version_query(text: &str) -> bool {
        text == VERSION_QUERY
    }

    /// Create a VERSION reply.
    pub fn version_reply(version: &'a str) -> Self {
        Self {
            command: "VERSION",
            params: Some(version),
        }
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params {
            Some(params) => write!(f, "{CTCP_DELIM}{} {params}{CTCP_DELIM}", self.command),
            None => write!(f, "{CTCP_DELIM}{}{CTCP_DELIM}", self.command),
        }
    }
}
