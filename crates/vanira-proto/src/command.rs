//! Outbound commands and their wire encoding.
//!
//! Only the commands the bot ever sends are modelled. [`Display`](fmt::Display)
//! renders the wire form including the trailing CRLF; [`Command::encode`]
//! additionally rejects parameters that would break framing.

use std::fmt::{self, Write};

use crate::error::EncodeError;
use crate::line::MAX_LINE_LEN;

/// A command sent by the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username 0 * :realname`
    USER(String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PONG token`
    PONG(String),
    /// `MODE target flags [argument]`
    MODE(String, String, Option<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// `QUIT [:reason]`
    QUIT(Option<String>),
}

impl Command {
    /// Grant channel operator status to `nick` on `channel`.
    pub fn op(channel: impl Into<String>, nick: impl Into<String>) -> Self {
        Command::MODE(channel.into(), "+o".to_owned(), Some(nick.into()))
    }

    /// The command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PASS(_) => "PASS",
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::JOIN(_) => "JOIN",
            Command::PONG(_) => "PONG",
            Command::MODE(..) => "MODE",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::QUIT(_) => "QUIT",
        }
    }

    /// Parameters in wire order, and whether the last one is always colon-prefixed.
    fn args(&self) -> (Vec<&str>, bool) {
        match self {
            Command::PASS(p) => (vec![p.as_str()], false),
            Command::NICK(n) => (vec![n.as_str()], false),
            Command::USER(u, r) => (vec![u.as_str(), "0", "*", r.as_str()], true),
            Command::JOIN(c) => (vec![c.as_str()], false),
            Command::PONG(t) => (vec![t.as_str()], false),
            Command::MODE(t, flags, Some(arg)) => (vec![t.as_str(), flags.as_str(), arg.as_str()], false),
            Command::MODE(t, flags, None) => (vec![t.as_str(), flags.as_str()], false),
            Command::PRIVMSG(t, m) | Command::NOTICE(t, m) => (vec![t.as_str(), m.as_str()], true),
            Command::QUIT(Some(m)) => (vec![m.as_str()], true),
            Command::QUIT(None) => (vec![], false),
        }
    }

    /// Encode to a wire line, refusing anything that could split or overflow it.
    ///
    /// ```
    /// use vanira_proto::Command;
    ///
    /// let line = Command::JOIN("#vanira".into()).encode().unwrap();
    /// assert_eq!(line, "JOIN #vanira\r\n");
    ///
    /// assert!(Command::JOIN("#a\r\nQUIT".into()).encode().is_err());
    /// ```
    pub fn encode(&self) -> Result<String, EncodeError> {
        let (args, _) = self.args();
        if let Some(bad) = args
            .iter()
            .find(|arg| arg.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)))
        {
            return Err(EncodeError::IllegalParameter((*bad).to_owned()));
        }

        let line = self.to_string();
        if line.len() > MAX_LINE_LEN {
            return Err(EncodeError::MessageTooLong {
                actual: line.len(),
                limit: MAX_LINE_LEN,
            });
        }
        Ok(line)
    }
}

/// Check if a string needs colon-prefixing as a trailing argument.
pub fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;

        let (args, freeform) = self.args();
        if let Some((trailing, middle)) = args.split_last() {
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg)?;
            }
            f.write_char(' ')?;
            if freeform || needs_colon_prefix(trailing) {
                f.write_char(':')?;
            }
            f.write_str(trailing)?;
        }

        f.write_str("\r\n")
    }
}
