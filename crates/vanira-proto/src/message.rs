//! Zero-copy parsing of inbound protocol lines.
//!
//! A line has the shape
//!
//! ```text
//! [':' prefix SPACE] command *(SPACE param) [SPACE ':' trailing]
//! ```
//!
//! Parsing never validates beyond this shape; handlers check the parameters
//! they need themselves.
//!
//! # Example
//!
//! ```
//! use vanira_proto::MessageRef;
//!
//! let msg = MessageRef::parse(":nick!user@host PRIVMSG #channel :Hello there").unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, ["#channel", "Hello there"]);
//! assert_eq!(msg.source_nickname(), Some("nick"));
//! ```

use crate::error::MessageParseError;
use crate::prefix::PrefixRef;

/// A borrowed message that references the original line.
#[derive(Clone, PartialEq, Debug)]
pub struct MessageRef<'a> {
    /// Parsed message prefix, if present.
    pub prefix: Option<PrefixRef<'a>>,
    /// The command token, verbatim (numerics stay as three digits).
    pub command: &'a str,
    /// Positional parameters; a trailing parameter keeps its spaces.
    pub params: Vec<&'a str>,
}

impl<'a> MessageRef<'a> {
    /// Split a line (without CRLF) into prefix, command and parameters.
    #[must_use = "parsing result should be handled"]
    pub fn parse(s: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let line = s.trim_end_matches(['\r', '\n']);
        let mut rest = line.trim_start_matches(' ');
        if rest.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let prefix = match rest.strip_prefix(':') {
            Some(after) => {
                let (raw_prefix, tail) = after
                    .split_once(' ')
                    .ok_or(MessageParseError::MissingCommand)?;
                if raw_prefix.is_empty() {
                    return Err(MessageParseError::EmptyPrefix);
                }
                rest = tail.trim_start_matches(' ');
                Some(PrefixRef::parse(raw_prefix))
            }
            None => None,
        };

        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, tail)) => (command, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing);
                break;
            }
            match rest.split_once(' ') {
                Some((param, tail)) => {
                    params.push(param);
                    rest = tail;
                }
                None => {
                    params.push(rest);
                    break;
                }
            }
        }

        Ok(MessageRef {
            prefix,
            command,
            params,
        })
    }

    /// Get a specific parameter by index.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }

    /// Get the source nickname from the prefix, if present.
    pub fn source_nickname(&self) -> Option<&'a str> {
        self.prefix.as_ref().and_then(|p| p.nickname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let msg = MessageRef::parse("PING :server").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, ["server"]);
        assert!(msg.prefix.is_none());
    }

    #[test]
    fn test_parse_with_prefix() {
        let msg = MessageRef::parse(":nick!user@host PRIVMSG #channel :Hello").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.source_nickname(), Some("nick"));
        assert_eq!(msg.params, ["#channel", "Hello"]);
    }

    #[test]
    fn test_trailing_keeps_spaces_and_colons() {
        let msg = MessageRef::parse(":n!u@h KICK #c victim :go away: now").unwrap();
        assert_eq!(msg.params, ["#c", "victim", "go away: now"]);
    }

    #[test]
    fn test_empty_trailing() {
        let msg = MessageRef::parse("QUIT :").unwrap();
        assert_eq!(msg.params, [""]);
    }

    #[test]
    fn test_no_params() {
        let msg = MessageRef::parse("AWAY").unwrap();
        assert_eq!(msg.command, "AWAY");
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_repeated_spaces() {
        let msg = MessageRef::parse(":srv  251  me   :There are 3 users").unwrap();
        assert_eq!(msg.command, "251");
        assert_eq!(msg.params, ["me", "There are 3 users"]);
    }

    #[test]
    fn test_join_with_colon_channel() {
        let msg = MessageRef::parse(":a!b@c JOIN :#chan").unwrap();
        assert_eq!(msg.command, "JOIN");
        assert_eq!(msg.params, ["#chan"]);
        assert_eq!(msg.prefix.unwrap().mask(), Some("b@c"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(MessageRef::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(MessageRef::parse("   "), Err(MessageParseError::EmptyMessage));
        assert_eq!(
            MessageRef::parse(":lonely.prefix"),
            Err(MessageParseError::MissingCommand)
        );
        assert_eq!(
            MessageRef::parse(":prefix "),
            Err(MessageParseError::MissingCommand)
        );
        assert_eq!(
            MessageRef::parse(": PING"),
            Err(MessageParseError::EmptyPrefix)
        );
    }

    #[test]
    fn test_crlf_tolerated() {
        let msg = MessageRef::parse("PING :x\r\n").unwrap();
        assert_eq!(msg.params, ["x"]);
    }
}
