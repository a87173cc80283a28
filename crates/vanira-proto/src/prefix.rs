//! Message prefix (source) handling.
//!
//! A prefix identifies the origin of a message: either a server name or a
//! user's `nick!user@host`. The bot only cares about the nickname and about
//! the hostmask that follows the `!`.

/// A borrowed reference to a parsed prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixRef<'a> {
    /// Nickname (absent for server prefixes)
    pub nick: Option<&'a str>,
    /// Username (ident)
    pub user: Option<&'a str>,
    /// Hostname, or the server name for server prefixes
    pub host: Option<&'a str>,
    /// Original raw prefix string
    pub raw: &'a str,
}

impl<'a> PrefixRef<'a> {
    /// Parse a prefix string into components without allocation.
    pub fn parse(s: &'a str) -> Self {
        let non_empty = |part: &'a str| if part.is_empty() { None } else { Some(part) };

        if let Some(at_pos) = s.find('@') {
            let before = &s[..at_pos];
            let host = &s[at_pos + 1..];

            let (nick, user) = match before.find('!') {
                Some(bang) => (non_empty(&before[..bang]), non_empty(&before[bang + 1..])),
                None => (non_empty(before), None),
            };

            Self {
                nick,
                user,
                host: non_empty(host),
                raw: s,
            }
        } else if let Some(bang) = s.find('!') {
            Self {
                nick: non_empty(&s[..bang]),
                user: non_empty(&s[bang + 1..]),
                host: None,
                raw: s,
            }
        } else if s.contains('.') {
            Self {
                nick: None,
                user: None,
                host: Some(s),
                raw: s,
            }
        } else {
            Self {
                nick: Some(s),
                user: None,
                host: None,
                raw: s,
            }
        }
    }

    /// Get the nickname if this is a user prefix.
    #[inline]
    pub fn nickname(&self) -> Option<&'a str> {
        self.nick
    }

    /// Everything after the first `!`, i.e. `user@host`.
    ///
    /// Returns `None` when the prefix carries no `!`.
    ///
    /// ```
    /// use vanira_proto::PrefixRef;
    ///
    /// assert_eq!(PrefixRef::parse("nick!ident@host.example").mask(), Some("ident@host.example"));
    /// assert_eq!(PrefixRef::parse("irc.example.net").mask(), None);
    /// ```
    pub fn mask(&self) -> Option<&'a str> {
        strip_nick(self.raw)
    }
}

/// Strip a leading `nick!` from a hostmask, returning what follows the first `!`.
#[inline]
pub fn strip_nick(mask: &str) -> Option<&str> {
    mask.split_once('!').map(|(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_ref_parse() {
        let p = PrefixRef::parse("nick!user@host.com");
        assert_eq!(p.nick, Some("nick"));
        assert_eq!(p.user, Some("user"));
        assert_eq!(p.host, Some("host.com"));
        assert_eq!(p.mask(), Some("user@host.com"));
    }

    #[test]
    fn test_prefix_ref_server() {
        let p = PrefixRef::parse("irc.example.com");
        assert_eq!(p.host, Some("irc.example.com"));
        assert_eq!(p.nickname(), None);
        assert_eq!(p.mask(), None);
    }

    #[test]
    fn test_prefix_ref_nick_only() {
        let p = PrefixRef::parse("someone");
        assert_eq!(p.nickname(), Some("someone"));
        assert_eq!(p.mask(), None);
    }

    #[test]
    fn test_mask_keeps_later_bangs() {
        let p = PrefixRef::parse("a!b!c@d");
        assert_eq!(p.nickname(), Some("a"));
        assert_eq!(p.mask(), Some("b!c@d"));
    }

    #[test]
    fn test_strip_nick() {
        assert_eq!(strip_nick("x!a@host"), Some("a@host"));
        assert_eq!(strip_nick("a@host"), None);
    }
}
