//! Hostmask authorization list.
//!
//! Loaded once at startup from a plain text file (one mask per line) with the
//! configured master prepended. Never mutated afterwards.

use std::path::Path;

use tracing::{debug, warn};
use vanira_proto::prefix::strip_nick;

use super::validation::MAX_NAME_LEN;

/// What a matching entry is allowed to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Channel operator status on join.
    ChannelOperator,
}

/// One authorized hostmask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperEntry {
    mask: String,
    pub capability: Capability,
}

impl OperEntry {
    pub fn new(mask: impl Into<String>, capability: Capability) -> Self {
        Self {
            mask: mask.into(),
            capability,
        }
    }

    /// The mask as written in the configuration.
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// The part compared against joins: `user@host`, with any `nick!` dropped.
    fn pattern(&self) -> &str {
        strip_nick(&self.mask).unwrap_or(&self.mask)
    }

    /// Byte-prefix comparison over the stored pattern's length, so `a@host`
    /// also matches `a@host.example`.
    pub fn matches(&self, mask: &str) -> bool {
        mask.as_bytes().starts_with(self.pattern().as_bytes())
    }
}

/// Ordered, immutable list of authorized hostmasks. First match wins.
#[derive(Debug, Clone, Default)]
pub struct OperList {
    entries: Vec<OperEntry>,
}

impl OperList {
    /// Build a list from the master mask followed by `masks`, in order.
    pub fn new<I, S>(master: &str, masks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = std::iter::once(master.to_owned())
            .chain(masks.into_iter().map(|m| m.as_ref().to_owned()))
            .filter_map(|mask| {
                let entry = OperEntry::new(mask, Capability::ChannelOperator);
                if entry.pattern().is_empty() {
                    warn!(mask = %entry.mask(), "Ignoring oper mask that would match everyone");
                    None
                } else {
                    Some(entry)
                }
            })
            .collect();
        Self { entries }
    }

    /// Parse the oper file format: one mask per line, blank lines and `#` comments skipped.
    pub fn parse(master: &str, content: &str) -> Self {
        let masks = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| {
                if line.len() > MAX_NAME_LEN {
                    warn!(len = line.len(), "Ignoring oper mask longer than {MAX_NAME_LEN} bytes");
                    false
                } else {
                    true
                }
            });
        Self::new(master, masks)
    }

    /// Load the oper file at `path`.
    ///
    /// An unreadable file is not fatal: the master alone is authorized.
    pub fn load(master: &str, path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(master, &content);
                debug!(
                    path = %path.display(),
                    masks = ?list.iter().map(OperEntry::mask).collect::<Vec<_>>(),
                    "Loaded oper list"
                );
                list
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read opers file, only the master is authorized");
                Self::new(master, std::iter::empty::<&str>())
            }
        }
    }

    /// First entry authorizing `mask` (the `user@host` part of a prefix).
    pub fn lookup(&self, mask: &str) -> Option<&OperEntry> {
        self.entries.iter().find(|entry| entry.matches(mask))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_master_is_first() {
        let list = OperList::parse("boss!b@home", "friend!f@elsewhere\n");
        let masks: Vec<_> = list.iter().map(OperEntry::mask).collect();
        assert_eq!(masks, ["boss!b@home", "friend!f@elsewhere"]);
    }

    #[test]
    fn test_stored_nick_is_ignored() {
        let list = OperList::new("x!a@host", std::iter::empty::<&str>());
        assert!(list.lookup("a@host").is_some());
        assert!(list.lookup("b@host").is_none());
    }

    #[test]
    fn test_prefix_match_over_stored_length() {
        let list = OperList::new("a@host", std::iter::empty::<&str>());
        assert!(list.lookup("a@host.example.org").is_some());
        // The incoming mask being shorter than the stored one never matches.
        assert!(list.lookup("a@ho").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let list = OperList::parse("m!m@m", "one!u@h\ntwo!u@h\n");
        assert_eq!(list.lookup("u@h").map(OperEntry::mask), Some("one!u@h"));
    }

    #[test]
    fn test_parse_skips_comments_blanks_and_overlong() {
        let content = format!("# staff\n\n  c!c@c  \n{}\n", "x".repeat(MAX_NAME_LEN + 1));
        let list = OperList::parse("m!m@m", &content);
        assert_eq!(list.len(), 2);
        assert!(list.lookup("c@c").is_some());
    }

    #[test]
    fn test_match_everything_masks_dropped() {
        let list = OperList::parse("m!m@m", "nobody!\n");
        assert_eq!(list.len(), 1);
        assert!(list.lookup("anything@anywhere").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pal!p@pal.example").unwrap();
        let list = OperList::load("m!m@m", file.path());
        assert_eq!(list.len(), 2);
        assert!(list.lookup("p@pal.example").is_some());
    }

    #[test]
    fn test_load_missing_file_keeps_master() {
        let list = OperList::load("m!m@m", Path::new("/nonexistent/opers"));
        assert_eq!(list.len(), 1);
        assert!(list.lookup("m@m").is_some());
    }
}
