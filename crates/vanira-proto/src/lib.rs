//! # vanira-proto
//!
//! The wire layer of the vanira IRC bot.
//!
//! ## Features
//!
//! - Fixed-capacity CRLF line framing that tolerates arbitrary chunking
//! - Zero-copy parsing of inbound lines into prefix, command and parameters
//! - Outbound command encoding with trailing-argument handling
//! - CTCP helpers for the VERSION exchange
//!
//! ```rust
//! use vanira_proto::{Command, LineBuffer, MessageRef};
//!
//! let mut buffer = LineBuffer::new();
//! buffer.extend(b":irc.example.net PING :1234\r\n");
//!
//! let line = buffer.next_line().unwrap();
//! let msg = MessageRef::parse(&line).unwrap();
//! assert_eq!(msg.command, "PING");
//!
//! let pong = Command::PONG(msg.params[0].to_owned());
//! assert_eq!(pong.to_string(), "PONG 1234\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod ctcp;
pub mod error;
pub mod line;
pub mod message;
pub mod prefix;

pub use self::command::Command;
pub use self::ctcp::{Ctcp, VERSION_QUERY};
pub use self::error::{EncodeError, MessageParseError};
pub use self::line::{LineBuffer, MAX_LINE_LEN};
pub use self::message::MessageRef;
pub use self::prefix::PrefixRef;
