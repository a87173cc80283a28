//! Configuration validation.
//!
//! Validates configuration at startup so a bad nick or channel is reported
//! before the first connection attempt rather than as a server error later.

use super::Config;
use thiserror::Error;

/// Nick, channel and mask values longer than this are rejected.
pub const MAX_NAME_LEN: usize = 128;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} is {len} bytes, limit is {limit}", limit = MAX_NAME_LEN)]
    TooLong { field: &'static str, len: usize },
    #[error("{0} must not contain spaces, line breaks or NUL")]
    IllegalCharacter(&'static str),
    #[error("channel must start with one of '#', '&', '+' or '!', got '{0}'")]
    InvalidChannel(String),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

fn check_token(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::Empty(field));
        return;
    }
    if value.len() > MAX_NAME_LEN {
        errors.push(ValidationError::TooLong {
            field,
            len: value.len(),
        });
    }
    if value
        .bytes()
        .any(|b| matches!(b, b' ' | b'\r' | b'\n' | 0))
    {
        errors.push(ValidationError::IllegalCharacter(field));
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_token("nick", &config.nick, &mut errors);
    check_token("channel", &config.channel, &mut errors);
    check_token("master", &config.master, &mut errors);
    check_token("username", &config.username, &mut errors);
    check_token("server", &config.server, &mut errors);

    if !config.channel.is_empty() && !config.channel.starts_with(['#', '&', '+', '!']) {
        errors.push(ValidationError::InvalidChannel(config.channel.clone()));
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("idle", timeouts.idle),
        ("reconnect", timeouts.reconnect),
        ("quit", timeouts.quit),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
