//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::path::PathBuf;

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_username() -> String {
    "vanira".to_string()
}

pub fn default_realname() -> String {
    "Vanira the Bot".to_string()
}

pub fn default_opers_path() -> PathBuf {
    PathBuf::from("opers")
}

// =============================================================================
// Timeout Defaults (seconds)
// =============================================================================

pub fn default_idle_timeout() -> u64 {
    600
}

pub fn default_reconnect_delay() -> u64 {
    30
}

pub fn default_quit_grace() -> u64 {
    4
}
