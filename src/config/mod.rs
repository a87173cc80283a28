//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, TimeoutsConfig) and loading
//! - [`defaults`]: Serde default value functions
//! - [`validation`]: Startup validation of identity and timeouts
//! - [`opers`]: The hostmask authorization list (OperList)

mod defaults;
mod opers;
mod types;
mod validation;

pub use opers::{Capability, OperList};
pub use types::{Config, Endpoint, Identity};
pub use validation::MAX_NAME_LEN;
