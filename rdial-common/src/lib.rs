//! # rdial Common Library
//!
//! Shared code for the rdial workspace:
//! - Error type used by configuration loading
//! - TOML bootstrap configuration and config file resolution
//! - Station range parsing

pub mod config;
pub mod error;

pub use config::{ConfigSource, TomlConfig};
pub use error::{Error, Result};
