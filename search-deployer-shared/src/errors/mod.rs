//! Error types shared by every crate that reads target configuration.

mod config_error;

pub use config_error::ConfigError;
