//! Config module - INI files and the user's computing environment

mod environment;
mod ini;

pub use environment::{environment, environment_in, Environment, DEFAULT_CONFIG_FILE};
pub use ini::IniConfig;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },
    #[error("Invalid value '{value}' for '{key}' in section [{section}]")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
    #[error("Cannot determine the home directory")]
    NoHomeDir,
}
