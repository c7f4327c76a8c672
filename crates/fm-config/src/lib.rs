//! Configuration management for fledermaus.
//!
//! Two independent kinds of configuration live here:
//!
//! - **Site configuration** ([`load_config`]): a folder of YAML files, one
//!   `base.yml` plus one file per language (`en.yml`, `ru.yml`, ...). Each
//!   language view is the base deep-merged with the language overrides. The
//!   result ([`MergedConfig`]) is handed to every template as `config`.
//! - **Build settings** ([`Settings`]): `fledermaus.toml`, which tells the
//!   command-line build where sources, templates and output live and which
//!   paginated listings to generate. CLI flags override it via
//!   [`CliSettings`].

mod settings;
mod site;
mod yaml;

pub use settings::{CliSettings, ContentSettings, ListingSettings, PathSettings, Settings};
pub use site::{
    ConfigFiles, MergedConfig, deep_merge, get_config_files_list, load_config, merge_configs,
    read_config_files,
};

use std::path::PathBuf;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Invalid glob pattern built from a folder name.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during path expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Settings field path (e.g., "`paths.output_dir`").
        field: String,
        /// Error message.
        message: String,
    },
}
