//! CLI error types.

use fm_cache::CacheError;
use fm_config::ConfigError;
use fm_core::{GenerateError, LoadError, PaginateError, WriteError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("Listing {listing}: {source}")]
    Listing {
        listing: String,
        source: PaginateError,
    },

    #[error("{0}")]
    Generate(#[from] GenerateError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("Cannot save page cache: {0}")]
    Cache(#[from] CacheError),
}
