use crate::error::Error;

/// Result alias used across all ntup crates.
pub type Result<T> = std::result::Result<T, Error>;
