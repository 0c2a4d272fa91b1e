//! Unified error handling for the ntup toolkit.
//!
//! Every fallible operation across the workspace returns [`Result`], built on
//! the single [`Error`] enum defined here. Errors propagate upward with `?`;
//! nothing is caught or retried internally.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
