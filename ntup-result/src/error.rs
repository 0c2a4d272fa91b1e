use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all ntup operations.
///
/// The enum covers every failure mode of the toolkit, from page source
/// attachment up to join construction. Internal code matches on specific
/// variants; at API boundaries the `Display` rendering is the user-facing
/// message.
///
/// Two conditions are deliberately *not* errors: loading a row past the end
/// of a processor returns `Ok(None)`, and a failed join lookup marks the
/// entry invalid instead of failing the load.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while opening or reading backing storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow library error during columnar data operations.
    ///
    /// Raised when reading IPC files, building arrays for in-memory tuples,
    /// or converting between Arrow data types.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A field name could not be resolved.
    ///
    /// Raised during index builds, entry lookups, and processor connection
    /// when a qualified field name is absent from the tuple currently
    /// attached.
    #[error("field \"{0}\" not found in the tuple currently connected")]
    UnknownField(String),

    /// A field's type does not support hashing or materialization.
    ///
    /// Only the closed scalar set can be used for index keys; record and
    /// other complex storage types cannot be hashed.
    #[error("fields of type {0} cannot be used here; only scalar field types are supported")]
    UnsupportedField(String),

    /// The number of lookup keys does not match the number of indexed fields.
    #[error("number of key values must match number of indexed fields (expected {expected}, got {actual})")]
    ArityMismatch { expected: usize, actual: usize },

    /// More join fields than the supported maximum were supplied.
    #[error("a maximum of four join fields is allowed (got {0})")]
    TooManyJoinFields(usize),

    /// The same field appears more than once in a join-field list.
    #[error("join fields must be unique (\"{0}\" appears more than once)")]
    DuplicateJoinField(String),

    /// An auxiliary processor's name clashes with the join model.
    ///
    /// Either a field with that name already exists in the primary model, or
    /// another auxiliary with the same name was added earlier. Rename the
    /// auxiliary processor to avoid the conflict.
    #[error("a field or auxiliary processor named \"{0}\" is already present in the join model")]
    NameCollision(String),

    /// An index build exceeded its configured entry capacity.
    #[error("index capacity of {capacity} entries exceeded")]
    IndexTooLarge { capacity: usize },

    /// The page source could not attach to its backing storage.
    #[error("could not attach page source: {0}")]
    AttachFailed(String),

    /// An auxiliary processor was added after processing started.
    ///
    /// Once any row has been loaded, the join model and its entry are live
    /// and can no longer be extended.
    #[error("auxiliary processors cannot be added after processing has started")]
    AddAuxAfterStart,

    /// Invalid user input or API parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error indicating a bug or violated invariant.
    ///
    /// This should never surface during normal operation.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an [`Error::AttachFailed`] from any displayable cause.
    #[inline]
    pub fn attach_failed<E: fmt::Display>(err: E) -> Self {
        Error::AttachFailed(err.to_string())
    }

    /// Create an [`Error::InvalidArgument`] from any displayable cause.
    #[inline]
    pub fn invalid_argument<E: fmt::Display>(err: E) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = Error::UnknownField("run.number".to_string());
        assert!(err.to_string().contains("run.number"));

        let err = Error::ArityMismatch {
            expected: 2,
            actual: 3,
        };
        assert!(err.to_string().contains("expected 2"));
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> crate::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "missing").into())
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }
}
