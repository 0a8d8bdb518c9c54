//! Error types for VBS document writing.
//!
//! Writing a document is infallible at the call site: every view operation
//! returns `()` and the sink latches the first failure it meets. Errors
//! surface when the document is finished, when an encoded body is adopted,
//! or when a serde value cannot be expressed in VBS.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: the packer's underlying writer failed
//! - **Depth Errors**: containers nested deeper than [`PackOptions::max_depth`](crate::PackOptions)
//! - **Raw Body Errors**: an encoded list/dict body is not properly bracketed
//! - **Serde Errors**: unsupported types, non-scalar map keys, custom messages
//!
//! Misusing the container protocol (writing through a closed view, closing a
//! view twice) is a bug in the caller, not an `Error`: it panics.
//!
//! ## Examples
//!
//! ```rust
//! use vbs_writer::{Error, List};
//!
//! let result = List::from_encoded(vec![], vec![0x03, 0x01]);
//! assert!(matches!(result, Err(Error::InvalidRaw { .. })));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while producing VBS output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error while flushing packed bytes
    #[error("IO error: {0}")]
    Io(String),

    /// A container was opened beyond the configured nesting limit
    #[error("Container depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    /// An encoded container body is not bracketed by its open tag and TAIL
    #[error("Invalid encoded {kind}: {reason}")]
    InvalidRaw { kind: &'static str, reason: String },

    /// A dictionary key that is neither an integer nor a string
    #[error("Invalid dictionary key: {0}")]
    InvalidKey(String),

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an error for a malformed encoded container body.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vbs_writer::Error;
    ///
    /// let err = Error::invalid_raw("list", "missing TAIL");
    /// assert!(err.to_string().contains("missing TAIL"));
    /// ```
    pub fn invalid_raw(kind: &'static str, reason: &str) -> Self {
        Error::InvalidRaw {
            kind,
            reason: reason.to_string(),
        }
    }

    /// Creates an invalid key error for map keys VBS cannot carry.
    pub fn invalid_key(msg: &str) -> Self {
        Error::InvalidKey(msg.to_string())
    }

    /// Creates an unsupported type error for types that cannot be written as VBS.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vbs_writer::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
