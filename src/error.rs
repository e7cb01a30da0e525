//! Error type for COTT parsing and construction
//!
//! Every failure in this crate is raised synchronously while turning bytes or
//! text into typed values. Authenticity failures are not errors: a token with
//! a wrong MAC is an ordinary `false` from [`crate::Token::verify`].
//!
//! # Example
//!
//! ```
//! use cott::{CottError, Token};
//!
//! let err = Token::decode("MDA=").unwrap_err();
//! assert!(matches!(err, CottError::InvalidLength { expected: 33, got: 2, .. }));
//! assert!(err.is_syntax_error());
//! ```

use thiserror::Error;

/// Unified error type for all COTT operations
///
/// # Error Categories
///
/// - **InvalidLength**: a fixed-width field was given the wrong number of bytes
/// - **Decode**: the text form is not valid URL-safe Base64
/// - **Hex**: a hex-encoded device id, MAC or key could not be parsed
#[derive(Debug, Error)]
pub enum CottError {
    /// A fixed-width field was given the wrong byte count
    #[error("Invalid {field}, must be {expected} bytes long (is {got})")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// Malformed Base64 input
    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Malformed hex input
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl CottError {
    pub(crate) fn check_length(
        field: &'static str,
        expected: usize,
        got: usize,
    ) -> Result<(), CottError> {
        if expected != got {
            return Err(CottError::InvalidLength {
                field,
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Returns true if the error means the candidate token is syntactically
    /// invalid (as opposed to a programming error in hex fixtures)
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::InvalidLength { .. } | Self::Decode(_))
    }

    /// Returns a stable error code for programmatic error handling
    ///
    /// Error codes follow the format: `COTT_E_<CATEGORY>`
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLength { .. } => "COTT_E_LENGTH",
            Self::Decode(_) => "COTT_E_BASE64",
            Self::Hex(_) => "COTT_E_HEX",
        }
    }
}
