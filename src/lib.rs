//! Cryptographic One-Time Tokens (COTT)
//!
//! A COTT is a 33-byte value emitted by an NFC tag on every tap. It binds the
//! tag's UID and a fresh random nonce with an AES-128 CMAC under a
//! device-specific key, so a backend can tell that the tag was really
//! present and that this exact tap has not been seen before.
//!
//! This crate provides:
//! - Fixed-length value types for UIDs, MACs and keys (keys zeroize on drop)
//! - Binary and URL-safe Base64 codecs for the token
//! - AES-128 CMAC with constant-time verification
//! - [`KeyStore`] and [`ReplayCache`] traits with in-memory implementations
//! - A [`Validator`] implementing the server-side check
//!
//! # Example
//!
//! ```
//! use cott::{SymmetricKey, Token};
//!
//! # fn example() -> Result<(), cott::CottError> {
//! let token = Token::decode("AAECAwQFBgcICQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z")?;
//! assert_eq!(token.device_id().to_string(), "02030405060708");
//!
//! let key = SymmetricKey::from_hex("000102030405060708090a0b0c0d0e0f")?;
//! assert!(token.verify(&key));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod binary;
pub mod cmac;
mod error;
pub mod prelude;
mod store;
mod token;
mod types;
mod validate;

pub use crate::binary::{BinaryRead, BinaryWrite};
pub use crate::cmac::{compute_auth_code, verify_auth_code};
pub use error::CottError;
pub use store::{
    KeyStore, MemoryKeyStore, MemoryReplayCache, ReplayCache, DEMO_DEVICE_ID, DEMO_KEY,
    DEV_KIT_KEY,
};
pub use token::{Token, ENCODED_LEN, HEADER_LEN, HEADER_T4T_PLUS, NONCE_LEN, TOKEN_LEN};
pub use types::{AuthCode, DeviceId, SymmetricKey, AUTH_CODE_LEN, DEVICE_ID_LEN, KEY_LEN};
pub use validate::{Validation, ValidationOutcome, Validator};
