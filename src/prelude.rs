//! COTT Prelude
//!
//! Brings the token types, the collaborator traits and the binary I/O traits
//! into scope with one import.
//!
//! # Example
//!
//! ```rust
//! use cott::prelude::*;
//!
//! let validator = Validator::new(MemoryKeyStore::with_demo_device(), MemoryReplayCache::new());
//! let token = Token::generate(DeviceId::from(DEMO_DEVICE_ID), &SymmetricKey::from(DEMO_KEY));
//!
//! let mut wire = Vec::new();
//! token.write_to(&mut wire).unwrap();
//! let read = Token::read_from(&mut wire.as_slice()).unwrap();
//!
//! assert!(validator.validate_token(&read).is_valid());
//! ```

pub use crate::binary::{BinaryRead, BinaryWrite};
pub use crate::error::CottError;
pub use crate::store::{
    KeyStore, MemoryKeyStore, MemoryReplayCache, ReplayCache, DEMO_DEVICE_ID, DEMO_KEY,
};
pub use crate::token::Token;
pub use crate::types::{AuthCode, DeviceId, SymmetricKey};
pub use crate::validate::{Validation, ValidationOutcome, Validator};
