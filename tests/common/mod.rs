//! Common test utilities for cott integration tests
//!
//! Reference vectors shared by the integration test files.

#![allow(dead_code, unused_imports)]

pub use cott::{
    DeviceId, KeyStore, MemoryKeyStore, MemoryReplayCache, ReplayCache, SymmetricKey, Token,
    ValidationOutcome, Validator,
};

/// Header of the reference token
pub const HEADER_HEX: &str = "0001";

/// Device id of the reference token
pub const UID_HEX: &str = "02030405060708";

/// Nonce of the reference token
pub const NONCE_HEX: &str = "090a0b0c0d0e0f10";

/// Key the reference token was issued with
pub const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f";

/// Same key with the last byte changed
pub const WRONG_KEY_HEX: &str = "000102030405060708090a0b0c0d0eff";

/// AES-CMAC of the reference token
pub const MAC_HEX: &str = "dbab59423fbec5a7be32c48ce1a80e33";

/// URL-safe Base64 form of the reference token
pub const ENCODED: &str = "AAECAwQFBgcICQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z";

/// Reference token with the device id zeroed
pub const ENCODED_UNKNOWN_UID: &str = "AAEAAAAAAAAACQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z";

/// Reference token with every MAC byte set to 0xFF
pub const ENCODED_WRONG_MAC: &str = "AAECAwQFBgcICQoLDA0ODxD_____________________";

pub fn bytes(s: &str) -> Vec<u8> {
    hex::decode(s).expect("test vector is valid hex")
}

/// The reference token, built field by field
pub fn reference_token() -> Token {
    Token::new(
        &bytes(HEADER_HEX),
        &bytes(UID_HEX),
        &bytes(NONCE_HEX),
        &bytes(MAC_HEX),
    )
    .expect("reference token fields have valid lengths")
}

pub fn reference_key() -> SymmetricKey {
    SymmetricKey::from_hex(KEY_HEX).expect("reference key is valid")
}

/// Validator whose key store only knows the reference device
pub fn reference_validator() -> Validator<MemoryKeyStore, MemoryReplayCache> {
    let key_store = MemoryKeyStore::new();
    key_store.set(
        DeviceId::from_hex(UID_HEX).expect("reference UID is valid"),
        reference_key(),
    );
    Validator::new(key_store, MemoryReplayCache::new())
}
