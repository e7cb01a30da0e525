//! AES-128 CMAC with constant-time verification
//!
//! This is the only place in the crate where AES is invoked. The construction
//! is the standard one from RFC 4493 (CBC-MAC with subkey derivation for the
//! final block), provided by the RustCrypto `cmac` crate.

use crate::types::{AuthCode, SymmetricKey, AUTH_CODE_LEN};
use aes::Aes128;
use cmac::digest::generic_array::GenericArray;
use cmac::{Cmac, Mac};
use subtle::ConstantTimeEq;

type Aes128Cmac = Cmac<Aes128>;

/// Calculate AES-128 CMAC over `message`
///
/// Deterministic: identical `(message, key)` always yields identical output.
pub fn compute_auth_code(message: &[u8], key: &SymmetricKey) -> AuthCode {
    let mut mac = Aes128Cmac::new(GenericArray::from_slice(key.as_slice()));
    mac.update(message);
    let tag = mac.finalize().into_bytes();

    let mut out = [0u8; AUTH_CODE_LEN];
    out.copy_from_slice(&tag);
    AuthCode::from(out)
}

/// Verify `expected` against the CMAC of `message` using constant-time comparison
pub fn verify_auth_code(message: &[u8], key: &SymmetricKey, expected: &AuthCode) -> bool {
    let calculated = compute_auth_code(message, key);
    calculated.as_slice().ct_eq(expected.as_slice()).into()
}
