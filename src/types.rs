//! Fixed-length value types
//!
//! Device identifiers, MACs and keys are byte buffers whose only invariant is
//! their length. Each type validates the length once at construction and is
//! immutable afterwards.

use crate::error::CottError;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of an NFC UID in bytes
pub const DEVICE_ID_LEN: usize = 7;

/// Length of an AES-CMAC in bytes
pub const AUTH_CODE_LEN: usize = 16;

/// Length of an AES-128 key in bytes
pub const KEY_LEN: usize = 16;

macro_rules! fixed_bytes {
    ($name:ident, $len:expr, $field:literal) => {
        impl $name {
            /// Create from a slice, failing unless it has exactly the right length
            pub fn from_slice(bytes: &[u8]) -> Result<Self, CottError> {
                CottError::check_length($field, $len, bytes.len())?;
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }

            /// Parse from a hex string (case-insensitive)
            pub fn from_hex(s: &str) -> Result<Self, CottError> {
                Self::from_slice(&hex::decode(s)?)
            }

            /// Get a reference to the raw bytes
            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            /// Get a copy of the raw bytes
            pub fn to_bytes(&self) -> [u8; $len] {
                self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CottError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                Self::from_slice(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl PartialEq<[u8]> for $name {
            fn eq(&self, other: &[u8]) -> bool {
                self.0.as_slice() == other
            }
        }

        impl FromStr for $name {
            type Err = CottError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }
    };
}

/// 7-byte NFC UID identifying the tag that produced a token
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId([u8; DEVICE_ID_LEN]);

fixed_bytes!(DeviceId, DEVICE_ID_LEN, "7 byte NFC UID");

/// 16-byte AES-CMAC
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthCode([u8; AUTH_CODE_LEN]);

fixed_bytes!(AuthCode, AUTH_CODE_LEN, "AES-CMAC");

impl AuthCode {
    /// Compare against another MAC without leaking the position of the first
    /// differing byte
    pub fn ct_eq(&self, other: &AuthCode) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

/// AES-128 key (16 bytes) that zeroizes on drop
///
/// Only 128-bit keys are supported. The key never appears in `Debug` output
/// and is deliberately not `Hash`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Create a new key from a 16-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CottError> {
        CottError::check_length("AES-128 key", KEY_LEN, bytes.len())?;
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(SymmetricKey(key))
    }

    /// Parse a key from a 32 character hex string
    pub fn from_hex(s: &str) -> Result<Self, CottError> {
        let bytes = Zeroizing::new(hex::decode(s)?);
        Self::from_slice(&bytes)
    }

    /// Get a reference to the key bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for SymmetricKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        SymmetricKey(bytes)
    }
}

impl TryFrom<&[u8]> for SymmetricKey {
    type Error = CottError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SymmetricKey {}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id() {
        let id = DeviceId::from_hex("00010203040506").unwrap();
        assert_eq!(id.as_slice(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(id.to_string(), "00010203040506");
        assert_eq!(format!("{:?}", id), "DeviceId(00010203040506)");
    }

    #[test]
    fn test_device_id_invalid_length() {
        for len in [0, DEVICE_ID_LEN - 1, DEVICE_ID_LEN + 1] {
            let result = DeviceId::from_slice(&vec![0u8; len]);
            assert!(matches!(
                result,
                Err(CottError::InvalidLength { expected: 7, got, .. }) if got == len
            ));
        }
    }

    #[test]
    fn test_auth_code() {
        let mac = AuthCode::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(mac.as_slice(), hex::decode("000102030405060708090a0b0c0d0e0f").unwrap().as_slice());
        assert!(mac.ct_eq(&mac));
        assert!(!mac.ct_eq(&AuthCode::from([0u8; AUTH_CODE_LEN])));
    }

    #[test]
    fn test_auth_code_invalid_length() {
        for len in [0, AUTH_CODE_LEN - 1, AUTH_CODE_LEN + 1] {
            let result = AuthCode::try_from(vec![0u8; len].as_slice());
            assert!(matches!(
                result,
                Err(CottError::InvalidLength { expected: 16, got, .. }) if got == len
            ));
        }
    }

    #[test]
    fn test_key() {
        let key = SymmetricKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let same = SymmetricKey::from([
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
        ]);
        assert_eq!(key, same);
        assert_eq!(key.as_slice().len(), KEY_LEN);
    }

    #[test]
    fn test_key_invalid_length() {
        for len in [0, KEY_LEN - 1, KEY_LEN + 1] {
            let result = SymmetricKey::from_slice(&vec![0u8; len]);
            assert!(matches!(
                result,
                Err(CottError::InvalidLength { expected: 16, got, .. }) if got == len
            ));
        }
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = SymmetricKey::from([0xAB; KEY_LEN]);
        let printed = format!("{:?}", key);
        assert!(!printed.contains("ab"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(
            DeviceId::from_hex("0001020304050"),
            Err(CottError::Hex(_))
        ));
        assert!(matches!(
            SymmetricKey::from_hex("zz0102030405060708090a0b0c0d0e0f"),
            Err(CottError::Hex(_))
        ));
    }
}
