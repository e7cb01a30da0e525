//! Cryptographic One-Time Token
//!
//! A COTT is the 33-byte value an OPTIGA Authenticate NBT tag emits on every
//! tap:
//!
//! ```text
//! ┌────────────┬───────────────┬────────────┬──────────────────┐
//! │ header (2) │ device id (7) │ nonce (8)  │ AES-CMAC (16)    │
//! └────────────┴───────────────┴────────────┴──────────────────┘
//!  0            2               9            17                 33
//! ```
//!
//! The MAC covers the first 17 bytes. On the wire the token is URL-safe
//! Base64, which for 33 bytes is always 44 characters without padding.
//!
//! Parsing only checks syntax. Use [`Token::verify`] to check that a token
//! was produced by a tag holding a given key, and a [`crate::ReplayCache`]
//! (or the [`crate::Validator`]) to reject tokens that were already used.

use crate::binary::{read_array, BinaryRead, BinaryWrite};
use crate::cmac::{compute_auth_code, verify_auth_code};
use crate::error::CottError;
use crate::types::{AuthCode, DeviceId, SymmetricKey, AUTH_CODE_LEN, DEVICE_ID_LEN};
use base64::{engine::general_purpose::URL_SAFE as BASE64_URL, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Length of the header in bytes
pub const HEADER_LEN: usize = 2;

/// Length of the random nonce in bytes
pub const NONCE_LEN: usize = 8;

/// Length of an assembled token in bytes
pub const TOKEN_LEN: usize = HEADER_LEN + DEVICE_ID_LEN + NONCE_LEN + AUTH_CODE_LEN;

/// Length of an encoded token in characters
pub const ENCODED_LEN: usize = 44;

/// Header emitted by the first generation T4T plus applet
pub const HEADER_T4T_PLUS: [u8; HEADER_LEN] = [0x00, 0x01];

/// Length of the data covered by the MAC
const SIGNED_LEN: usize = HEADER_LEN + DEVICE_ID_LEN + NONCE_LEN;

/// Cryptographic One-Time Token
#[derive(Clone, Copy)]
pub struct Token {
    header: [u8; HEADER_LEN],
    device_id: DeviceId,
    nonce: [u8; NONCE_LEN],
    auth_code: AuthCode,
}

impl Token {
    /// Create a token from its four fields, validating every length
    pub fn new(
        header: &[u8],
        device_id: &[u8],
        nonce: &[u8],
        auth_code: &[u8],
    ) -> Result<Self, CottError> {
        CottError::check_length("COTT header", HEADER_LEN, header.len())?;
        CottError::check_length("COTT random data", NONCE_LEN, nonce.len())?;

        let mut header_bytes = [0u8; HEADER_LEN];
        header_bytes.copy_from_slice(header);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);

        Ok(Self {
            header: header_bytes,
            device_id: DeviceId::from_slice(device_id)?,
            nonce: nonce_bytes,
            auth_code: AuthCode::from_slice(auth_code)?,
        })
    }

    /// Create a token from already validated parts
    pub fn from_parts(
        header: [u8; HEADER_LEN],
        device_id: DeviceId,
        nonce: [u8; NONCE_LEN],
        auth_code: AuthCode,
    ) -> Self {
        Self {
            header,
            device_id,
            nonce,
            auth_code,
        }
    }

    /// Issue a token the way a tag does: MAC the header, device id and nonce
    /// with the device key
    pub fn issue(
        header: [u8; HEADER_LEN],
        device_id: DeviceId,
        nonce: [u8; NONCE_LEN],
        key: &SymmetricKey,
    ) -> Self {
        let unsigned = AuthCode::from([0u8; AUTH_CODE_LEN]);
        let mut token = Self::from_parts(header, device_id, nonce, unsigned);
        token.auth_code = compute_auth_code(&token.signed_data(), key);
        token
    }

    /// Issue a T4T plus token with a fresh random nonce
    pub fn generate(device_id: DeviceId, key: &SymmetricKey) -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        Self::issue(HEADER_T4T_PLUS, device_id, nonce, key)
    }

    /// Dissemble binary token data (NOT Base64 encoded)
    ///
    /// Only syntax is checked. See [`Token::decode`] for the text form.
    pub fn dissemble(assembled: &[u8]) -> Result<Self, CottError> {
        CottError::check_length("COTT", TOKEN_LEN, assembled.len())?;
        Self::new(
            &assembled[0..2],
            &assembled[2..9],
            &assembled[9..17],
            &assembled[17..TOKEN_LEN],
        )
    }

    /// Decode URL-safe Base64 token data
    ///
    /// Padding must be canonical. Only syntax is checked.
    pub fn decode(encoded: impl AsRef<[u8]>) -> Result<Self, CottError> {
        let assembled = BASE64_URL.decode(encoded)?;
        Self::dissemble(&assembled)
    }

    /// Assemble the binary representation (without Base64 encoding)
    pub fn assemble(&self) -> [u8; TOKEN_LEN] {
        let mut out = [0u8; TOKEN_LEN];
        out[..SIGNED_LEN].copy_from_slice(&self.signed_data());
        out[SIGNED_LEN..].copy_from_slice(self.auth_code.as_slice());
        out
    }

    /// Encode as URL-safe Base64
    pub fn encode(&self) -> String {
        BASE64_URL.encode(self.assemble())
    }

    /// The bytes covered by the MAC: header, device id and nonce
    pub fn signed_data(&self) -> [u8; SIGNED_LEN] {
        let mut out = [0u8; SIGNED_LEN];
        out[..HEADER_LEN].copy_from_slice(&self.header);
        out[HEADER_LEN..HEADER_LEN + DEVICE_ID_LEN].copy_from_slice(self.device_id.as_slice());
        out[HEADER_LEN + DEVICE_ID_LEN..].copy_from_slice(&self.nonce);
        out
    }

    /// Check that the token's MAC was created with `key`
    ///
    /// Does not check whether the token was used before. Use a
    /// [`crate::KeyStore`] to find the key for [`Token::device_id`].
    pub fn verify(&self, key: &SymmetricKey) -> bool {
        verify_auth_code(&self.signed_data(), key, &self.auth_code)
    }

    /// 2 byte header (`00 01` for the first generation T4T plus applet)
    pub fn header(&self) -> &[u8; HEADER_LEN] {
        &self.header
    }

    /// 7 byte NFC UID
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// 8 byte random data
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// 16 byte AES-CMAC over header, UID and nonce
    pub fn auth_code(&self) -> &AuthCode {
        &self.auth_code
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.assemble() == other.assemble()
    }
}

impl Eq for Token {}

impl PartialEq<[u8]> for Token {
    fn eq(&self, other: &[u8]) -> bool {
        self.assemble().as_slice() == other
    }
}

impl PartialEq<[u8; TOKEN_LEN]> for Token {
    fn eq(&self, other: &[u8; TOKEN_LEN]) -> bool {
        &self.assemble() == other
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.assemble().hash(state);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("header", &hex::encode(self.header))
            .field("device_id", &self.device_id)
            .field("nonce", &hex::encode(self.nonce))
            .field("auth_code", &self.auth_code)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Token {
    type Err = CottError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl TryFrom<&[u8]> for Token {
    type Error = CottError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::dissemble(bytes)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Token::decode(&encoded).map_err(de::Error::custom)
    }
}

impl BinaryRead for Token {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let assembled: [u8; TOKEN_LEN] = read_array(reader)?;
        Token::dissemble(&assembled)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

impl BinaryWrite for Token {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.assemble())
    }

    fn serialized_size(&self) -> usize {
        TOKEN_LEN
    }
}
