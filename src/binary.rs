//! Traits for reading and writing tokens on byte streams
//!
//! Tokens usually arrive as URL-safe Base64 inside an NDEF URI record, but
//! readers that talk to the tag directly get the raw 33 bytes. These traits
//! let such readers pull a token straight from any `std::io::Read`.

use std::io::{self, Read, Write};

/// Pull a value from its raw wire bytes
///
/// For a token this consumes exactly 33 bytes and fails with
/// `UnexpectedEof` if the stream ends early.
///
/// ```
/// use cott::{BinaryRead, BinaryWrite, Token};
///
/// let token = Token::decode("AAECAwQFBgcICQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z").unwrap();
/// let mut wire = Vec::new();
/// token.write_to(&mut wire).unwrap();
/// assert_eq!(wire.len(), token.serialized_size());
///
/// assert_eq!(Token::read_from(&mut wire.as_slice()).unwrap(), token);
/// assert!(Token::read_from(&mut &wire[..32]).is_err());
/// ```
pub trait BinaryRead: Sized {
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self>;
}

/// Push a value as raw wire bytes (no Base64)
pub trait BinaryWrite {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Number of bytes `write_to` emits; 33 for a token
    fn serialized_size(&self) -> usize;
}

/// Read exactly `N` bytes from a reader
pub fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
