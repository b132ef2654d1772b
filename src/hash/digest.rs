use core::fmt;
use serde::{Deserialize, Serialize};

/// Size in bytes of every digest handled by this crate.
pub const DIGEST_SIZE: usize = 32;

/// Canonical 32-byte digest used for tree nodes, roots and decommitments.
///
/// Equality is byte-wise; a digest is immutable once produced.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Digest {
    bytes: [u8; DIGEST_SIZE],
}

impl Digest {
    /// Constructs a digest from raw bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the canonical all-zero digest.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; DIGEST_SIZE],
        }
    }

    /// Returns the canonical byte representation.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.bytes
    }

    /// Consumes the digest and returns the underlying byte array.
    pub const fn into_bytes(self) -> [u8; DIGEST_SIZE] {
        self.bytes
    }

    /// Mutable view into the digest bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; DIGEST_SIZE] {
        &mut self.bytes
    }

    /// Returns a helper that formats the digest as lowercase hexadecimal.
    pub fn to_hex(&self) -> HexOutput {
        HexOutput(self.bytes)
    }
}

impl From<[u8; DIGEST_SIZE]> for Digest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_SIZE] {
    fn from(digest: Digest) -> Self {
        digest.into_bytes()
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(0x{})", self.to_hex())
    }
}

/// Hexadecimal representation of a digest.
#[derive(Clone, Copy)]
pub struct HexOutput([u8; DIGEST_SIZE]);

impl fmt::Display for HexOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
