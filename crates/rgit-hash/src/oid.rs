use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::HashError;

/// A git object identifier: the SHA-1 of an object's content.
///
/// Ordered lexicographically over the raw bytes, which is the order pack
/// indexes store their entries in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId {
    bytes: [u8; 20],
}

impl ObjectId {
    /// Length of the raw hash in bytes.
    pub const RAW_LEN: usize = 20;
    /// Length of the hex representation.
    pub const HEX_LEN: usize = 40;

    /// The null id (all zeros).
    pub const NULL: Self = Self {
        bytes: [0u8; Self::RAW_LEN],
    };

    /// Create an id from a raw 20-byte array.
    pub const fn new(bytes: [u8; Self::RAW_LEN]) -> Self {
        Self { bytes }
    }

    /// Create an id from a raw byte slice, which must be exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != Self::RAW_LEN {
            return Err(HashError::InvalidHashLength {
                expected: Self::RAW_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; Self::RAW_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Parse a full 40-digit hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        if hex.len() != Self::HEX_LEN {
            return Err(HashError::InvalidHexLength {
                expected: Self::HEX_LEN,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; Self::RAW_LEN];
        hex_decode(hex, &mut bytes)?;
        Ok(Self { bytes })
    }

    /// The raw hash bytes.
    pub const fn as_bytes(&self) -> &[u8; Self::RAW_LEN] {
        &self.bytes
    }

    /// The first byte of the hash, used for fan-out table indexing.
    pub const fn first_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// Whether this is the null (all-zeros) id.
    pub fn is_null(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// The lower-case hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.bytes)
    }
}

// SHA-1 output is uniform, so the first four bytes are hash enough.
impl Hash for ObjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(u32::from_be_bytes([
            self.bytes[0],
            self.bytes[1],
            self.bytes[2],
            self.bytes[3],
        ]));
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl PartialEq<MutableId> for ObjectId {
    fn eq(&self, other: &MutableId) -> bool {
        self.bytes == other.bytes
    }
}

/// An object id rewritten in place, used as the cursor of pack index
/// iteration so a traversal does not allocate per entry.
///
/// Equality and hashing only look at the bytes; a `MutableId` compares
/// equal to an [`ObjectId`] with the same value.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct MutableId {
    bytes: [u8; ObjectId::RAW_LEN],
}

impl MutableId {
    /// A zeroed id, the usual starting state of a cursor.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; ObjectId::RAW_LEN],
        }
    }

    /// Overwrite this id with the given raw bytes.
    pub fn set_raw(&mut self, bytes: &[u8; ObjectId::RAW_LEN]) {
        self.bytes = *bytes;
    }

    /// An immutable copy of the current value.
    pub const fn freeze(&self) -> ObjectId {
        ObjectId::new(self.bytes)
    }

    /// The raw hash bytes.
    pub const fn as_bytes(&self) -> &[u8; ObjectId::RAW_LEN] {
        &self.bytes
    }

    /// The lower-case hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.bytes)
    }
}

impl Hash for MutableId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.freeze().hash(state);
    }
}

impl PartialEq<ObjectId> for MutableId {
    fn eq(&self, other: &ObjectId) -> bool {
        self.bytes == other.bytes
    }
}

impl From<ObjectId> for MutableId {
    fn from(id: ObjectId) -> Self {
        Self { bytes: id.bytes }
    }
}

impl fmt::Display for MutableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MutableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MutableId({})", &self.to_hex()[..8])
    }
}
