use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode_prefix, hex_to_string};
use crate::{HashError, ObjectId};

/// An abbreviated object id: a prefix of 1 to 40 hex digits.
///
/// The prefix is kept as a zero-padded 20-byte buffer plus its nibble
/// length, so matching against index entries is byte compares rather than
/// hex formatting. An odd-length abbreviation occupies the high nibble of
/// its final byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AbbreviatedId {
    bytes: [u8; ObjectId::RAW_LEN],
    hex_len: u8,
}

impl AbbreviatedId {
    /// Parse a hex prefix of 1 to 40 digits.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let mut bytes = [0u8; ObjectId::RAW_LEN];
        let hex_len = hex_decode_prefix(hex, &mut bytes)?;
        Ok(Self {
            bytes,
            hex_len: hex_len as u8,
        })
    }

    /// Number of hex digits in the abbreviation.
    pub fn hex_len(&self) -> usize {
        self.hex_len as usize
    }

    /// Whether the abbreviation is a complete 40-digit id.
    pub fn is_complete(&self) -> bool {
        self.hex_len() == ObjectId::HEX_LEN
    }

    /// The first prefix byte. For a single-nibble abbreviation only the
    /// high half is meaningful.
    pub fn first_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// The leading nibble of the prefix.
    pub fn first_nibble(&self) -> u8 {
        self.bytes[0] >> 4
    }

    /// Whether `id` starts with this prefix.
    pub fn matches(&self, id: &ObjectId) -> bool {
        self.matches_bytes(id.as_bytes())
    }

    /// Whether the raw candidate id starts with this prefix.
    pub fn matches_bytes(&self, candidate: &[u8; ObjectId::RAW_LEN]) -> bool {
        self.cmp_prefix(candidate) == Ordering::Equal
    }

    /// Compare this prefix against the equally long prefix of a candidate
    /// id. `Equal` means the candidate carries this abbreviation; `Less`
    /// and `Greater` order the abbreviation relative to the candidate,
    /// which is what a lower-bound search over a sorted id table needs.
    pub fn cmp_prefix(&self, candidate: &[u8; ObjectId::RAW_LEN]) -> Ordering {
        let full_bytes = self.hex_len() / 2;
        match self.bytes[..full_bytes].cmp(&candidate[..full_bytes]) {
            Ordering::Equal if self.hex_len() % 2 == 1 => {
                // the stored half-byte is already zero-padded low
                self.bytes[full_bytes].cmp(&(candidate[full_bytes] & 0xf0))
            }
            ordering => ordering,
        }
    }

    /// The hex form of the prefix, `hex_len` digits long.
    pub fn to_hex(&self) -> String {
        let mut hex = hex_to_string(&self.bytes);
        hex.truncate(self.hex_len());
        hex
    }
}

impl fmt::Display for AbbreviatedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AbbreviatedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbbreviatedId({})", self.to_hex())
    }
}

impl FromStr for AbbreviatedId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
