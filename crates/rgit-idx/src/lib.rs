//! Pack index (`.idx`) reading and lookup.
//!
//! A pack index is the random-access companion of a pack file: it maps a
//! 20-byte object id to the byte offset of that object inside the pack,
//! in `O(log n)` per lookup. Two on-disk formats exist:
//!
//! - **v1** (legacy): a 256-entry fan-out table followed by `N` 24-byte
//!   records of `u32 offset ‖ id`, sorted by id. No magic, no CRCs, and
//!   offsets are 31-bit so packs past 2 GiB cannot be addressed.
//! - **v2**: a `\377tOc` magic + version header, the fan-out table, then
//!   four parallel tables (ids, CRC32s, 31-bit offsets, and an overflow
//!   table of 64-bit offsets for entries whose 31 bits are not enough).
//!
//! Both end in a 20-byte pack checksum followed by the index's own SHA-1
//! checksum, which [`PackIndex::open`] verifies.
//! All integers are big-endian. Indexes are immutable once opened and
//! safe to share across threads.

mod bytes;
mod index;
mod resolve;
mod v1;
mod v2;

pub use index::{Entries, IndexEntry, PackIndex};
pub use v1::IndexV1;
pub use v2::IndexV2;

use std::path::PathBuf;

use rgit_hash::{HashError, ObjectId};

/// Pack index v2 signature: `\377tOc`.
pub const IDX_SIGNATURE: [u8; 4] = [0xff, 0x74, 0x4f, 0x63];
/// The only versioned format in use.
pub const IDX_VERSION: u32 = 2;

/// Errors that can occur while opening or querying a pack index.
#[derive(Debug, thiserror::Error)]
pub enum IdxError {
    #[error("pack index not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unreadable pack index {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: Box<IdxError>,
    },

    #[error("unsupported pack index version {0}")]
    UnsupportedVersion(u32),

    #[error("corrupt pack index: {0}")]
    Corrupt(String),

    #[error("corrupt object offset at position {position} in legacy index")]
    CorruptOffset { position: u64 },

    #[error("object {0} is not in this pack index")]
    MissingObject(ObjectId),

    #[error("legacy (v1) pack indexes do not store CRC32 values")]
    CrcUnsupported,

    #[error("index checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        stored: ObjectId,
        computed: ObjectId,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hash(#[from] HashError),
}
