//! Opening a pack index and querying it independently of its on-disk
//! version.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use memmap2::Mmap;
use rgit_hash::fanout::FanoutTable;
use rgit_hash::hasher::Hasher;
use rgit_hash::{MutableId, ObjectId};

use crate::bytes::read_u32;
use crate::v1::IndexV1;
use crate::v2::IndexV2;
use crate::{IdxError, IDX_SIGNATURE, IDX_VERSION};

/// Combined trailer: 20-byte pack checksum + 20-byte index checksum.
pub(crate) const TRAILER_LEN: usize = 2 * ObjectId::RAW_LEN;

/// An open pack index, either legacy (v1) or current (v2) format.
///
/// Immutable after [`open`](Self::open); lookups from multiple threads
/// need no locking. The only state is the mapped file, the decoded
/// fan-out table, and the trailer checksums.
#[derive(Debug)]
pub enum PackIndex {
    V1(IndexV1),
    V2(IndexV2),
}

impl PackIndex {
    /// Open a pack index file, detecting its format from the first bytes.
    ///
    /// The whole layout is validated against the actual file size and the
    /// trailing SHA-1 checksum is verified, so the query methods never
    /// read out of bounds. The file descriptor is released before this
    /// returns; the mapping keeps the bytes reachable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IdxError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => IdxError::NotFound(path.to_path_buf()),
            _ => unreadable(path, e.into()),
        })?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| unreadable(path, e.into()))?;
        drop(file);

        match Self::parse(data) {
            Ok(index) => Ok(index),
            // version rejection is its own failure, not a decode error
            Err(e @ IdxError::UnsupportedVersion(_)) => Err(e),
            Err(e) => Err(unreadable(path, e)),
        }
    }

    fn parse(data: Mmap) -> Result<Self, IdxError> {
        if data.len() >= IDX_SIGNATURE.len() && data[..IDX_SIGNATURE.len()] == IDX_SIGNATURE {
            let version = read_u32(&data, IDX_SIGNATURE.len())?;
            if version != IDX_VERSION {
                return Err(IdxError::UnsupportedVersion(version));
            }
            verify_trailer(&data)?;
            IndexV2::parse(data).map(Self::V2)
        } else {
            // no magic: the first 8 bytes are fan-out buckets 0 and 1 of
            // a legacy file
            verify_trailer(&data)?;
            IndexV1::parse(data).map(Self::V1)
        }
    }

    /// On-disk format version, 1 or 2.
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(_) => 2,
        }
    }

    /// Number of objects in the index.
    pub fn object_count(&self) -> u64 {
        self.fanout().total() as u64
    }

    /// Number of 64-bit offset slots (always 0 for v1).
    pub fn offset64_count(&self) -> u64 {
        match self {
            Self::V1(_) => 0,
            Self::V2(v2) => v2.offset64_count(),
        }
    }

    /// Whether `id` is present.
    pub fn has(&self, id: &ObjectId) -> bool {
        self.find_offset(id).is_some()
    }

    /// Pack file offset of `id`, or `None` when absent.
    pub fn find_offset(&self, id: &ObjectId) -> Option<u64> {
        match self {
            Self::V1(v1) => v1.find_offset(id),
            Self::V2(v2) => v2.find_offset(id),
        }
    }

    /// [`find_offset`](Self::find_offset) with the `-1` sentinel kept by
    /// ports that prefer a signed offset.
    pub fn find_offset_raw(&self, id: &ObjectId) -> i64 {
        self.find_offset(id).map_or(-1, |offset| offset as i64)
    }

    /// CRC32 of the object's packed representation.
    ///
    /// Fails with [`IdxError::MissingObject`] when `id` is absent and
    /// [`IdxError::CrcUnsupported`] on a v1 index, which stores no CRCs.
    pub fn find_crc32(&self, id: &ObjectId) -> Result<u32, IdxError> {
        match self {
            Self::V1(_) => Err(IdxError::CrcUnsupported),
            Self::V2(v2) => v2.find_crc32(id),
        }
    }

    /// The id at sorted position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= object_count()`.
    pub fn oid_at_index(&self, pos: u64) -> ObjectId {
        ObjectId::new(*self.oid_bytes_at(pos))
    }

    /// The pack file offset at sorted position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= object_count()`.
    pub fn offset_at_index(&self, pos: u64) -> u64 {
        match self {
            Self::V1(v1) => v1.offset_at_index(pos),
            Self::V2(v2) => v2.offset_at_index(pos),
        }
    }

    /// Checksum of the companion pack file, from the index trailer.
    pub fn pack_checksum(&self) -> ObjectId {
        match self {
            Self::V1(v1) => v1.pack_checksum(),
            Self::V2(v2) => v2.pack_checksum(),
        }
    }

    /// The index file's own trailing checksum.
    pub fn index_checksum(&self) -> ObjectId {
        match self {
            Self::V1(v1) => v1.index_checksum(),
            Self::V2(v2) => v2.index_checksum(),
        }
    }

    /// Cursor over all entries in ascending id order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            index: self,
            pos: 0,
            count: self.object_count(),
            entry: IndexEntry {
                id: MutableId::zero(),
                offset: 0,
            },
        }
    }

    pub(crate) fn fanout(&self) -> &FanoutTable {
        match self {
            Self::V1(v1) => v1.fanout(),
            Self::V2(v2) => v2.fanout(),
        }
    }

    pub(crate) fn oid_bytes_at(&self, pos: u64) -> &[u8; ObjectId::RAW_LEN] {
        match self {
            Self::V1(v1) => v1.oid_bytes_at(pos),
            Self::V2(v2) => v2.oid_bytes_at(pos),
        }
    }
}

fn unreadable(path: &Path, source: IdxError) -> IdxError {
    IdxError::Unreadable {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// Verify the trailing SHA-1 over everything before it.
fn verify_trailer(data: &[u8]) -> Result<(), IdxError> {
    if data.len() < TRAILER_LEN {
        return Err(IdxError::Corrupt(format!(
            "{} bytes cannot hold a checksum trailer",
            data.len()
        )));
    }
    let checksum_at = data.len() - ObjectId::RAW_LEN;
    let stored = ObjectId::from_bytes(&data[checksum_at..])?;

    let mut hasher = Hasher::new();
    hasher.update(&data[..checksum_at]);
    let computed = hasher.finalize()?;

    if stored != computed {
        return Err(IdxError::ChecksumMismatch { stored, computed });
    }
    Ok(())
}

/// One index entry as seen through an [`Entries`] cursor.
///
/// The cursor rewrites its single entry in place on every step, so a
/// borrowed entry is only valid until the next advance; callers that
/// need stable values copy it or [`freeze`](MutableId::freeze) the id.
#[derive(Clone, Copy, Debug)]
pub struct IndexEntry {
    id: MutableId,
    offset: u64,
}

impl IndexEntry {
    /// The entry's object id.
    pub fn id(&self) -> &MutableId {
        &self.id
    }

    /// The entry's pack file offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Cursor over the entries of a [`PackIndex`] in ascending id order.
///
/// [`next_entry`](Self::next_entry) reuses one [`IndexEntry`] for the
/// whole traversal and allocates nothing. The [`Iterator`] impl yields
/// by-value copies of that entry for `for`-loop use.
pub struct Entries<'a> {
    index: &'a PackIndex,
    pos: u64,
    count: u64,
    entry: IndexEntry,
}

impl Entries<'_> {
    /// Whether another entry remains.
    pub fn has_next(&self) -> bool {
        self.pos < self.count
    }

    /// Advance to the next entry, overwriting the shared entry in place.
    pub fn next_entry(&mut self) -> Option<&IndexEntry> {
        if self.pos >= self.count {
            return None;
        }
        self.entry.id.set_raw(self.index.oid_bytes_at(self.pos));
        self.entry.offset = self.index.offset_at_index(self.pos);
        self.pos += 1;
        Some(&self.entry)
    }
}

impl Iterator for Entries<'_> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<IndexEntry> {
        self.next_entry().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.pos) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Entries<'_> {}
