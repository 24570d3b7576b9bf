//! Legacy (v1) pack index reading.
//!
//! The v1 format has no header: the file opens directly with the 256-entry
//! fan-out table, followed by `N` interleaved records of `u32 offset ‖
//! 20-byte id` sorted by id, then the two-checksum trailer. Offsets are
//! 31-bit; a record with the high bit set is corrupt.

use memmap2::Mmap;
use rgit_hash::fanout::{self, FanoutTable};
use rgit_hash::ObjectId;

use crate::bytes::{oid_at, u32_at};
use crate::index::TRAILER_LEN;
use crate::IdxError;

/// One record: big-endian u32 offset followed by the id.
const RECORD_LEN: usize = 4 + ObjectId::RAW_LEN;
/// Never valid in a v1 offset.
const HIGH_BIT: u32 = 0x8000_0000;

/// A legacy-format pack index.
#[derive(Debug)]
pub struct IndexV1 {
    data: Mmap,
    fanout: FanoutTable,
}

impl IndexV1 {
    /// Parse a mapped v1 file. The caller has already verified the
    /// trailer checksum.
    pub(crate) fn parse(data: Mmap) -> Result<Self, IdxError> {
        if data.len() < fanout::TABLE_BYTES + TRAILER_LEN {
            return Err(IdxError::Corrupt(format!(
                "legacy index too small: {} bytes",
                data.len()
            )));
        }
        let fanout = FanoutTable::from_bytes(&data[..fanout::TABLE_BYTES])?;
        let count = fanout.total();
        if count > i32::MAX as u32 {
            return Err(IdxError::Corrupt(format!(
                "legacy index claims {count} objects, above the format limit"
            )));
        }

        let n = count as usize;
        let expected = fanout::TABLE_BYTES + n * RECORD_LEN + TRAILER_LEN;
        if data.len() != expected {
            return Err(IdxError::Corrupt(format!(
                "expected {expected} bytes for {n} objects, found {}",
                data.len()
            )));
        }

        for position in 0..n {
            if u32_at(&data, record_start(position as u64)) & HIGH_BIT != 0 {
                return Err(IdxError::CorruptOffset {
                    position: position as u64,
                });
            }
        }

        Ok(Self { data, fanout })
    }

    /// Number of objects in the index.
    pub fn object_count(&self) -> u64 {
        self.fanout.total() as u64
    }

    /// Pack file offset of `id`, or `None` when absent.
    pub fn find_offset(&self, id: &ObjectId) -> Option<u64> {
        let range = self.fanout.range(id.first_byte());
        let target = id.as_bytes();

        let mut lo = range.start;
        let mut hi = range.end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.oid_bytes_at(mid).cmp(target) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(self.offset_at_index(mid)),
            }
        }
        None
    }

    /// The pack file offset at sorted position `pos`.
    pub fn offset_at_index(&self, pos: u64) -> u64 {
        u32_at(&self.data, record_start(pos)) as u64
    }

    /// Checksum of the companion pack file.
    pub fn pack_checksum(&self) -> ObjectId {
        ObjectId::new(*oid_at(&self.data, self.data.len() - TRAILER_LEN))
    }

    /// The index file's own trailing checksum.
    pub fn index_checksum(&self) -> ObjectId {
        ObjectId::new(*oid_at(&self.data, self.data.len() - ObjectId::RAW_LEN))
    }

    pub(crate) fn fanout(&self) -> &FanoutTable {
        &self.fanout
    }

    pub(crate) fn oid_bytes_at(&self, pos: u64) -> &[u8; ObjectId::RAW_LEN] {
        oid_at(&self.data, record_start(pos) + 4)
    }
}

fn record_start(pos: u64) -> usize {
    fanout::TABLE_BYTES + pos as usize * RECORD_LEN
}
