//! Pack index v2 reading.
//!
//! After the 8-byte header the file carries the fan-out table and four
//! parallel tables indexed by the same sorted position: ids, CRC32s,
//! 31-bit offsets, and the 64-bit overflow offsets. An offset32 entry
//! with the high bit set stores an overflow slot number in its low 31
//! bits; the slot count is implicit in how many entries carry that bit.

use memmap2::Mmap;
use rgit_hash::fanout::{self, FanoutTable};
use rgit_hash::ObjectId;

use crate::bytes::{oid_at, u32_at, u64_at};
use crate::index::TRAILER_LEN;
use crate::IdxError;

/// Header: 4-byte signature + 4-byte version.
const HEADER_LEN: usize = 8;
/// Marks an offset32 entry that indirects through the 64-bit table.
const LARGE_OFFSET_FLAG: u32 = 0x8000_0000;

/// A v2-format pack index.
#[derive(Debug)]
pub struct IndexV2 {
    data: Mmap,
    fanout: FanoutTable,
    /// Byte position of the sorted id table.
    oid_table: usize,
    /// Byte position of the CRC32 table.
    crc_table: usize,
    /// Byte position of the 31-bit offset table.
    offset32_table: usize,
    /// Byte position of the 64-bit offset table.
    offset64_table: usize,
    offset64_count: u64,
}

impl IndexV2 {
    /// Parse a mapped v2 file. The caller has already matched the header
    /// and verified the trailer checksum.
    pub(crate) fn parse(data: Mmap) -> Result<Self, IdxError> {
        if data.len() < HEADER_LEN + fanout::TABLE_BYTES + TRAILER_LEN {
            return Err(IdxError::Corrupt(format!(
                "index too small: {} bytes",
                data.len()
            )));
        }
        let fanout =
            FanoutTable::from_bytes(&data[HEADER_LEN..HEADER_LEN + fanout::TABLE_BYTES])?;
        let n = fanout.total() as u64;

        // table extents in u64, so a hostile fan-out cannot overflow the
        // arithmetic before it is compared against the real file size
        let oid_table = (HEADER_LEN + fanout::TABLE_BYTES) as u64;
        let crc_table = oid_table + n * ObjectId::RAW_LEN as u64;
        let offset32_table = crc_table + n * 4;
        let offset64_table = offset32_table + n * 4;
        let len = data.len() as u64;
        if len < offset64_table + TRAILER_LEN as u64 {
            return Err(IdxError::Corrupt(format!(
                "truncated index: {len} bytes cannot hold {n} objects"
            )));
        }

        // the 64-bit slot count is implicit: every offset32 entry with
        // the high bit set owns one slot
        let mut offset64_count = 0u64;
        let mut max_slot = None;
        for pos in 0..n {
            let raw = u32_at(&data, (offset32_table + pos * 4) as usize);
            if raw & LARGE_OFFSET_FLAG != 0 {
                offset64_count += 1;
                let slot = raw & !LARGE_OFFSET_FLAG;
                max_slot = Some(max_slot.map_or(slot, |m: u32| m.max(slot)));
            }
        }

        let expected = offset64_table + offset64_count * 8 + TRAILER_LEN as u64;
        if len != expected {
            return Err(IdxError::Corrupt(format!(
                "expected {expected} bytes for {n} objects and {offset64_count} large offsets, \
                 found {len}"
            )));
        }
        if let Some(slot) = max_slot {
            if slot as u64 >= offset64_count {
                return Err(IdxError::Corrupt(format!(
                    "large offset slot {slot} out of range ({offset64_count} slots)"
                )));
            }
        }

        Ok(Self {
            data,
            fanout,
            oid_table: oid_table as usize,
            crc_table: crc_table as usize,
            offset32_table: offset32_table as usize,
            offset64_table: offset64_table as usize,
            offset64_count,
        })
    }

    /// Number of objects in the index.
    pub fn object_count(&self) -> u64 {
        self.fanout.total() as u64
    }

    /// Number of 64-bit offset slots.
    pub fn offset64_count(&self) -> u64 {
        self.offset64_count
    }

    /// Pack file offset of `id`, or `None` when absent.
    pub fn find_offset(&self, id: &ObjectId) -> Option<u64> {
        self.find_position(id).map(|pos| self.offset_at_index(pos))
    }

    /// CRC32 of the packed representation of `id`.
    pub fn find_crc32(&self, id: &ObjectId) -> Result<u32, IdxError> {
        match self.find_position(id) {
            Some(pos) => Ok(self.crc32_at_index(pos)),
            None => Err(IdxError::MissingObject(*id)),
        }
    }

    /// Sorted position of `id` within the index, or `None` when absent.
    pub fn find_position(&self, id: &ObjectId) -> Option<u64> {
        let range = self.fanout.range(id.first_byte());
        let target = id.as_bytes();

        let mut lo = range.start;
        let mut hi = range.end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.oid_bytes_at(mid).cmp(target) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(mid),
            }
        }
        None
    }

    /// The pack file offset at sorted position `pos`, following the
    /// 64-bit indirection when the high bit is set.
    pub fn offset_at_index(&self, pos: u64) -> u64 {
        let raw = u32_at(&self.data, self.offset32_table + pos as usize * 4);
        if raw & LARGE_OFFSET_FLAG == 0 {
            return raw as u64;
        }
        let slot = (raw & !LARGE_OFFSET_FLAG) as usize;
        u64_at(&self.data, self.offset64_table + slot * 8)
    }

    /// The CRC32 at sorted position `pos`.
    pub fn crc32_at_index(&self, pos: u64) -> u32 {
        u32_at(&self.data, self.crc_table + pos as usize * 4)
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
        oid_at(&self.data, self.oid_table + pos as usize * ObjectId::RAW_LEN)
    }
}
