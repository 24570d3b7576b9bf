//! Big-endian reads over the raw index bytes.
//!
//! Two tiers: the fallible reads are for parse time, before a layout has
//! been validated against the file length; the direct reads are for the
//! query path, whose positions are guaranteed in-bounds by that
//! validation.

use rgit_hash::ObjectId;

use crate::IdxError;

/// Bounds-checked big-endian u32 read.
pub(crate) fn read_u32(data: &[u8], at: usize) -> Result<u32, IdxError> {
    match data.get(at..at + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(IdxError::Corrupt(format!(
            "truncated 4-byte read at offset {at} ({} bytes total)",
            data.len()
        ))),
    }
}

/// Big-endian u32 at a position validated in-bounds at open time.
#[inline]
pub(crate) fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(data[at..at + 4].try_into().expect("validated 4-byte read"))
}

/// Big-endian u64 at a position validated in-bounds at open time.
#[inline]
pub(crate) fn u64_at(data: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(data[at..at + 8].try_into().expect("validated 8-byte read"))
}

/// Raw id bytes at a position validated in-bounds at open time.
#[inline]
pub(crate) fn oid_at(data: &[u8], at: usize) -> &[u8; ObjectId::RAW_LEN] {
    data[at..at + ObjectId::RAW_LEN]
        .try_into()
        .expect("validated 20-byte read")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u32_in_bounds() {
        let data = [0x00, 0x00, 0x01, 0x02, 0xff];
        assert_eq!(read_u32(&data, 0).unwrap(), 0x0102);
        assert_eq!(read_u32(&data, 1).unwrap(), 0x000102ff);
    }

    #[test]
    fn read_u32_past_end() {
        let data = [0u8; 5];
        let err = read_u32(&data, 2).unwrap_err();
        assert!(matches!(err, IdxError::Corrupt(_)));
    }

    #[test]
    fn direct_reads() {
        let mut data = vec![0u8; 32];
        data[4..8].copy_from_slice(&0xdead_beefu32.to_be_bytes());
        data[8..16].copy_from_slice(&0x1_0000_0000u64.to_be_bytes());
        assert_eq!(u32_at(&data, 4), 0xdead_beef);
        assert_eq!(u64_at(&data, 8), 0x1_0000_0000);
        assert_eq!(oid_at(&data, 12)[4..12], 0u64.to_be_bytes());
    }
}
