//! Shared synthetic index builders for the integration suites.
//!
//! These produce byte-exact index files (correct fan-out, sorted ids,
//! spilled 64-bit offsets, valid SHA-1 trailer) without going through a
//! pack writer, which this layer does not have.

use std::path::{Path, PathBuf};

use rgit_hash::fanout::FanoutTable;
use rgit_hash::hasher::Hasher;
use rgit_hash::ObjectId;

pub const LARGE_OFFSET_FLAG: u32 = 0x8000_0000;

/// Build a v2 index for `(id, offset, crc32)` entries, in any order.
pub fn build_v2(entries: &[(ObjectId, u64, u32)]) -> Vec<u8> {
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let ids: Vec<ObjectId> = entries.iter().map(|(id, _, _)| *id).collect();

    let mut buf = Vec::new();
    buf.extend_from_slice(&[0xff, 0x74, 0x4f, 0x63]);
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&FanoutTable::build(&ids).to_bytes());

    for (id, _, _) in &entries {
        buf.extend_from_slice(id.as_bytes());
    }
    for (_, _, crc) in &entries {
        buf.extend_from_slice(&crc.to_be_bytes());
    }

    let mut large = Vec::new();
    for (_, offset, _) in &entries {
        if *offset < LARGE_OFFSET_FLAG as u64 {
            buf.extend_from_slice(&(*offset as u32).to_be_bytes());
        } else {
            let slot = large.len() as u32;
            buf.extend_from_slice(&(LARGE_OFFSET_FLAG | slot).to_be_bytes());
            large.push(*offset);
        }
    }
    for offset in &large {
        buf.extend_from_slice(&offset.to_be_bytes());
    }

    finish_with_trailer(buf)
}

/// Build a v1 index for `(id, offset)` entries, in any order.
#[allow(dead_code)]
pub fn build_v1(entries: &[(ObjectId, u32)]) -> Vec<u8> {
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let ids: Vec<ObjectId> = entries.iter().map(|(id, _)| *id).collect();

    let mut buf = Vec::new();
    buf.extend_from_slice(&FanoutTable::build(&ids).to_bytes());
    for (id, offset) in &entries {
        buf.extend_from_slice(&offset.to_be_bytes());
        buf.extend_from_slice(id.as_bytes());
    }

    finish_with_trailer(buf)
}

/// Append a zero pack checksum and the real index checksum.
fn finish_with_trailer(mut buf: Vec<u8>) -> Vec<u8> {
    buf.extend_from_slice(&[0u8; ObjectId::RAW_LEN]);
    let mut hasher = Hasher::new();
    hasher.update(&buf);
    buf.extend_from_slice(
        hasher
            .finalize()
            .expect("synthetic index bytes cannot collide")
            .as_bytes(),
    );
    buf
}

/// Write index bytes under `dir` and return the path.
pub fn write_index(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// A deterministic id: `first` in the fan-out byte, `suffix` at the tail.
#[allow(dead_code)]
pub fn oid(first: u8, suffix: u8) -> ObjectId {
    let mut bytes = [0u8; ObjectId::RAW_LEN];
    bytes[0] = first;
    bytes[19] = suffix;
    ObjectId::new(bytes)
}
