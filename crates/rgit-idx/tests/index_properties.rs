//! Property tests over synthetic indexes: every lookup, iteration, and
//! resolution answer must agree with the entry list the file was built
//! from.

mod common;

use proptest::prelude::*;
use rgit_hash::{AbbreviatedId, ObjectId};
use rgit_idx::PackIndex;

use common::{build_v1, build_v2, write_index};

/// Sorted, deduplicated `(id, offset, crc32)` entries with a mix of
/// 31-bit and 64-bit offsets. CRCs are derived from the id so they are
/// stable and non-trivial.
fn arb_v2_entries() -> impl Strategy<Value = Vec<(ObjectId, u64, u32)>> {
    let offset = prop_oneof![
        3 => 0u64..0x8000_0000,
        1 => 0x8000_0000u64..0x40_0000_0000,
    ];
    proptest::collection::btree_map(any::<[u8; 20]>(), offset, 0..48).prop_map(|map| {
        map.into_iter()
            .map(|(bytes, offset)| {
                let id = ObjectId::new(bytes);
                let crc = crc32fast::hash(id.as_bytes());
                (id, offset, crc)
            })
            .collect()
    })
}

fn arb_v1_entries() -> impl Strategy<Value = Vec<(ObjectId, u32)>> {
    proptest::collection::btree_map(any::<[u8; 20]>(), 0u32..0x8000_0000, 0..48).prop_map(|map| {
        map.into_iter()
            .map(|(bytes, offset)| (ObjectId::new(bytes), offset))
            .collect()
    })
}

proptest! {
    #[test]
    fn v2_lookup_agrees_with_construction(entries in arb_v2_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        prop_assert_eq!(idx.object_count(), entries.len() as u64);
        for (pos, (id, offset, crc)) in entries.iter().enumerate() {
            prop_assert_eq!(idx.oid_at_index(pos as u64), *id);
            prop_assert_eq!(idx.offset_at_index(pos as u64), *offset);
            prop_assert_eq!(idx.find_offset(id), Some(*offset));
            prop_assert_eq!(idx.find_crc32(id).unwrap(), *crc);
            prop_assert!(idx.has(id));
        }
    }

    #[test]
    fn v2_positions_are_strictly_ascending(entries in arb_v2_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        for pos in 1..idx.object_count() {
            prop_assert!(idx.oid_at_index(pos - 1) < idx.oid_at_index(pos));
        }
    }

    #[test]
    fn v2_iteration_matches_positional_access(entries in arb_v2_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        let mut cursor = idx.entries();
        prop_assert_eq!(cursor.len(), entries.len());
        let mut seen = 0u64;
        while let Some(entry) = cursor.next_entry() {
            prop_assert!(entry.id() == &idx.oid_at_index(seen));
            prop_assert_eq!(entry.offset(), idx.offset_at_index(seen));
            seen += 1;
        }
        prop_assert_eq!(seen, idx.object_count());
        prop_assert!(!cursor.has_next());
    }

    #[test]
    fn v2_missing_ids_are_absent_not_errors(entries in arb_v2_entries(), probe in any::<[u8; 20]>()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        let probe = ObjectId::new(probe);
        let present = entries.iter().any(|(id, _, _)| *id == probe);
        prop_assert_eq!(idx.has(&probe), present);
        prop_assert_eq!(idx.find_offset(&probe).is_some(), present);
        if !present {
            prop_assert_eq!(idx.find_offset_raw(&probe), -1);
            prop_assert!(idx.find_crc32(&probe).is_err());
        }
    }

    #[test]
    fn v2_offset64_slots_match_large_offsets(entries in arb_v2_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        let large = entries.iter().filter(|(_, o, _)| *o >= 1 << 31).count();
        prop_assert_eq!(idx.offset64_count(), large as u64);
    }

    #[test]
    fn v2_full_length_abbreviations_resolve_uniquely(entries in arb_v2_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v2(&entries));
        let idx = PackIndex::open(&path).unwrap();

        for (id, _, _) in &entries {
            let abbrev = AbbreviatedId::from_hex(&id.to_hex()).unwrap();
            let mut matches = Vec::new();
            idx.resolve(&mut matches, &abbrev, entries.len());
            prop_assert_eq!(&matches, &vec![*id]);
        }
    }

    #[test]
    fn v1_lookup_agrees_with_construction(entries in arb_v1_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v1(&entries));
        let idx = PackIndex::open(&path).unwrap();

        prop_assert_eq!(idx.version(), 1);
        prop_assert_eq!(idx.object_count(), entries.len() as u64);
        for (pos, (id, offset)) in entries.iter().enumerate() {
            prop_assert_eq!(idx.oid_at_index(pos as u64), *id);
            prop_assert_eq!(idx.find_offset(id), Some(*offset as u64));
        }
    }

    #[test]
    fn v1_iteration_is_ascending_and_complete(entries in arb_v1_entries()) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), "prop.idx", &build_v1(&entries));
        let idx = PackIndex::open(&path).unwrap();

        let collected: Vec<ObjectId> = idx.entries().map(|e| e.id().freeze()).collect();
        let expected: Vec<ObjectId> = entries.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(collected, expected);
    }
}
