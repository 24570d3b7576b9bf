//! Abbreviated-id resolution.
//!
//! Expands a hex prefix into the full ids that carry it, so callers can
//! tell "no such object" from "resolved" from "ambiguous" by how many
//! ids come back.

use std::cmp::Ordering;

use rgit_hash::{AbbreviatedId, ObjectId};

use crate::index::PackIndex;

impl PackIndex {
    /// Append every id starting with `abbrev` to `matches`, in ascending
    /// order, stopping once `matches` holds `limit + 1` ids.
    ///
    /// The one-past-the-limit entry lets callers detect ambiguity without
    /// collecting every match. `matches` may already hold ids from other
    /// indexes; the limit applies to the collection as a whole.
    pub fn resolve(&self, matches: &mut Vec<ObjectId>, abbrev: &AbbreviatedId, limit: usize) {
        // Two or more nibbles pin the leading byte to one fan-out bucket.
        // A single nibble spans the contiguous 16-bucket group sharing
        // that high nibble.
        let range = if abbrev.hex_len() >= 2 {
            self.fanout().range(abbrev.first_byte())
        } else {
            self.fanout().nibble_range(abbrev.first_nibble())
        };

        // lower bound: first position whose id is not below the prefix
        let mut lo = range.start;
        let mut hi = range.end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if abbrev.cmp_prefix(self.oid_bytes_at(mid)) == Ordering::Greater {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let mut pos = lo;
        while pos < range.end && matches.len() <= limit {
            let candidate = self.oid_bytes_at(pos);
            if !abbrev.matches_bytes(candidate) {
                break;
            }
            matches.push(ObjectId::new(*candidate));
            pos += 1;
        }
    }
}
