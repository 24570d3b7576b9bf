//! Object identity primitives for the rgit git implementation.
//!
//! This crate provides the 20-byte SHA-1 `ObjectId` used to name every git
//! object, its in-place rewritable counterpart `MutableId`, abbreviated
//! (prefix) identifiers, hex encoding/decoding, the pack index fan-out
//! table, and a collision-detecting SHA-1 hasher.

mod abbrev;
mod error;
pub mod fanout;
pub mod hasher;
pub mod hex;
mod oid;

pub use abbrev::AbbreviatedId;
pub use error::HashError;
pub use oid::{MutableId, ObjectId};
