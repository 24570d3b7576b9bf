/// Errors produced by hash and object-id operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hex character at position {position}: '{character}'")]
    InvalidHex { position: usize, character: char },

    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("abbreviated id must be 1 to 40 hex digits, got {actual}")]
    InvalidAbbrevLength { actual: usize },

    #[error("fan-out table truncated: expected {expected} bytes, got {actual}")]
    TruncatedFanout { expected: usize, actual: usize },

    #[error("fan-out table decreases at bucket {bucket}")]
    NonMonotonicFanout { bucket: usize },

    #[error("SHA-1 collision detected")]
    Sha1Collision,
}
