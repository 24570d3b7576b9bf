use crate::{HashError, ObjectId};

/// Streaming SHA-1 with collision detection.
///
/// Wraps `sha1_checked` behind a small facade. Data is fed incrementally
/// with [`update`](Hasher::update) or the [`std::io::Write`] impl, then
/// finalised into an [`ObjectId`].
pub struct Hasher {
    inner: Box<sha1_checked::Sha1>,
}

impl Hasher {
    pub fn new() -> Self {
        use digest::Digest;
        Self {
            inner: Box::new(sha1_checked::Sha1::new()),
        }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        use digest::Digest;
        self.inner.update(data);
    }

    /// Finalize and return the id.
    ///
    /// Fails if SHA-1 collision detection fires.
    pub fn finalize(self) -> Result<ObjectId, HashError> {
        let result = self.inner.try_finalize();
        if result.has_collision() {
            return Err(HashError::Sha1Collision);
        }
        let mut bytes = [0u8; ObjectId::RAW_LEN];
        bytes.copy_from_slice(result.hash().as_slice());
        Ok(ObjectId::new(bytes))
    }

    /// Convenience: hash a buffer in one call.
    pub fn digest(data: &[u8]) -> Result<ObjectId, HashError> {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
