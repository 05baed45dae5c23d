//! Fast, non-cryptographic content hashing used to detect changed files.

use xxhash_rust::xxh3::xxh3_64;

/// A 64-bit digest of a file's contents at the time it was last parsed.
///
/// This is deliberately not cryptographic: the only requirement is that two
/// byte-identical inputs hash equal and accidental collisions are rare enough
/// to be negligible for change detection, which `xxh3` comfortably satisfies
/// at a fraction of the cost of SHA-256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct FileHash(pub u64);

impl FileHash {
    /// Hashes the given bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(xxh3_64(bytes))
    }
}

impl std::fmt::Display for FileHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hash_equal() {
        assert_eq!(FileHash::of(b"hello world"), FileHash::of(b"hello world"));
    }

    #[test]
    fn different_bytes_hash_different() {
        assert_ne!(FileHash::of(b"hello world"), FileHash::of(b"hello there"));
    }

    proptest::proptest! {
        /// Any two byte-identical inputs hash equal, and hashing is
        /// idempotent (repeated calls on the same bytes agree).
        #[test]
        fn identical_bytes_always_hash_equal(bytes: Vec<u8>) {
            proptest::prop_assert_eq!(FileHash::of(&bytes), FileHash::of(&bytes.clone()));
            proptest::prop_assert_eq!(FileHash::of(&bytes), FileHash::of(&bytes));
        }
    }
}
