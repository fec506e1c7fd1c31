//! Content hashing for change detection.
//!
//! Uses `rustc_hash::FxHasher`: fast and deterministic, good enough to tell
//! whether a saved file or config actually changed. Identity keys that
//! must not collide use blake3 instead (see [`DeclarationKey`]).
//!
//! [`DeclarationKey`]: crate::core::DeclarationKey

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute("const a = 1;"), compute("const a = 1;"));
        assert_ne!(compute("const a = 1;"), compute("const a = 2;"));
    }
}
