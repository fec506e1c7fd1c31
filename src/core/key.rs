//! Stable declaration identity.

use std::fmt;

/// Opaque, stable identity of a component declaration.
///
/// Derived from the module path and the declaration name, so the same
/// declaration maps to the same key across reloads without relying on
/// reference identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationKey([u8; 16]);

impl DeclarationKey {
    pub fn new(module: &str, name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(module.as_bytes());
        hasher.update(&[0]);
        hasher.update(name.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash.as_bytes()[..16]);
        Self(bytes)
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DeclarationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclarationKey({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for DeclarationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable() {
        let a = DeclarationKey::new("/src/App.jsx", "Counter");
        let b = DeclarationKey::new("/src/App.jsx", "Counter");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 32);
    }

    #[test]
    fn test_key_separates_module_and_name() {
        let a = DeclarationKey::new("/src/App.jsx", "Counter");
        let b = DeclarationKey::new("/src/Other.jsx", "Counter");
        let c = DeclarationKey::new("/src/App.jsxC", "ounter");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
