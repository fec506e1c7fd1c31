//! Span-anchored source insertions.
//!
//! All instrumentation is expressed as text inserted at byte offsets of the
//! original source, so the user's code is carried over byte for byte.

/// A batch of insertions applied in one pass.
#[derive(Debug, Default)]
pub struct Insertions {
    items: Vec<(u32, usize, String)>,
}

impl Insertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `text` before byte `pos`. Insertions at the same offset keep
    /// the order they were added in.
    pub fn insert(&mut self, pos: u32, text: impl Into<String>) {
        let seq = self.items.len();
        self.items.push((pos, seq, text.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Apply all insertions to `source`.
    ///
    /// Offsets past the end are clamped to the end of the source.
    pub fn apply(mut self, source: &str) -> String {
        self.items.sort_by_key(|(pos, seq, _)| (*pos, *seq));
        let extra: usize = self.items.iter().map(|(_, _, t)| t.len()).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut cursor = 0usize;
        for (pos, _, text) in &self.items {
            let pos = (*pos as usize).min(source.len());
            out.push_str(&source[cursor..pos]);
            out.push_str(text);
            cursor = pos;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_offset_order() {
        let mut edits = Insertions::new();
        edits.insert(5, "!");
        edits.insert(0, ">");
        assert_eq!(edits.apply("hello world"), ">hello! world");
    }

    #[test]
    fn test_same_offset_keeps_insertion_order() {
        let mut edits = Insertions::new();
        edits.insert(1, "a");
        edits.insert(1, "b");
        assert_eq!(edits.apply("xy"), "xaby");
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let mut edits = Insertions::new();
        edits.insert(99, ";");
        assert_eq!(edits.apply("x"), "x;");
    }
}
