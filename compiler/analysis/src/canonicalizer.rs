//! Structural deduplication
//!
//! Inline structures with identical shapes share one definition. The first
//! name minted for a shape wins; later occurrences resolve to it.

use std::collections::HashMap;

use ir::TypeShape;

/// Index of minted shapes
#[derive(Debug, Default, Clone)]
pub struct ShapeIndex {
    by_shape: HashMap<TypeShape, String>,
}

impl ShapeIndex {
    /// Create an empty index
    pub fn new() -> Self { Self::default() }

    /// Name already minted for `shape`
    pub fn lookup(&self, shape: &TypeShape) -> Option<&str> {
        self.by_shape.get(shape).map(String::as_str)
    }

    /// Remember `name` as the canonical definition of `shape`.
    ///
    /// Returns the canonical name, which is the earlier one if the shape was
    /// already recorded.
    pub fn record(&mut self, shape: TypeShape, name: &str) -> &str {
        self.by_shape.entry(shape).or_insert_with(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_wins() {
        let mut index = ShapeIndex::new();
        let shape = TypeShape::Enum { values: vec!["a".into()] };
        assert_eq!(index.record(shape.clone(), "First"), "First");
        assert_eq!(index.record(shape.clone(), "Second"), "First");
        assert_eq!(index.lookup(&shape), Some("First"));
        assert_eq!(index.lookup(&TypeShape::Enum { values: vec!["b".into()] }), None);
    }
}
