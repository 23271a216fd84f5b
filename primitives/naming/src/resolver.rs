//! Collision-free name minting.

use std::collections::BTreeSet;

use crate::casing::{escape_keyword, to_pascal_case, to_snake_case};

/// Casing convention applied before collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// Types and enum variants
    Pascal,
    /// Fields, functions, parameters, modules
    Snake,
    /// Keep the candidate as-is
    Verbatim,
}

/// Hands out unique names within one scope.
///
/// Collisions get an incrementing `_N` suffix (`name`, `name_1`, `name_2`).
/// The scan always starts at 1, so the same sequence of requests yields the
/// same names on every run.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    taken: BTreeSet<String>,
}

impl NameResolver {
    /// Create an empty resolver
    pub fn new() -> Self { Self::default() }

    /// Create a resolver that treats `names` as already taken
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { taken: names.into_iter().map(Into::into).collect() }
    }

    /// Mark a name as taken; returns `false` if it already was
    pub fn reserve(&mut self, name: impl Into<String>) -> bool { self.taken.insert(name.into()) }

    /// Whether a name is taken
    pub fn contains(&self, name: &str) -> bool { self.taken.contains(name) }

    /// Number of names handed out or reserved
    pub fn len(&self) -> usize { self.taken.len() }

    /// Whether nothing has been handed out yet
    pub fn is_empty(&self) -> bool { self.taken.is_empty() }

    /// Mint a unique name for `candidate` using `casing`
    pub fn resolve(&mut self, candidate: &str, casing: Casing) -> String {
        let base = match casing {
            Casing::Pascal => to_pascal_case(candidate),
            Casing::Snake => to_snake_case(candidate),
            Casing::Verbatim => candidate.to_string(),
        };
        let base = if base.is_empty() {
            match casing {
                Casing::Pascal => "Anonymous".to_string(),
                _ => "value".to_string(),
            }
        } else {
            base
        };

        let mut attempt = base.clone();
        let mut suffix = 0usize;
        loop {
            let escaped = escape_keyword(&attempt);
            if !self.taken.contains(&escaped) {
                self.taken.insert(escaped.clone());
                return escaped;
            }
            suffix += 1;
            attempt = format!("{}_{}", base, suffix);
        }
    }

    /// Mint a `PascalCase` type name
    pub fn resolve_type(&mut self, candidate: &str) -> String {
        self.resolve(candidate, Casing::Pascal)
    }

    /// Mint a `snake_case` identifier
    pub fn resolve_identifier(&mut self, candidate: &str) -> String {
        self.resolve(candidate, Casing::Snake)
    }
}
