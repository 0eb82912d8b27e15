//! Named types seen during a build.

use std::collections::HashMap;
use std::fmt;

/// Unique identifier of a named type. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type{}", self.0)
    }
}

/// A named type interned by some package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub id: TypeId,
    /// `<pkgpath>.<Name>`
    pub qualified_name: String,
}

/// Registry of named types, shared by every package of one build.
///
/// Ids are never reused, so a type id assigned while compiling an early
/// package stays valid for the packages compiled after it.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<NamedType>,
    index: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `<pkg_path>.<name>`, assigning a new one on first use.
    pub fn intern(&mut self, pkg_path: &str, name: &str) -> TypeId {
        let qualified_name = format!("{}.{}", pkg_path, name);
        if let Some(&id) = self.index.get(&qualified_name) {
            return id;
        }

        let id = TypeId(self.types.len() + 1);
        self.index.insert(qualified_name.clone(), id);
        self.types.push(NamedType {
            id,
            qualified_name,
        });
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&NamedType> {
        id.0.checked_sub(1).and_then(|i| self.types.get(i))
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<TypeId> {
        self.index.get(qualified_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let a = registry.intern("os", "File");
        let b = registry.intern("os", "File");
        assert_eq!(a, b);
        assert_eq!(a, TypeId(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_accumulate_across_packages() {
        let mut registry = TypeRegistry::new();
        registry.intern("runtime", "slice");
        registry.intern("os", "File");
        let id = registry.intern("main", "File");

        assert_eq!(id, TypeId(3));
        assert_eq!(registry.get(id).unwrap().qualified_name, "main.File");
        assert_eq!(registry.lookup("os.File"), Some(TypeId(2)));
        assert_eq!(registry.get(TypeId(0)), None);
    }
}
