//! Scopes and the objects they bind

use std::collections::BTreeMap;
use std::fmt;

use super::Span;

/// What kind of entity an object denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjKind {
    /// Imported package alias
    Pkg,
    Const,
    Type,
    Var,
    Func,
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjKind::Pkg => write!(f, "package"),
            ObjKind::Const => write!(f, "const"),
            ObjKind::Type => write!(f, "type"),
            ObjKind::Var => write!(f, "var"),
            ObjKind::Func => write!(f, "func"),
        }
    }
}

/// A named language entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub kind: ObjKind,
    pub name: String,
    /// Declaration site; `None` for predeclared objects
    pub decl_span: Option<Span>,
}

impl Object {
    pub fn new(kind: ObjKind, name: impl Into<String>, decl_span: Option<Span>) -> Self {
        Self {
            kind,
            name: name.into(),
            decl_span,
        }
    }

    /// Object standing for an imported package alias.
    pub fn package(name: impl Into<String>) -> Self {
        Self::new(ObjKind::Pkg, name, None)
    }

    pub fn is_predeclared(&self) -> bool {
        self.decl_span.is_none()
    }
}

/// A flat name → object table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    objects: BTreeMap<String, Object>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `obj` unless the name is taken; returns the existing object
    /// on collision and leaves the scope unchanged.
    pub fn insert(&mut self, obj: Object) -> Option<&Object> {
        if self.objects.contains_key(&obj.name) {
            return self.objects.get(&obj.name);
        }
        self.objects.insert(obj.name.clone(), obj);
        None
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first() {
        let mut scope = Scope::new();
        let first = Object::new(ObjKind::Var, "x", Some(Span::new(0, 1, 1)));
        let second = Object::new(ObjKind::Func, "x", Some(Span::new(5, 6, 2)));

        assert!(scope.insert(first.clone()).is_none());
        assert_eq!(scope.insert(second), Some(&first));
        assert_eq!(scope.lookup("x").map(|o| o.kind), Some(ObjKind::Var));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_package_object_is_predeclared() {
        let obj = Object::package("fmt");
        assert_eq!(obj.kind, ObjKind::Pkg);
        assert!(obj.is_predeclared());
        assert_eq!(obj.kind.to_string(), "package");
    }
}
