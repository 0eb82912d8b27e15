//! Predeclared identifiers

use kiln_ast::{ObjKind, Object, Scope};

const TYPES: &[&str] = &[
    "any", "bool", "byte", "error", "int", "int8", "int16", "int32", "int64", "rune", "string",
    "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

const CONSTS: &[&str] = &["true", "false", "iota"];

const FUNCS: &[&str] = &[
    "append", "cap", "copy", "delete", "len", "make", "new", "panic", "print", "println",
    "recover",
];

/// Builds the universe scope every package resolves against last.
pub fn create_universe() -> Scope {
    let mut universe = Scope::new();

    let predeclared = TYPES
        .iter()
        .map(|name| (ObjKind::Type, name))
        .chain(CONSTS.iter().map(|name| (ObjKind::Const, name)))
        .chain(std::iter::once((ObjKind::Var, &"nil")))
        .chain(FUNCS.iter().map(|name| (ObjKind::Func, name)));

    for (kind, name) in predeclared {
        universe.insert(Object::new(kind, *name, None));
    }
    universe
}
