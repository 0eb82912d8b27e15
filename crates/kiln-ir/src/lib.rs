//! Package-level intermediate representation for the kiln compiler
//!
//! Sits between the parser and code generation: a `PkgContainer` holds one
//! package's parsed files and merged scope while semantic analysis fills in
//! its symbol table, and the `TypeRegistry` collects named types across
//! every package of a build.

pub mod package;
pub mod registry;

pub use package::{PkgContainer, Symbol, SymbolKind};
pub use registry::{NamedType, TypeId, TypeRegistry};

// ============================================================================
// Symbol naming
// ============================================================================

/// Assembly name of a package-level function, variable or type.
pub fn asm_name(pkg: &str, name: &str) -> String {
    format!("{}.{}", pkg, name)
}

/// Assembly name of a method: `<pkg>.$<Type>.<method>`.
pub fn method_asm_name(pkg: &str, type_name: &str, method: &str) -> String {
    format!("{}.${}.{}", pkg, type_name, method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asm_names() {
        assert_eq!(asm_name("fmt", "Println"), "fmt.Println");
        assert_eq!(method_asm_name("os", "File", "Write"), "os.$File.Write");
    }
}
