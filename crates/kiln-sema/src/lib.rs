//! # Kiln Semantic Analysis
//!
//! Package-level checks for the kiln compiler: package clause agreement,
//! `init` and `main` rules, receiver types, and construction of the symbol
//! table and named-type ids that code generation consumes.

mod error;
mod universe;
mod checker;

// Re-export public API
pub use error::{SemaError, SemaErrorKind};
pub use universe::create_universe;
pub use checker::{Analyzer, Checker};

use kiln_ir::{PkgContainer, TypeRegistry};

// =============================================================================
// Public API
// =============================================================================

/// Analyze a package with the default checker
pub fn analyze_package(registry: &mut TypeRegistry, pkg: &mut PkgContainer) -> Result<(), SemaError> {
    Checker::new().analyze(registry, pkg)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_ir::{SymbolKind, TypeId};
    use kiln_parser::{parse_source, ParseMode};

    fn package(path: &str, sources: &[&str]) -> PkgContainer {
        let mut pkg = PkgContainer::new("", path);
        for (i, source) in sources.iter().enumerate() {
            let file = parse_source(source, i + 1, ParseMode::Full).unwrap();
            if pkg.name.is_empty() {
                pkg.name = file.package_name.value.name.clone();
            }
            for obj in file.scope.iter() {
                pkg.scope.insert(obj.clone());
            }
            pkg.add_file(format!("{}/f{}.go", path, i), file);
        }
        pkg
    }

    #[test]
    fn test_symbols_and_types() {
        let mut registry = TypeRegistry::new();
        registry.intern("runtime", "slice");

        let mut pkg = package(
            "os",
            &[
                "package os\ntype File struct{}\nvar Args []string\nfunc (f *File) Write(b []byte) {}\n",
                "package os\nconst O_RDONLY = 0\nfunc Exit(code int) {}\nfunc init() {}\n",
            ],
        );
        analyze_package(&mut registry, &mut pkg).unwrap();

        let names: Vec<_> = pkg.symbols.iter().map(|s| s.asm_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["os.File", "os.Args", "os.$File.Write", "os.O_RDONLY", "os.Exit", "os.init"]
        );
        let write = pkg.symbols.iter().find(|s| s.asm_name == "os.$File.Write").unwrap();
        assert_eq!(write.kind, SymbolKind::Method);
        assert_eq!(pkg.type_ids, vec![TypeId(2)]);
        assert!(pkg.has_init_func);
    }

    #[test]
    fn test_no_init() {
        let mut pkg = package("fmt", &["package fmt\nfunc Println() {}\n"]);
        analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap();
        assert!(!pkg.has_init_func);
    }

    #[test]
    fn test_package_name_mismatch() {
        let mut pkg = package("p", &["package p\n", "package q\n"]);
        let err = analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap_err();
        assert_eq!(
            err.kind,
            SemaErrorKind::PackageNameMismatch {
                expected: "p".to_string(),
                found: "q".to_string(),
            }
        );
        assert_eq!(err.span.file_id, 2);
    }

    #[test]
    fn test_duplicate_init() {
        let mut pkg = package("p", &["package p\nfunc init() {}\n", "package p\nfunc init() {}\n"]);
        let err = analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap_err();
        assert_eq!(err.kind, SemaErrorKind::DuplicateInit);
    }

    #[test]
    fn test_init_with_params() {
        let mut pkg = package("p", &["package p\nfunc init(x int) {}\n"]);
        let err = analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap_err();
        assert_eq!(err.kind, SemaErrorKind::InvalidInitSignature);
    }

    #[test]
    fn test_main_requires_main_func() {
        let mut pkg = package("main", &["package main\nfunc helper() {}\n"]);
        let err = analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap_err();
        assert_eq!(err.kind, SemaErrorKind::MissingMain);
        assert_eq!(err.to_string(), "function main is undeclared in the main package");
    }

    #[test]
    fn test_unknown_receiver() {
        let mut pkg = package("p", &["package p\nvar T int\nfunc (t T) M() {}\n"]);
        let err = analyze_package(&mut TypeRegistry::new(), &mut pkg).unwrap_err();
        assert_eq!(err.kind, SemaErrorKind::UnknownReceiverType("T".to_string()));
    }
}
