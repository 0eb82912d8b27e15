//! Dependency discovery

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::intrinsic::Intrinsic;
use crate::resolver::{is_go_file, PackageResolver};
use crate::scanner::scan_imports;
use crate::{BuildError, DepGraph};

/// Direct imports of a set of source files, first occurrence order,
/// duplicates removed. Non-Go files are skipped.
pub fn collect_direct_imports(files: &[PathBuf]) -> Result<Vec<String>, BuildError> {
    let mut seen = BTreeSet::new();
    let mut imports = Vec::new();

    for file in files.iter().filter(|f| is_go_file(f)) {
        for path in scan_imports(file)? {
            if seen.insert(path.clone()) {
                imports.push(path);
            }
        }
    }

    Ok(imports)
}

/// Expand `roots` into the complete graph of packages they depend on.
pub fn collect_dependencies(resolver: &PackageResolver, roots: &[String]) -> Result<DepGraph, BuildError> {
    let mut builder = GraphBuilder::new(resolver);
    for root in roots {
        builder.visit(root)?;
    }
    Ok(builder.finish())
}

/// Depth-first graph expansion.
///
/// Graph keys double as the visited set; `stack` holds the packages being
/// expanded so that a path reached again before it finished is a cycle.
struct GraphBuilder<'r> {
    resolver: &'r PackageResolver,
    graph: DepGraph,
    stack: Vec<String>,
}

impl<'r> GraphBuilder<'r> {
    fn new(resolver: &'r PackageResolver) -> Self {
        Self {
            resolver,
            graph: DepGraph::new(),
            stack: Vec::new(),
        }
    }

    fn visit(&mut self, path: &str) -> Result<(), BuildError> {
        if Intrinsic::from_path(path).is_some() {
            return Ok(());
        }

        if let Some(pos) = self.stack.iter().position(|p| p == path) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(path.to_string());
            return Err(BuildError::CyclicDependency { cycle });
        }

        if self.graph.contains(path) {
            return Ok(());
        }

        let package = self.resolver.resolve(path)?;
        let mut children = BTreeSet::new();
        for file in package.files.iter().filter(|f| is_go_file(f)) {
            let imports = scan_imports(file)?;
            children.extend(imports.into_iter().filter(|dep| Intrinsic::from_path(dep).is_none()));
        }

        debug!(package = path, imports = ?children, "scanned package");
        self.graph.add_package(path, children.iter().cloned());

        self.stack.push(path.to_string());
        for child in &children {
            self.visit(child)?;
        }
        self.stack.pop();

        Ok(())
    }

    fn finish(self) -> DepGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_package(root: &Path, path: &str, imports: &[&str]) {
        let dir = root.join(path);
        fs::create_dir_all(&dir).unwrap();
        let name = path.rsplit('/').next().unwrap();
        let mut source = format!("package {}\n", name);
        for import in imports {
            source.push_str(&format!("import \"{}\"\n", import));
        }
        fs::write(dir.join(format!("{}.go", name)), source).unwrap();
    }

    #[test]
    fn test_collects_transitive_imports() {
        let tmp = tempfile::tempdir().unwrap();
        let std = tmp.path().join("std");
        let src = tmp.path().join("src");
        write_package(&std, "fmt", &["os", "unsafe"]);
        write_package(&std, "os", &["runtime"]);
        write_package(&src, "example.com/util", &["fmt"]);

        let resolver = PackageResolver::new(&std, &src);
        let roots = vec!["example.com/util".to_string(), "os".to_string()];
        let graph = collect_dependencies(&resolver, &roots).unwrap();

        assert_eq!(graph.packages().collect::<Vec<_>>(), vec!["example.com/util", "fmt", "os"]);
        let fmt_imports: Vec<_> = graph.imports_of("fmt").unwrap().iter().cloned().collect();
        assert_eq!(fmt_imports, vec!["os"]);
        assert!(graph.imports_of("os").unwrap().is_empty());
    }

    #[test]
    fn test_cycle_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(tmp.path(), "a", &["b"]);
        write_package(tmp.path(), "b", &["c"]);
        write_package(tmp.path(), "c", &["a"]);

        let resolver = PackageResolver::new(tmp.path(), tmp.path());
        match collect_dependencies(&resolver, &["a".to_string()]) {
            Err(BuildError::CyclicDependency { cycle }) => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_package() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(tmp.path(), "fmt", &["example.com/gone"]);

        let resolver = PackageResolver::new(tmp.path(), tmp.path().join("src"));
        match collect_dependencies(&resolver, &["fmt".to_string()]) {
            Err(BuildError::DirectoryNotFound { package, .. }) => assert_eq!(package, "example.com/gone"),
            other => panic!("expected DirectoryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_imports_dedup() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.go");
        let b = tmp.path().join("b.go");
        let s = tmp.path().join("c.s");
        fs::write(&a, "package main\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n").unwrap();
        fs::write(&b, "package main\nimport \"fmt\"\nimport \"strings\"\n").unwrap();
        fs::write(&s, "not go at all").unwrap();

        let imports = collect_direct_imports(&[a, b, s]).unwrap();
        assert_eq!(imports, vec!["os", "fmt", "strings"]);
    }
}
