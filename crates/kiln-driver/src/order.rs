//! Build order policy and build planning

use std::path::PathBuf;

use tracing::{debug, info};

use crate::collect::{collect_dependencies, collect_direct_imports};
use crate::intrinsic::{is_std, Intrinsic};
use crate::resolver::PackageResolver;
use crate::BuildError;

/// Path and display name of the package assembled from the input files
pub const MAIN_PACKAGE: &str = "main";

/// One package queued for compilation. Immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageToBuild {
    pub path: String,
    /// Last segment of the path, for logs
    pub name: String,
    /// `.go` and `.s` files in compilation order
    pub files: Vec<PathBuf>,
}

impl PackageToBuild {
    pub fn new(path: impl Into<String>, files: Vec<PathBuf>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self { path, name, files }
    }

    /// The entry package built from command-line files.
    pub fn main(files: Vec<PathBuf>) -> Self {
        Self::new(MAIN_PACKAGE, files)
    }
}

/// Final order of the non-main packages: the intrinsics, then standard
/// library packages, then external packages. Within each group the sorted
/// order is kept.
pub fn build_order(sorted: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Intrinsic::ALL.iter().map(|i| i.path().to_string()).collect();

    let rest = sorted.iter().filter(|path| Intrinsic::from_path(path).is_none());
    let (std, external): (Vec<&String>, Vec<&String>) = rest.partition(|path| is_std(path));

    order.extend(std.into_iter().cloned());
    order.extend(external.into_iter().cloned());
    order
}

/// Discover, sort and resolve every package the input files need.
///
/// Nothing is compiled here, so a missing package fails the build before
/// any artifact is written.
pub fn plan_build(resolver: &PackageResolver, inputs: &[PathBuf]) -> Result<Vec<PackageToBuild>, BuildError> {
    let roots = collect_direct_imports(inputs)?;
    debug!(imports = ?roots, "root imports");

    let graph = collect_dependencies(resolver, &roots)?;
    let sorted = graph.topological_sort()?;
    let order = build_order(&sorted);
    info!(packages = order.len() + 1, "build order resolved");

    let mut packages = Vec::with_capacity(order.len() + 1);
    for path in &order {
        let resolved = resolver.resolve(path)?;
        packages.push(PackageToBuild::new(resolved.path, resolved.files));
    }
    packages.push(PackageToBuild::main(inputs.to_vec()));

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_intrinsics_first() {
        let order = build_order(&strings(&["fmt", "example.com/a", "os", "runtime"]));
        assert_eq!(order, strings(&["unsafe", "runtime", "fmt", "os", "example.com/a"]));

        assert_eq!(build_order(&[]), strings(&["unsafe", "runtime"]));
    }

    #[test]
    fn test_groups_keep_sorted_order() {
        let sorted = strings(&["strconv", "github.com/z/y", "errors", "example.com/b"]);
        let order = build_order(&sorted);
        assert_eq!(
            order,
            strings(&["unsafe", "runtime", "strconv", "errors", "github.com/z/y", "example.com/b"])
        );
    }

    #[test]
    fn test_package_names() {
        let pkg = PackageToBuild::new("example.com/lib/util", Vec::new());
        assert_eq!(pkg.name, "util");
        let main = PackageToBuild::main(vec![PathBuf::from("main.go")]);
        assert_eq!(main.path, "main");
        assert_eq!(main.name, "main");
    }
}
