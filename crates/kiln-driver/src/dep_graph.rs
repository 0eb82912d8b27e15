//! Package dependency graph

use std::collections::{BTreeMap, BTreeSet};

use crate::BuildError;

/// Package path → paths it imports directly.
///
/// Intrinsic packages never appear: they are neither expanded nor listed
/// as children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepGraph {
    packages: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with its direct imports
    pub fn add_package(&mut self, path: impl Into<String>, imports: impl IntoIterator<Item = String>) {
        self.packages.insert(path.into(), imports.into_iter().collect());
    }

    /// Check if the graph contains a package
    pub fn contains(&self, path: &str) -> bool {
        self.packages.contains_key(path)
    }

    pub fn imports_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.packages.get(path)
    }

    /// All package paths, sorted
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Linearize the graph, dependencies first.
    ///
    /// Works in rounds over a copy of the graph: each round walks the
    /// remaining packages in sorted order and takes every package whose
    /// import set is empty at that moment, removing it from the other sets
    /// right away. A package freed earlier in a round is therefore taken
    /// later in the same round. Imports that are not packages of the graph
    /// are ignored.
    pub fn topological_sort(&self) -> Result<Vec<String>, BuildError> {
        let mut remaining = self.working_copy();
        let mut sorted = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let keys: Vec<String> = remaining.keys().cloned().collect();
            let before = sorted.len();

            for key in keys {
                let is_leaf = remaining.get(&key).map_or(false, BTreeSet::is_empty);
                if !is_leaf {
                    continue;
                }
                remaining.remove(&key);
                for imports in remaining.values_mut() {
                    imports.remove(&key);
                }
                sorted.push(key);
            }

            if sorted.len() == before {
                return Err(BuildError::CyclicDependency {
                    cycle: remaining.into_keys().collect(),
                });
            }
        }

        Ok(sorted)
    }

    /// Group packages into levels: every package's imports lie in earlier
    /// levels, so the packages of one level could be compiled in parallel.
    pub fn levels(&self) -> Result<Vec<Vec<String>>, BuildError> {
        let mut remaining = self.working_copy();
        let mut levels = Vec::new();

        while !remaining.is_empty() {
            let level: Vec<String> = remaining
                .iter()
                .filter(|(_, imports)| imports.is_empty())
                .map(|(path, _)| path.clone())
                .collect();

            if level.is_empty() {
                return Err(BuildError::CyclicDependency {
                    cycle: remaining.into_keys().collect(),
                });
            }

            for path in &level {
                remaining.remove(path);
            }
            for imports in remaining.values_mut() {
                imports.retain(|dep| !level.contains(dep));
            }
            levels.push(level);
        }

        Ok(levels)
    }

    fn working_copy(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.packages
            .iter()
            .map(|(path, imports)| {
                let known = imports
                    .iter()
                    .filter(|dep| self.packages.contains_key(*dep))
                    .cloned()
                    .collect();
                (path.clone(), known)
            })
            .collect()
    }
}
