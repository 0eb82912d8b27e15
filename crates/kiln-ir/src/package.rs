//! Compiled package container.

use std::collections::BTreeMap;

use kiln_ast::{Decl, File, Node, Scope, Span};

use crate::TypeId;

/// What a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Var,
    Const,
    Type,
    Func,
    Method,
}

/// Package-level symbol produced by semantic analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Source-level name; for methods the method name alone
    pub name: String,
    /// Name used in the emitted assembly
    pub asm_name: String,
    pub span: Span,
}

/// Everything known about one package while it is being compiled.
#[derive(Debug)]
pub struct PkgContainer {
    /// Name from the package clause
    pub name: String,
    pub path: String,
    /// Parsed files in compilation order
    pub files: Vec<File>,
    /// Top-level objects of all files merged together
    pub scope: Scope,
    /// Source file path to 1-based file number for `.file` directives
    pub file_no_map: BTreeMap<String, usize>,
    /// Filled in by semantic analysis
    pub symbols: Vec<Symbol>,
    /// Named types this package interned into the registry
    pub type_ids: Vec<TypeId>,
    pub has_init_func: bool,
}

impl PkgContainer {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            files: Vec::new(),
            scope: Scope::new(),
            file_no_map: BTreeMap::new(),
            symbols: Vec::new(),
            type_ids: Vec::new(),
            has_init_func: false,
        }
    }

    /// Adds a parsed file and returns its 1-based file number.
    pub fn add_file(&mut self, path: impl Into<String>, file: File) -> usize {
        let file_no = self.files.len() + 1;
        self.file_no_map.insert(path.into(), file_no);
        self.files.push(file);
        file_no
    }

    pub fn file_no(&self, path: &str) -> Option<usize> {
        self.file_no_map.get(path).copied()
    }

    /// File paths ordered by file number.
    pub fn file_paths(&self) -> Vec<(usize, &str)> {
        let mut paths: Vec<_> = self
            .file_no_map
            .iter()
            .map(|(path, &no)| (no, path.as_str()))
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Every top-level declaration, file by file.
    pub fn decls(&self) -> impl Iterator<Item = &Node<Decl>> {
        self.files.iter().flat_map(|file| file.decls.iter())
    }

    /// Whether this is the program's entry package.
    pub fn is_main(&self) -> bool {
        self.name == "main"
    }
}
