//! File-level declarations

use super::*;

/// Root AST node - one parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Name from the `package` clause
    pub package_name: Node<Ident>,
    /// Import declarations, in source order
    pub imports: Vec<ImportSpec>,
    /// Top-level declarations (empty when parsed in imports-only mode)
    pub decls: Vec<Node<Decl>>,
    /// Objects declared at file level
    pub scope: Scope,
    /// Identifier references not bound inside the file
    pub unresolved: Vec<IdentRef>,
    /// Index of this file in the shared `FileSet`
    pub file_id: usize,
}

impl File {
    /// Import paths in declaration order.
    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|spec| spec.path.value.as_str())
    }
}

/// A single import spec: `import name "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Explicit local name (`name`, `_` or `.`)
    pub name: Option<Node<Ident>>,
    /// Import path with the quotes stripped
    pub path: Node<String>,
}

impl ImportSpec {
    /// The identifier this import binds in the importing file.
    ///
    /// Blank and dot imports bind nothing addressable.
    pub fn local_name(&self) -> Option<&str> {
        match &self.name {
            Some(name) if name.value.name == "_" || name.value.name == "." => None,
            Some(name) => Some(name.value.name.as_str()),
            None => self.path.value.rsplit('/').next(),
        }
    }
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Var(ValueSpec),
    Const(ValueSpec),
    Type(TypeSpec),
}

impl Decl {
    /// Names this declaration introduces, in order.
    pub fn names(&self) -> Vec<&Node<Ident>> {
        match self {
            Decl::Func(func) => vec![&func.name],
            Decl::Var(spec) | Decl::Const(spec) => spec.names.iter().collect(),
            Decl::Type(spec) => vec![&spec.name],
        }
    }
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Node<Ident>,
    pub recv: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// False for body-less declarations implemented in assembly
    pub has_body: bool,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }
}

/// Method receiver: `(t *T)`
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<Node<Ident>>,
    pub base_type: Node<Ident>,
    pub pointer: bool,
}

/// Parameter or result; unnamed entries only carry their type span
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<Node<Ident>>,
    pub type_span: Span,
}

/// `var`/`const` spec: `a, b T = x, y`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Node<Ident>>,
    pub has_type: bool,
    pub has_values: bool,
}

/// `type` spec: `type T U` or `type T = U`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Node<Ident>,
    pub is_alias: bool,
}

/// Identifier use site awaiting resolution
#[derive(Debug, Clone, PartialEq)]
pub struct IdentRef {
    pub ident: Node<Ident>,
    /// Bound object, filled in by scope resolution
    pub obj: Option<Object>,
}

impl IdentRef {
    pub fn new(ident: Node<Ident>) -> Self {
        Self { ident, obj: None }
    }

    pub fn name(&self) -> &str {
        &self.ident.value.name
    }

    pub fn is_resolved(&self) -> bool {
        self.obj.is_some()
    }
}
