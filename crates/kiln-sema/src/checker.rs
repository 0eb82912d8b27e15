//! Package-level checks and symbol table construction

use kiln_ast::{Decl, FuncDecl, Node, ObjKind, Span};
use kiln_ir::{asm_name, method_asm_name, PkgContainer, Symbol, SymbolKind, TypeRegistry};

use crate::error::{SemaError, SemaErrorKind};

/// A semantic pass over one package.
///
/// Implementations annotate the container in place: symbols, interned
/// types and the init flag.
pub trait Analyzer {
    fn analyze(&mut self, registry: &mut TypeRegistry, pkg: &mut PkgContainer) -> Result<(), SemaError>;
}

/// The default analyzer
#[derive(Debug, Default)]
pub struct Checker;

impl Checker {
    pub fn new() -> Self {
        Self
    }

    fn check_package_names(&self, pkg: &PkgContainer) -> Result<(), SemaError> {
        for file in &pkg.files {
            let found = &file.package_name.value.name;
            if *found != pkg.name {
                return Err(SemaError::new(
                    SemaErrorKind::PackageNameMismatch {
                        expected: pkg.name.clone(),
                        found: found.clone(),
                    },
                    file.package_name.span,
                ));
            }
        }
        Ok(())
    }

    fn check_init(&self, pkg: &PkgContainer) -> Result<bool, SemaError> {
        let mut seen = false;
        for (func, span) in funcs(pkg).filter(|(f, _)| f.recv.is_none() && f.name.value.name == "init") {
            if seen {
                return Err(SemaError::new(SemaErrorKind::DuplicateInit, func.name.span));
            }
            if !func.params.is_empty() || !func.results.is_empty() || !func.has_body {
                return Err(SemaError::new(SemaErrorKind::InvalidInitSignature, span));
            }
            seen = true;
        }
        Ok(seen)
    }

    fn check_main(&self, pkg: &PkgContainer) -> Result<(), SemaError> {
        if !pkg.is_main() {
            return Ok(());
        }
        let has_main = funcs(pkg).any(|(f, _)| f.recv.is_none() && f.name.value.name == "main");
        if has_main {
            return Ok(());
        }
        let span = pkg
            .files
            .first()
            .map_or(Span::default(), |file| file.package_name.span);
        Err(SemaError::new(SemaErrorKind::MissingMain, span))
    }

    fn collect_symbols(&self, registry: &mut TypeRegistry, pkg: &mut PkgContainer) -> Result<(), SemaError> {
        let mut symbols = Vec::new();
        let mut type_ids = Vec::new();

        for decl in pkg.decls() {
            match &decl.value {
                Decl::Func(func) => match &func.recv {
                    Some(recv) => {
                        let base = &recv.base_type.value.name;
                        let is_type = pkg
                            .scope
                            .lookup(base)
                            .map_or(false, |obj| obj.kind == ObjKind::Type);
                        if !is_type {
                            return Err(SemaError::new(
                                SemaErrorKind::UnknownReceiverType(base.clone()),
                                recv.base_type.span,
                            ));
                        }
                        symbols.push(Symbol {
                            kind: SymbolKind::Method,
                            name: func.name.value.name.clone(),
                            asm_name: method_asm_name(&pkg.name, base, &func.name.value.name),
                            span: func.name.span,
                        });
                    }
                    None => symbols.push(symbol(&pkg.name, SymbolKind::Func, &func.name)),
                },
                Decl::Var(spec) | Decl::Const(spec) => {
                    let kind = match &decl.value {
                        Decl::Var(_) => SymbolKind::Var,
                        _ => SymbolKind::Const,
                    };
                    for name in spec.names.iter().filter(|n| !n.value.is_blank()) {
                        symbols.push(symbol(&pkg.name, kind, name));
                    }
                }
                Decl::Type(spec) => {
                    symbols.push(symbol(&pkg.name, SymbolKind::Type, &spec.name));
                    type_ids.push(registry.intern(&pkg.path, &spec.name.value.name));
                }
            }
        }

        pkg.symbols = symbols;
        pkg.type_ids = type_ids;
        Ok(())
    }
}

impl Analyzer for Checker {
    fn analyze(&mut self, registry: &mut TypeRegistry, pkg: &mut PkgContainer) -> Result<(), SemaError> {
        self.check_package_names(pkg)?;
        pkg.has_init_func = self.check_init(pkg)?;
        self.check_main(pkg)?;
        self.collect_symbols(registry, pkg)
    }
}

fn funcs(pkg: &PkgContainer) -> impl Iterator<Item = (&FuncDecl, Span)> {
    pkg.decls().filter_map(|decl| match &decl.value {
        Decl::Func(func) => Some((func, decl.span)),
        _ => None,
    })
}

fn symbol(pkg_name: &str, kind: SymbolKind, name: &Node<kiln_ast::Ident>) -> Symbol {
    Symbol {
        kind,
        name: name.value.name.clone(),
        asm_name: asm_name(pkg_name, &name.value.name),
        span: name.span,
    }
}
