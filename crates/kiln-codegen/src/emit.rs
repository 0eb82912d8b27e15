//! x86-64 GAS text emission

use std::fmt::Write;

use kiln_ast::{Decl, FileSet, FuncDecl, Span};
use kiln_ir::{asm_name, method_asm_name, PkgContainer, SymbolKind, TypeRegistry};

use crate::{Backend, CodegenError};

/// Emits one package as AT&T-syntax assembly text.
#[derive(Debug, Default)]
pub struct AsmGenerator {
    /// Annotate every emitted symbol with a comment
    pub debug: bool,
}

impl AsmGenerator {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn emit_data(&self, out: &mut String, pkg: &PkgContainer) -> Result<(), CodegenError> {
        writeln!(out, ".data")?;
        for sym in pkg.symbols.iter().filter(|s| s.kind == SymbolKind::Var) {
            if self.debug {
                writeln!(out, "# var {}", sym.name)?;
            }
            writeln!(out, "{}: # 8 bytes", sym.asm_name)?;
            writeln!(out, "  .quad 0")?;
        }
        Ok(())
    }

    fn emit_text(&self, out: &mut String, pkg: &PkgContainer, files: &FileSet) -> Result<(), CodegenError> {
        writeln!(out, ".text")?;

        if self.debug {
            writeln!(out, "# initializes package-level variables")?;
        }
        writeln!(out, "{}.__initVars:", pkg.name)?;
        writeln!(out, "  ret")?;

        for decl in pkg.decls() {
            let Decl::Func(func) = &decl.value else {
                continue;
            };
            // Body-less declarations are implemented in a static .s file
            if !func.has_body {
                continue;
            }
            self.emit_func(out, pkg, files, func)?;
        }
        Ok(())
    }

    fn emit_func(
        &self,
        out: &mut String,
        pkg: &PkgContainer,
        files: &FileSet,
        func: &FuncDecl,
    ) -> Result<(), CodegenError> {
        let name = &func.name.value.name;
        let label = match &func.recv {
            Some(recv) => method_asm_name(&pkg.name, &recv.base_type.value.name, name),
            None => asm_name(&pkg.name, name),
        };

        let (file_no, line, column) = self.location(pkg, files, func.name.span)?;

        if self.debug {
            let what = if func.is_method() { "method" } else { "func" };
            writeln!(out, "# {} {}: {} params, {} results", what, name, func.params.len(), func.results.len())?;
        }
        writeln!(out, "{}:", label)?;
        writeln!(out, "  .loc {} {} {}", file_no, line, column)?;
        writeln!(out, "  pushq %rbp")?;
        writeln!(out, "  movq %rsp, %rbp")?;
        writeln!(out, "  leave")?;
        writeln!(out, "  ret")?;
        Ok(())
    }

    fn location(&self, pkg: &PkgContainer, files: &FileSet, span: Span) -> Result<(usize, usize, usize), CodegenError> {
        let source = files
            .get(span.file_id)
            .ok_or_else(|| CodegenError::at(format!("unknown file id {}", span.file_id), span))?;
        let file_no = pkg
            .file_no(&source.path)
            .ok_or_else(|| CodegenError::at(format!("{} is not part of package {}", source.path, pkg.path), span))?;
        let pos = source.position(span.start);
        Ok((file_no, pos.line, pos.column))
    }

    fn emit_type_descriptors(
        &self,
        out: &mut String,
        pkg: &PkgContainer,
        registry: &TypeRegistry,
    ) -> Result<(), CodegenError> {
        if pkg.type_ids.is_empty() {
            return Ok(());
        }
        writeln!(out, ".data")?;
        for &id in &pkg.type_ids {
            let ty = registry
                .get(id)
                .ok_or_else(|| CodegenError::new(format!("{} is not registered", id)))?;
            if self.debug {
                writeln!(out, "# type {}", ty.qualified_name)?;
            }
            writeln!(out, "{}.__type.{}:", pkg.name, id.0)?;
            writeln!(out, "  .quad {}", id.0)?;
            writeln!(out, "  .quad {}", ty.qualified_name.len())?;
            writeln!(out, "  .string \"{}\"", ty.qualified_name)?;
        }
        Ok(())
    }
}

impl Backend for AsmGenerator {
    fn generate(&mut self, pkg: &PkgContainer, registry: &TypeRegistry, files: &FileSet) -> Result<String, CodegenError> {
        let mut out = String::new();
        if self.debug {
            writeln!(out, "# package {} ({})", pkg.name, pkg.path)?;
        }
        self.emit_data(&mut out, pkg)?;
        self.emit_text(&mut out, pkg, files)?;
        self.emit_type_descriptors(&mut out, pkg, registry)?;
        Ok(out)
    }
}
