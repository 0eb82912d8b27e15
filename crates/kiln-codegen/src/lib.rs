//! Kiln assembly code generator
//!
//! Turns an analyzed `PkgContainer` into x86-64 GAS text: data slots for
//! package variables, the `__initVars` routine, one frame per function and
//! method, and descriptors for the named types the package interned.

mod emit;
mod error;

pub use emit::AsmGenerator;
pub use error::CodegenError;

use kiln_ast::FileSet;
use kiln_ir::{PkgContainer, TypeRegistry};

/// A code generator producing the body of one package's assembly file.
pub trait Backend {
    fn generate(&mut self, pkg: &PkgContainer, registry: &TypeRegistry, files: &FileSet) -> Result<String, CodegenError>;
}
