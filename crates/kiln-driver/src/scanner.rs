//! Import scanning

use std::fs;
use std::path::Path;

use kiln_parser::{parse_source, ParseMode};

use crate::BuildError;

/// Import paths declared by one source file, in declaration order.
///
/// Only the package clause and the import declarations are parsed.
pub fn scan_imports(path: &Path) -> Result<Vec<String>, BuildError> {
    let source = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let file = parse_source(&source, 0, ParseMode::ImportsOnly).map_err(|source| BuildError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.import_paths().map(str::to_string).collect())
}
