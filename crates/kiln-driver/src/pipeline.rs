//! Per-package compilation pipeline
//!
//! Parse → merge scopes → resolve references → check → generate → write.
//! Packages are compiled one at a time in build order; the first failure
//! stops the build, leaving earlier artifacts on disk.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use kiln_ast::{FileSet, Object, Scope};
use kiln_codegen::{AsmGenerator, Backend};
use kiln_ir::{PkgContainer, TypeRegistry};
use kiln_parser::{parse_source, ParseMode};
use kiln_sema::{create_universe, Analyzer, Checker};
use tracing::{debug, info, instrument};

use crate::init::emit_init;
use crate::order::{plan_build, PackageToBuild};
use crate::resolver::{is_go_file, PackageResolver};
use crate::{BuildConfig, BuildError};

// =============================================================================
// Session state
// =============================================================================

/// State shared by every package of one build.
///
/// The type registry is never reset, so type ids keep counting up across
/// packages.
#[derive(Debug)]
pub struct BuildSession {
    pub universe: Scope,
    pub registry: TypeRegistry,
    pub file_set: FileSet,
    pub debug_codegen: bool,
}

impl BuildSession {
    pub fn new(debug_codegen: bool) -> Self {
        Self {
            universe: create_universe(),
            registry: TypeRegistry::new(),
            file_set: FileSet::new(),
            debug_codegen,
        }
    }
}

/// What survives of a package once its artifact is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPackage {
    /// Name from the package clause
    pub name: String,
    pub path: String,
    pub has_init_func: bool,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Compiled packages in build order, `main` last
    pub packages: Vec<CompiledPackage>,
    /// Every written file, `__INIT__.s` last
    pub artifacts: Vec<PathBuf>,
}

/// Artifact file name of a package: `example.com/x/y` → `example.com.x.y.s`
pub fn output_file_name(path: &str) -> String {
    format!("{}.s", path.replace('/', "."))
}

// =============================================================================
// Entry points
// =============================================================================

/// Plan and compile everything the input files need, then emit the init
/// routine.
pub fn build(config: &BuildConfig, inputs: &[PathBuf]) -> Result<BuildOutput, BuildError> {
    let resolver = PackageResolver::from_config(config);
    let packages = plan_build(&resolver, inputs)?;

    let mut session = BuildSession::new(config.debug_codegen);
    let (compiled, mut artifacts) = build_all(&mut session, &packages, &config.workdir)?;
    artifacts.push(emit_init(&config.workdir, &compiled)?);

    info!(packages = compiled.len(), workdir = %config.workdir.display(), "build finished");
    Ok(BuildOutput {
        packages: compiled,
        artifacts,
    })
}

/// Compile `packages` in order, returning the compiled records and the
/// artifact paths.
pub fn build_all(
    session: &mut BuildSession,
    packages: &[PackageToBuild],
    workdir: &Path,
) -> Result<(Vec<CompiledPackage>, Vec<PathBuf>), BuildError> {
    let mut compiled = Vec::with_capacity(packages.len());
    let mut artifacts = Vec::with_capacity(packages.len());

    for pkg in packages {
        let (record, artifact) = compile_package(session, pkg, workdir)?;
        compiled.push(record);
        artifacts.push(artifact);
    }

    Ok((compiled, artifacts))
}

/// Run one package through every phase and write its artifact.
#[instrument(skip_all, fields(package = %pkg.path))]
pub fn compile_package(
    session: &mut BuildSession,
    pkg: &PackageToBuild,
    workdir: &Path,
) -> Result<(CompiledPackage, PathBuf), BuildError> {
    info!(files = pkg.files.len(), "compiling {}", pkg.name);

    let (go_files, asm_files): (Vec<&PathBuf>, Vec<&PathBuf>) = pkg.files.iter().partition(|f| is_go_file(f));

    let mut container = load_package(session, pkg, &go_files)?;
    resolve_references(&mut container, &session.universe);

    Checker::new()
        .analyze(&mut session.registry, &mut container)
        .map_err(|source| {
            let path = session
                .file_set
                .get(source.span.file_id)
                .map(|file| PathBuf::from(&file.path))
                .or_else(|| go_files.first().map(|p| p.to_path_buf()))
                .unwrap_or_default();
            BuildError::Semantic {
                package: pkg.path.clone(),
                path,
                source,
            }
        })?;
    debug!(symbols = container.symbols.len(), types = container.type_ids.len(), "analyzed");

    let body = AsmGenerator::new(session.debug_codegen)
        .generate(&container, &session.registry, &session.file_set)
        .map_err(|source| BuildError::Codegen {
            package: pkg.path.clone(),
            source,
        })?;

    let artifact = workdir.join(output_file_name(&pkg.path));
    let contents = render_artifact(&container, &body, &asm_files)?;
    fs::write(&artifact, contents).map_err(|e| BuildError::io(&artifact, e))?;
    debug!(artifact = %artifact.display(), "wrote artifact");

    Ok((
        CompiledPackage {
            name: container.name,
            path: container.path,
            has_init_func: container.has_init_func,
        },
        artifact,
    ))
}

// =============================================================================
// Phases
// =============================================================================

/// Parse the Go files of a package and merge their scopes.
fn load_package(
    session: &mut BuildSession,
    pkg: &PackageToBuild,
    go_files: &[&PathBuf],
) -> Result<PkgContainer, BuildError> {
    let mut container = PkgContainer::new("", pkg.path.as_str());
    let mut origins: HashMap<String, PathBuf> = HashMap::new();

    for path in go_files {
        let source = fs::read_to_string(path).map_err(|e| BuildError::io(*path, e))?;
        let file_path = path.display().to_string();
        let file_id = session.file_set.add_file(file_path.clone(), source.clone());

        let file = parse_source(&source, file_id, ParseMode::Full).map_err(|source| BuildError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if container.name.is_empty() {
            container.name = file.package_name.value.name.clone();
        }

        for obj in file.scope.iter() {
            if container.scope.insert(obj.clone()).is_some() {
                let first = origins.get(&obj.name).cloned().unwrap_or_else(|| path.to_path_buf());
                return Err(BuildError::DuplicateDeclaration {
                    package: pkg.path.clone(),
                    name: obj.name.clone(),
                    first,
                    second: path.to_path_buf(),
                    span: obj.decl_span.unwrap_or_default(),
                });
            }
            origins.insert(obj.name.clone(), path.to_path_buf());
        }

        debug!(file = %file_path, file_id, decls = file.decls.len(), "parsed");
        container.add_file(file_path, file);
    }

    // a package made only of static assembly still needs a symbol prefix
    if container.name.is_empty() {
        container.name = pkg.name.clone();
    }

    Ok(container)
}

/// Bind every unresolved reference of every file.
///
/// Lookup order: the file's own import names, the package scope, the
/// universe. Names found nowhere stay unresolved.
pub fn resolve_references(pkg: &mut PkgContainer, universe: &Scope) {
    let PkgContainer { files, scope, .. } = pkg;
    let mut unresolved = 0;

    for file in files.iter_mut() {
        let imports: HashSet<&str> = file.imports.iter().filter_map(|spec| spec.local_name()).collect();

        for reference in file.unresolved.iter_mut() {
            let obj = if imports.contains(reference.name()) {
                Some(Object::package(reference.name()))
            } else {
                scope
                    .lookup(reference.name())
                    .or_else(|| universe.lookup(reference.name()))
                    .cloned()
            };

            match obj {
                Some(obj) => reference.obj = Some(obj),
                None => unresolved += 1,
            }
        }
    }

    if unresolved > 0 {
        debug!(unresolved, "references left unresolved");
    }
}

/// Header, `.file` directives, generated body, then static assembly files.
fn render_artifact(pkg: &PkgContainer, body: &str, asm_files: &[&PathBuf]) -> Result<String, BuildError> {
    let mut out = format!("#=== Package {}\n", pkg.path);
    for (file_no, path) in pkg.file_paths() {
        out.push_str(&format!("  .file {} \"{}\"\n", file_no, path));
    }
    out.push_str(body);

    for path in asm_files {
        let contents = fs::read_to_string(path).map_err(|e| BuildError::io(*path, e))?;
        out.push_str(&format!("# === static assembly {} ====\n", path.display()));
        out.push_str(&contents);
        if !contents.ends_with('\n') {
            out.push('\n');
        }
    }

    Ok(out)
}
