//! Kiln Compiler Driver Library
//!
//! Build orchestration for the kiln Go-subset compiler: import scanning,
//! dependency discovery, build ordering, the per-package compilation
//! pipeline (parse → resolve → check → codegen) and the `__INIT__.s`
//! startup routine.

pub mod collect;
pub mod config;
pub mod dep_graph;
pub mod error;
pub mod init;
pub mod intrinsic;
pub mod order;
pub mod pipeline;
pub mod resolver;
pub mod scanner;

pub use collect::{collect_dependencies, collect_direct_imports};
pub use config::{BuildConfig, DEFAULT_WORKDIR};
pub use dep_graph::DepGraph;
pub use error::BuildError;
pub use init::{emit_init, render_init, INIT_FILE_NAME};
pub use intrinsic::{Intrinsic, PackageKind};
pub use order::{build_order, plan_build, PackageToBuild};
pub use pipeline::{build, build_all, compile_package, output_file_name, BuildOutput, BuildSession, CompiledPackage};
pub use resolver::{find_files_in_dir, PackageResolver, ResolvedPackage};
pub use scanner::scan_imports;
