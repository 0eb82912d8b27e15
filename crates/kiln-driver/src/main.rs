use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kiln_driver::{build, plan_build, scan_imports, BuildConfig, BuildError, PackageResolver, DEFAULT_WORKDIR};

#[derive(Parser)]
#[command(
    name = "kiln",
    version,
    about = "Kiln Go-subset compiler",
    long_about = "Compiles a Go program and every package it imports into\nx86-64 assembly files plus an __INIT__.s startup routine."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile Go files and their dependencies to assembly
    Build {
        /// Source files of the main package
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        roots: RootArgs,

        /// Annotate the generated assembly with comments
        #[arg(short, long)]
        debug_codegen: bool,

        /// Directory receiving the .s files
        #[arg(long, env = "WORKDIR", default_value = DEFAULT_WORKDIR)]
        workdir: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the build order without compiling
    Deps {
        /// Source files of the main package
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        roots: RootArgs,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the imports of a source file (debug)
    Imports {
        /// Input Go file
        file: PathBuf,
    },

    /// Print version information
    Version,
}

#[derive(Args)]
struct RootArgs {
    /// Standard library root
    #[arg(long, env = "KILN_STD_ROOT")]
    std_root: Option<PathBuf>,

    /// Root of external (domain-named) packages
    #[arg(long, env = "KILN_SRC_ROOT")]
    src_root: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            files,
            roots,
            debug_codegen,
            workdir,
            verbose,
        } => build_command(files, roots, debug_codegen, workdir, verbose),
        Commands::Deps { files, roots, verbose } => deps_command(files, roots, verbose),
        Commands::Imports { file } => imports_command(file),
        Commands::Version => {
            println!("kiln version {} linux/amd64", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}

fn build_command(files: Vec<PathBuf>, roots: RootArgs, debug_codegen: bool, workdir: PathBuf, verbose: bool) -> ExitCode {
    init_tracing(verbose);

    let result = BuildConfig::from_options(roots.std_root, roots.src_root, Some(workdir))
        .map(|config| config.with_debug_codegen(debug_codegen))
        .and_then(|config| build(&config, &files));

    match result {
        Ok(output) => {
            if verbose {
                for artifact in &output.artifacts {
                    println!("{}", artifact.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn deps_command(files: Vec<PathBuf>, roots: RootArgs, verbose: bool) -> ExitCode {
    init_tracing(verbose);

    let result = BuildConfig::from_options(roots.std_root, roots.src_root, None).and_then(|config| {
        let resolver = PackageResolver::from_config(&config);
        plan_build(&resolver, &files)
    });

    match result {
        Ok(packages) => {
            for pkg in packages {
                if verbose {
                    println!("{} ({} files)", pkg.path, pkg.files.len());
                } else {
                    println!("{}", pkg.path);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn imports_command(file: PathBuf) -> ExitCode {
    match scan_imports(&file) {
        Ok(imports) => {
            for import in imports {
                println!("{}", import);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print a build error, with a source excerpt when it carries a span.
fn report(err: &BuildError) {
    if let Some((path, span)) = err.location() {
        if let Ok(source) = fs::read_to_string(path) {
            let filename = path.display().to_string();
            let start = span.start.min(source.len());
            let end = span.end.clamp(start, source.len());
            report_error(err.code(), &err.to_string(), label_message(err), start, end, &filename, &source);
            return;
        }
    }
    eprintln!("error: {}", err);
}

fn label_message(err: &BuildError) -> &'static str {
    match err {
        BuildError::Parse { .. } => "syntax error here",
        BuildError::DuplicateDeclaration { .. } => "redeclared here",
        _ => "here",
    }
}

fn report_error(code: &str, title: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) {
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)));

    if printed.is_err() {
        eprintln!("error: {}", title);
    }
}
