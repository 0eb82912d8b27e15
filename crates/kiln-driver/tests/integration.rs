//! Integration tests for the kiln build pipeline.
//!
//! Each test lays out a small standard library and source tree in a
//! temporary directory, builds it, and inspects the written assembly.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use kiln_driver::{build, BuildConfig, BuildError};
use tempfile::TempDir;

const MAIN_GO: &str = "package main

import (
\t\"fmt\"
\t\"os\"
)

func main() {
\tfmt.Println(os.Args)
}
";

/// A temporary std root, source root and work directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Standard library with the two intrinsics plus `fmt` and `os`.
    fn new() -> Self {
        let ws = Workspace {
            dir: tempfile::tempdir().unwrap(),
        };
        ws.write("std/unsafe/unsafe.go", "package unsafe\n\nfunc Sizeof(x int) uintptr\n");
        ws.write(
            "std/runtime/runtime.go",
            "package runtime\n\nvar heapHead int\n\nfunc init() {\n\theapHead = 0\n}\n\nfunc Syscall(n int) int\n",
        );
        ws.write("std/runtime/syscall.s", "runtime.Syscall:\n  movq %rdi, %rax\n  ret\n");
        ws.write("std/runtime/_.s", "# TEMPLATE DO NOT ASSEMBLE\n");
        ws.write(
            "std/fmt/print.go",
            "package fmt\n\nimport \"unsafe\"\n\nvar wordSize = unsafe.Sizeof(0)\n\nfunc Println(args []string) {\n}\n",
        );
        ws.write(
            "std/os/os.go",
            "package os\n\nvar Args []string\n\nfunc init() {\n\tArgs = nil\n}\n",
        );
        fs::create_dir_all(ws.src_root()).unwrap();
        fs::create_dir_all(ws.workdir()).unwrap();
        ws
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn std_root(&self) -> PathBuf {
        self.dir.path().join("std")
    }

    fn src_root(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    fn workdir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn config(&self) -> BuildConfig {
        BuildConfig::new(self.std_root(), self.src_root()).with_workdir(self.workdir())
    }

    fn artifact(&self, name: &str) -> String {
        fs::read_to_string(self.workdir().join(name)).unwrap()
    }

    fn artifact_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.workdir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn paths(output: &kiln_driver::BuildOutput) -> Vec<&str> {
    output.packages.iter().map(|p| p.path.as_str()).collect()
}

#[test]
fn test_build_fmt_and_os() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);

    let output = build(&ws.config(), &[main]).unwrap();

    assert_eq!(paths(&output), vec!["unsafe", "runtime", "fmt", "os", "main"]);
    assert_eq!(
        ws.artifact_names(),
        vec!["__INIT__.s", "fmt.s", "main.s", "os.s", "runtime.s", "unsafe.s"]
    );
    assert_eq!(output.artifacts.last().unwrap(), &ws.workdir().join("__INIT__.s"));
}

#[test]
fn test_init_routine() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);
    build(&ws.config(), &[main]).unwrap();

    let expected = "\
.text
# Initializes all packages except for runtime
.global __INIT__.init
__INIT__.init:
  callq unsafe.__initVars
  callq runtime.init
  callq fmt.__initVars
  callq os.__initVars
  callq os.init
  callq main.__initVars
  ret
";
    assert_eq!(ws.artifact("__INIT__.s"), expected);
}

#[test]
fn test_artifact_contents() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);
    build(&ws.config(), &[main.clone()]).unwrap();

    let runtime = ws.artifact("runtime.s");
    assert!(runtime.starts_with("#=== Package runtime\n"));
    assert!(runtime.contains(&format!(
        "  .file 1 \"{}\"\n",
        ws.std_root().join("runtime/runtime.go").display()
    )));
    assert!(runtime.contains("# === static assembly "));
    assert!(runtime.contains("runtime.Syscall:\n  movq %rdi, %rax\n  ret\n"));
    assert!(!runtime.contains("TEMPLATE"));

    let main_asm = ws.artifact("main.s");
    assert!(main_asm.starts_with("#=== Package main\n"));
    assert!(main_asm.contains(&format!("  .file 1 \"{}\"\n", main.display())));
    assert!(main_asm.contains("main.main:\n"));
}

#[test]
fn test_missing_package_writes_nothing() {
    let ws = Workspace::new();
    let main = ws.write(
        "app/main.go",
        "package main\n\nimport \"example.com/missing\"\n\nfunc main() {\n}\n",
    );

    match build(&ws.config(), &[main]) {
        Err(BuildError::DirectoryNotFound { package, dir }) => {
            assert_eq!(package, "example.com/missing");
            assert_eq!(dir, ws.src_root().join("example.com/missing"));
        }
        other => panic!("expected DirectoryNotFound, got {:?}", other),
    }
    assert!(ws.artifact_names().is_empty());
}

#[test]
fn test_external_package() {
    let ws = Workspace::new();
    ws.write(
        "src/example.com/lib/util/util.go",
        "package util\n\nimport \"fmt\"\n\nfunc Show() {\n\tfmt.Println(nil)\n}\n",
    );
    let main = ws.write(
        "app/main.go",
        "package main\n\nimport \"example.com/lib/util\"\n\nfunc main() {\n\tutil.Show()\n}\n",
    );

    let output = build(&ws.config(), &[main]).unwrap();

    assert_eq!(paths(&output), vec!["unsafe", "runtime", "fmt", "example.com/lib/util", "main"]);
    assert!(ws.artifact("example.com.lib.util.s").starts_with("#=== Package example.com/lib/util\n"));
    assert!(ws.artifact("__INIT__.s").contains("  callq util.__initVars\n"));
}

#[test]
fn test_import_cycle() {
    let ws = Workspace::new();
    ws.write("std/ping/ping.go", "package ping\n\nimport \"pong\"\n");
    ws.write("std/pong/pong.go", "package pong\n\nimport \"ping\"\n");
    let main = ws.write("app/main.go", "package main\n\nimport \"ping\"\n\nfunc main() {\n}\n");

    match build(&ws.config(), &[main]) {
        Err(BuildError::CyclicDependency { cycle }) => assert_eq!(cycle, vec!["ping", "pong", "ping"]),
        other => panic!("expected CyclicDependency, got {:?}", other),
    }
    assert!(ws.artifact_names().is_empty());
}

#[test]
fn test_duplicate_declaration_across_files() {
    let ws = Workspace::new();
    let a = ws.write("app/a.go", "package main\n\nvar counter int\n\nfunc main() {\n}\n");
    let b = ws.write("app/b.go", "package main\n\nfunc counter() {\n}\n");

    match build(&ws.config(), &[a.clone(), b.clone()]) {
        Err(BuildError::DuplicateDeclaration { package, name, first, second, .. }) => {
            assert_eq!(package, "main");
            assert_eq!(name, "counter");
            assert_eq!(first, a);
            assert_eq!(second, b);
        }
        other => panic!("expected DuplicateDeclaration, got {:?}", other),
    }
    // dependencies compiled before the failing package stay on disk
    assert!(ws.workdir().join("runtime.s").exists());
    assert!(!ws.workdir().join("__INIT__.s").exists());
}

#[test]
fn test_multi_file_main() {
    let ws = Workspace::new();
    let a = ws.write("app/a.go", "package main\n\nfunc main() {\n\thelper(limit)\n}\n");
    let b = ws.write("app/b.go", "package main\n\nconst limit = 10\n\nfunc helper(n int) {\n}\n");

    let output = build(&ws.config(), &[a.clone(), b.clone()]).unwrap();
    assert_eq!(paths(&output), vec!["unsafe", "runtime", "main"]);

    let main_asm = ws.artifact("main.s");
    assert!(main_asm.contains(&format!("  .file 1 \"{}\"\n", a.display())));
    assert!(main_asm.contains(&format!("  .file 2 \"{}\"\n", b.display())));
    assert!(main_asm.contains("main.helper:\n"));
}

#[test]
fn test_type_ids_span_packages() {
    let ws = Workspace::new();
    ws.write("std/fmt/stringer.go", "package fmt\n\ntype Stringer interface {\n\tString() string\n}\n");
    let main = ws.write(
        "app/main.go",
        "package main\n\nimport \"fmt\"\n\ntype point struct {\n\tx int\n}\n\nfunc main() {\n\tfmt.Println(nil)\n}\n",
    );

    build(&ws.config(), &[main]).unwrap();
    assert!(ws.artifact("fmt.s").contains("fmt.__type.1:\n"));
    assert!(ws.artifact("main.s").contains("main.__type.2:\n"));
}

// =============================================================================
// Binary
// =============================================================================

fn kiln(ws: &Workspace) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kiln"));
    cmd.env_remove("KILN_STD_ROOT")
        .env_remove("KILN_SRC_ROOT")
        .env_remove("WORKDIR")
        .env_remove("RUST_LOG")
        .current_dir(ws.dir.path());
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_version() {
    let ws = Workspace::new();
    let output = kiln(&ws).arg("version").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!("kiln version {} linux/amd64\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_cli_imports() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);
    let output = kiln(&ws).arg("imports").arg(&main).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "fmt\nos\n");
}

#[test]
fn test_cli_build_and_deps() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);

    let output = kiln(&ws)
        .arg("deps")
        .arg("--std-root")
        .arg(ws.std_root())
        .arg("--src-root")
        .arg(ws.src_root())
        .arg(&main)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "unsafe\nruntime\nfmt\nos\nmain\n");

    let output = kiln(&ws)
        .env("KILN_STD_ROOT", ws.std_root())
        .env("KILN_SRC_ROOT", ws.src_root())
        .env("WORKDIR", ws.workdir())
        .arg("build")
        .arg("-d")
        .arg(&main)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(ws.workdir().join("__INIT__.s").exists());
    assert!(ws.artifact("main.s").contains("# package main (main)"));
}

#[test]
fn test_cli_failures() {
    let ws = Workspace::new();
    let main = ws.write("app/main.go", MAIN_GO);

    // no standard library root configured
    let output = kiln(&ws).arg("build").arg(&main).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("KILN_STD_ROOT"));

    let bad = ws.write("app/bad.go", "package main\n\nimport (\n\tfmt\n)\n");
    let output = kiln(&ws)
        .arg("build")
        .arg("--std-root")
        .arg(ws.std_root())
        .arg("--src-root")
        .arg(ws.src_root())
        .arg("--workdir")
        .arg(ws.workdir())
        .arg(&bad)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(fs::read_dir(ws.workdir()).unwrap().next().is_none());
    assert!(String::from_utf8_lossy(&output.stderr).contains("E0001"));
}
