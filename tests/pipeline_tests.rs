//! Orchestrator tests against a stub `cargo`.
//!
//! The stub is a shell script: `cargo build` records its arguments and drops a shell-script "driver" where the real
//! binary would land. This exercises staging, compile and execute failures, and stdout relaying without building
//! anything.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use designgen::{GenerateError, GenerateRequest, GeneratorKind, Stage, Toolchain, generate};

/// Behaviour of the stub toolchain.
struct Stub<'a> {
    /// Shell run by `cargo build` after recording its arguments; `exit 0` produces the driver.
    cargo_body: &'a str,
    /// Shell run by the driver.
    driver_body: &'a str,
}

impl Default for Stub<'_> {
    fn default() -> Self {
        Self {
            cargo_body: "",
            driver_body: "printf '%s\\n' \"$OUT/service/account.rs\" \"$OUT/openapi.json\"",
        }
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    request: GenerateRequest,
}

impl Fixture {
    fn new(stub: Stub<'_>) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();

        let design = root.join("design");
        fs::create_dir_all(design.join("src")).unwrap();
        fs::write(
            design.join("Cargo.toml"),
            "[package]\nname = \"demo-design\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
        )
        .unwrap();
        fs::write(design.join("src/lib.rs"), "").unwrap();

        let cargo = root.join("bin/cargo");
        write_script(
            &cargo,
            &format!(
                r#"#!/bin/sh
target="$PWD/target"
printf '%s\n' "$*" > "$PWD/cargo-args"
while [ $# -gt 0 ]; do
    if [ "$1" = "--target-dir" ]; then target="$2"; shift; fi
    shift
done
{cargo_body}
mkdir -p "$target/debug"
cat > "$target/debug/designgen-driver" <<'DRIVER'
#!/bin/sh
printf '%s\n' "$*" > "$(dirname "$0")/driver-args"
OUT="${{1#--output=}}"
{driver_body}
DRIVER
chmod +x "$target/debug/designgen-driver"
"#,
                cargo_body = stub.cargo_body,
                driver_body = stub.driver_body,
            ),
        );

        let mut request = GenerateRequest::new(&design, root.join("out"));
        request.generators = vec![GeneratorKind::Server, GeneratorKind::OpenApi];
        request.work_dir = root.join("work");
        request.toolchain = Toolchain {
            cargo,
            target_dir: Some(root.join("target")),
            ..Toolchain::default()
        };
        Self { _tmp: tmp, root, request }
    }

    fn workspaces(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.request.work_dir) {
            Ok(entries) => entries.map(|entry| entry.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_relays_driver_stdout_and_removes_workspace() {
    let fixture = Fixture::new(Stub::default());

    let stdout = generate(&fixture.request).unwrap();

    let out = fixture.root.join("out");
    assert_eq!(
        stdout,
        format!("{}\n{}\n", out.join("service/account.rs").display(), out.join("openapi.json").display())
    );
    assert!(fixture.workspaces().is_empty(), "workspace left behind: {:?}", fixture.workspaces());
}

#[test]
fn test_driver_receives_exactly_output_and_version() {
    let fixture = Fixture::new(Stub::default());
    generate(&fixture.request).unwrap();

    assert_eq!(
        fixture.read("target/debug/driver-args").trim_end(),
        format!(
            "--output={} --version={}",
            fixture.root.join("out").display(),
            designgen::DESIGNGEN_VERSION
        )
    );
}

#[test]
fn test_debug_keeps_workspace_with_driver_sources() {
    let mut fixture = Fixture::new(Stub::default());
    fixture.request.debug = true;
    fixture.request.toolchain.offline = true;
    generate(&fixture.request).unwrap();

    let workspaces = fixture.workspaces();
    assert_eq!(workspaces.len(), 1);
    let workspace = &workspaces[0];
    assert!(workspace.file_name().unwrap().to_string_lossy().starts_with("designgen"));

    let manifest = fs::read_to_string(workspace.join("Cargo.toml")).unwrap();
    assert!(manifest.contains("user_design = { package = \"demo-design\""));
    let main = fs::read_to_string(workspace.join("src/main.rs")).unwrap();
    assert!(main.contains("server::generate(roots)"));
    assert!(main.contains("openapi::generate(roots)"));
    assert!(!main.contains("client::generate"));

    let cargo_args = fs::read_to_string(workspace.join("cargo-args")).unwrap();
    assert_eq!(
        cargo_args.trim_end(),
        format!(
            "build --quiet --bin designgen-driver --offline --target-dir {}",
            fixture.root.join("target").display()
        )
    );
}

#[test]
fn test_compile_failure_keeps_workspace() {
    let fixture = Fixture::new(Stub {
        cargo_body: "echo 'error[E0432]: unresolved import `user_design`' >&2\nexit 101",
        ..Stub::default()
    });

    let err = generate(&fixture.request).unwrap_err();

    assert!(matches!(err, GenerateError::Compile { .. }), "{err:?}");
    assert_eq!(err.stage(), Stage::DriverWritten);
    let message = err.to_string();
    assert!(message.starts_with("failed to compile generator: "), "{message}");
    assert!(message.contains("error[E0432]: unresolved import `user_design`"));

    let workspace = err.workspace().unwrap();
    assert!(workspace.join("src/main.rs").is_file());
    assert_eq!(fixture.workspaces(), [workspace.to_path_buf()]);
}

#[test]
fn test_driver_failure_is_reported() {
    let fixture = Fixture::new(Stub {
        driver_body: "echo 'invalid design:' >&2\necho 'API \"account\": API defines no service' >&2\nexit 1",
        ..Stub::default()
    });

    let err = generate(&fixture.request).unwrap_err();

    assert!(matches!(err, GenerateError::Driver { .. }), "{err:?}");
    assert_eq!(err.stage(), Stage::Compiled);
    assert_eq!(
        err.to_string(),
        "generator failed: exit status: 1\ninvalid design:\nAPI \"account\": API defines no service"
    );
    assert!(err.workspace().unwrap().is_dir());
}

#[test]
fn test_driver_failure_keeps_stdout_and_status() {
    let fixture = Fixture::new(Stub {
        driver_body: "echo 'wrote service/account.rs before failing'\necho 'write failed: disk full' >&2\nexit 1",
        ..Stub::default()
    });

    let err = generate(&fixture.request).unwrap_err();

    let GenerateError::Driver { status, output, .. } = &err else {
        panic!("expected a driver failure, got {err:?}");
    };
    assert_eq!(status.code(), Some(1));
    assert_eq!(output, "wrote service/account.rs before failing\nwrite failed: disk full\n");
    assert_eq!(
        err.to_string(),
        "generator failed: exit status: 1\nwrote service/account.rs before failing\nwrite failed: disk full"
    );
}

#[test]
fn test_silent_driver_failure_reports_status() {
    let fixture = Fixture::new(Stub {
        driver_body: "exit 3",
        ..Stub::default()
    });

    let err = generate(&fixture.request).unwrap_err();
    let message = err.to_string();
    assert_eq!(message, "generator failed: exit status: 3");
}

#[test]
fn test_missing_cargo() {
    let mut fixture = Fixture::new(Stub::default());
    fixture.request.toolchain.cargo = PathBuf::from("designgen-test-no-such-cargo");

    let err = generate(&fixture.request).unwrap_err();

    assert!(matches!(err, GenerateError::CompilerNotFound { .. }), "{err:?}");
    assert!(err.to_string().starts_with("cannot find `designgen-test-no-such-cargo`"));
    assert_eq!(fixture.workspaces().len(), 1);
}

#[test]
fn test_design_without_library_stops_before_staging() {
    let fixture = Fixture::new(Stub::default());
    fs::remove_file(fixture.root.join("design/src/lib.rs")).unwrap();

    let err = generate(&fixture.request).unwrap_err();

    assert!(matches!(err, GenerateError::DesignNotImportable { .. }), "{err:?}");
    assert_eq!(err.stage(), Stage::Start);
    assert!(fixture.workspaces().is_empty());
}
