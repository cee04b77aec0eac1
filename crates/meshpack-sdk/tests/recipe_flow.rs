//! End-to-end recipe flow against a fake toolchain.
//!
//! Exercises the build pipeline and packaging together the way the host
//! package manager drives them: build first, package only on success.

use std::fs;
use std::io;
use std::path::Path;

use meshpack_sdk::{
    AutotoolsBuilder, BuildOptions, CommandRunner, Packager, PlatformDescriptor, RecipeError,
    RunOutput, Stage,
};
use tempfile::TempDir;

/// Fake toolchain that "installs" artifacts on `make install`.
struct FakeToolchain {
    fail_compile: bool,
}

impl CommandRunner for FakeToolchain {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<RunOutput> {
        let is_install = program == "make" && args.first().map(String::as_str) == Some("install");
        let is_compile = program == "make" && args.is_empty();

        if is_compile && self.fail_compile {
            return Ok(RunOutput {
                code: 2,
                stdout: String::new(),
                stderr: "undefined reference to `chacha_encrypt'".to_string(),
            });
        }

        if is_install {
            let include = cwd.join("src/include");
            let lib = cwd.join("src/lib/arch");
            fs::create_dir_all(&include)?;
            fs::create_dir_all(&lib)?;
            fs::write(include.join("meshlink.h"), "// meshlink public api")?;
            fs::write(cwd.join("src/lib").join("libmeshlink.a"), "archive")?;
            fs::write(lib.join("libmeshlink-arch.a"), "arch archive")?;
        }

        Ok(RunOutput {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[test]
fn build_then_package_produces_normalized_layout() {
    let work = TempDir::new().unwrap();
    let prefix = work.path().join("build");
    let pkg = work.path().join("package");

    let builder = AutotoolsBuilder::with_runner("meshlink", FakeToolchain { fail_compile: false })
        .build_dir(&prefix);
    let descriptor = PlatformDescriptor::new("Linux", "x86_64", "gcc");
    builder.build(&descriptor, &BuildOptions::default()).unwrap();

    let manifest = Packager::new(&prefix, &pkg).package().unwrap();

    assert!(pkg.join("include/meshlink.h").exists());
    // Libraries land flat, regardless of how the toolchain nested them.
    assert!(pkg.join("lib/libmeshlink.a").exists());
    assert!(pkg.join("lib/libmeshlink-arch.a").exists());
    assert!(!pkg.join("lib/arch").exists());

    assert_eq!(manifest.libs, vec!["meshlink".to_string()]);
}

#[test]
fn failed_build_leaves_nothing_to_package() {
    let work = TempDir::new().unwrap();
    let prefix = work.path().join("build");
    let pkg = work.path().join("package");

    let builder = AutotoolsBuilder::with_runner("meshlink", FakeToolchain { fail_compile: true })
        .build_dir(&prefix);
    let descriptor = PlatformDescriptor::new("Linux", "x86_64", "gcc");

    let err = builder
        .build(&descriptor, &BuildOptions::default())
        .unwrap_err();
    match err {
        RecipeError::ToolFailure { stage, stderr, .. } => {
            assert_eq!(stage, Stage::Compile);
            assert!(stderr.contains("undefined reference"));
        }
        other => panic!("expected ToolFailure, got {:?}", other),
    }

    // Packaging against the failed build fails fast instead of emitting
    // an empty package.
    let result = Packager::new(&prefix, &pkg).package();
    assert!(matches!(result, Err(RecipeError::MissingSourcePath(_))));
    assert!(!pkg.exists());
}

#[test]
fn cross_build_passes_resolved_host() {
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Recorder {
        configure_args: Arc<Mutex<Vec<String>>>,
    }

    impl CommandRunner for Recorder {
        fn run(&self, program: &str, args: &[String], _cwd: &Path) -> io::Result<RunOutput> {
            if program.ends_with("configure") {
                *self.configure_args.lock().unwrap() = args.to_vec();
            }
            Ok(RunOutput {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    let work = TempDir::new().unwrap();
    let configure_args = Arc::new(Mutex::new(Vec::new()));
    let runner = Recorder {
        configure_args: Arc::clone(&configure_args),
    };
    let builder = AutotoolsBuilder::with_runner("meshlink", runner).build_dir(work.path());

    let descriptor = PlatformDescriptor::new("iOS", "x86", "clang");
    builder
        .build(&descriptor, &BuildOptions { shared: true })
        .unwrap();

    let args = configure_args.lock().unwrap().clone();
    assert!(args.contains(&"--host=i386-apple-ios".to_string()));
    assert!(args.contains(&"--enable-shared".to_string()));
    assert!(args[0].starts_with("--prefix="));
}
