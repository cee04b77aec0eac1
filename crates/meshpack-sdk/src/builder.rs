//! Native build orchestration.
//!
//! Drives the autotools pipeline for meshlink-tiny: bootstrap the build
//! scripts, configure with the resolved cross-compilation settings,
//! compile, and install into the prefix. Stages run strictly in order;
//! any nonzero exit aborts the pipeline with the failing stage's
//! identity attached.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::runner::{CommandRunner, ProcessRunner};
use crate::targets::TargetResolver;
use crate::types::{BuildOptions, PlatformDescriptor, RecipeError, Stage};

/// Orchestrates the configure/make/install pipeline.
///
/// The install prefix is the build directory, which defaults to the
/// working directory at invocation time. Builds therefore stay
/// relocatable: nothing is ever installed to a hardcoded absolute path.
///
/// # Example
///
/// ```no_run
/// use meshpack_sdk::{AutotoolsBuilder, BuildOptions, PlatformDescriptor};
///
/// let builder = AutotoolsBuilder::new("meshlink").verbose(true);
/// let desc = PlatformDescriptor::new("iOS", "x86_64", "clang");
/// builder.build(&desc, &BuildOptions::default())?;
/// # Ok::<(), meshpack_sdk::RecipeError>(())
/// ```
pub struct AutotoolsBuilder<R: CommandRunner = ProcessRunner> {
    /// Root of the source tree, containing configure.ac.
    source_dir: PathBuf,
    /// Build directory and install prefix; defaults to the working
    /// directory at invocation time.
    build_dir: Option<PathBuf>,
    resolver: TargetResolver,
    runner: R,
    verbose: bool,
}

impl AutotoolsBuilder<ProcessRunner> {
    /// Creates a builder that invokes the real toolchain.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root of the meshlink-tiny source tree
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(source_dir, ProcessRunner)
    }
}

impl<R: CommandRunner> AutotoolsBuilder<R> {
    /// Creates a builder with an injected command runner.
    ///
    /// Used by tests to sequence the pipeline against a fake toolchain.
    pub fn with_runner(source_dir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_dir: None,
            resolver: TargetResolver::default(),
            runner,
            verbose: false,
        }
    }

    /// Overrides the build directory (and install prefix).
    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    /// Enables progress output for each stage.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolves the effective build directory / install prefix.
    pub fn install_prefix(&self) -> Result<PathBuf, RecipeError> {
        match &self.build_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(env::current_dir()?),
        }
    }

    /// Base configure arguments for the given options.
    ///
    /// Always starts with the install-prefix option; the cross-target
    /// `--host`, when one resolves, is appended by [`build`](Self::build)
    /// and is deliberately not part of the base set.
    pub fn configure_options(&self, options: &BuildOptions) -> Result<Vec<String>, RecipeError> {
        let prefix = self.install_prefix()?;
        let mut args = vec![format!("--prefix={}", prefix.display())];
        if options.shared {
            args.push("--enable-shared".to_string());
        } else {
            args.push("--disable-shared".to_string());
        }
        Ok(args)
    }

    /// Runs the full pipeline: bootstrap, configure, compile, install.
    ///
    /// The descriptor is classified by the target resolver; a resolved
    /// triple is passed to configure as `--host`, otherwise the
    /// toolchain infers the native host. Each stage strictly gates the
    /// next and failures propagate unrecovered.
    pub fn build(
        &self,
        descriptor: &PlatformDescriptor,
        options: &BuildOptions,
    ) -> Result<(), RecipeError> {
        let build_dir = self.install_prefix()?;
        fs::create_dir_all(&build_dir)?;

        // Stage 1: regenerate the autotools build scripts in the source root.
        println!("Bootstrapping build scripts...");
        self.run_stage(
            Stage::Bootstrap,
            "autoreconf",
            &["-fsi".to_string()],
            &self.source_dir,
        )?;

        // Stage 2: configure with the resolved options.
        let mut args = self.configure_options(options)?;
        match self.resolver.resolve(descriptor) {
            Some(triple) => {
                println!("Configuring for cross target {}...", triple);
                args.push(format!("--host={}", triple));
            }
            None => {
                println!("Configuring for native host ({})...", descriptor.query());
            }
        }
        let configure = self.source_dir.join("configure");
        self.run_stage(
            Stage::Configure,
            &configure.to_string_lossy(),
            &args,
            &build_dir,
        )?;

        // Stage 3: compile. Configure already recorded everything make needs.
        println!("Compiling...");
        self.run_stage(Stage::Compile, "make", &[], &build_dir)?;

        // Stage 4: install under the prefix.
        println!("Installing to {}...", build_dir.display());
        self.run_stage(Stage::Install, "make", &["install".to_string()], &build_dir)?;

        Ok(())
    }

    fn run_stage(
        &self,
        stage: Stage,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<(), RecipeError> {
        if self.verbose {
            println!("  [{}] {} {}", stage, program, args.join(" "));
        }

        let output = self
            .runner
            .run(program, args, cwd)
            .map_err(|source| RecipeError::ToolSpawn {
                stage,
                command: program.to_string(),
                source,
            })?;

        if !output.success() {
            return Err(RecipeError::ToolFailure {
                stage,
                command: program.to_string(),
                code: output.code,
                stderr: output.stderr,
            });
        }

        if self.verbose && !output.stdout.is_empty() {
            println!("{}", output.stdout.trim_end());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunOutput;
    use std::cell::RefCell;
    use std::io;

    /// Fake toolchain that records invocations and fails on demand.
    struct ScriptedRunner {
        calls: RefCell<Vec<RecordedCall>>,
        /// Fail the nth invocation (0-based) with this exit code.
        fail_at: Option<(usize, i32)>,
    }

    #[derive(Debug, Clone)]
    struct RecordedCall {
        program: String,
        args: Vec<String>,
        cwd: PathBuf,
    }

    impl ScriptedRunner {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(index: usize, code: i32) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_at: Some((index, code)),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<RunOutput> {
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.to_path_buf(),
            });
            let code = match self.fail_at {
                Some((at, code)) if at == index => code,
                _ => 0,
            };
            Ok(RunOutput {
                code,
                stdout: String::new(),
                stderr: if code == 0 {
                    String::new()
                } else {
                    "scripted failure".to_string()
                },
            })
        }
    }

    fn test_builder(runner: ScriptedRunner) -> AutotoolsBuilder<ScriptedRunner> {
        let work = std::env::temp_dir().join("meshpack-builder-test");
        AutotoolsBuilder::with_runner("/src/meshlink", runner).build_dir(work)
    }

    #[test]
    fn test_pipeline_stage_order() {
        let builder = test_builder(ScriptedRunner::new());
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        builder.build(&desc, &BuildOptions::default()).unwrap();

        let calls = builder.runner.calls.borrow();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].program, "autoreconf");
        assert_eq!(calls[0].args, vec!["-fsi"]);
        assert!(calls[1].program.ends_with("configure"));
        assert_eq!(calls[2].program, "make");
        assert!(calls[2].args.is_empty());
        assert_eq!(calls[3].program, "make");
        assert_eq!(calls[3].args, vec!["install"]);
    }

    #[test]
    fn test_bootstrap_runs_in_source_root() {
        let builder = test_builder(ScriptedRunner::new());
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        builder.build(&desc, &BuildOptions::default()).unwrap();

        let calls = builder.runner.calls.borrow();
        assert_eq!(calls[0].cwd, PathBuf::from("/src/meshlink"));
        // Everything after bootstrap runs in the build dir.
        assert_ne!(calls[1].cwd, calls[0].cwd);
        assert_eq!(calls[1].cwd, calls[2].cwd);
        assert_eq!(calls[2].cwd, calls[3].cwd);
    }

    #[test]
    fn test_configure_receives_cross_host_for_ios() {
        let builder = test_builder(ScriptedRunner::new());
        let desc = PlatformDescriptor::new("iOS", "x86", "clang");
        builder.build(&desc, &BuildOptions::default()).unwrap();

        let calls = builder.runner.calls.borrow();
        assert!(
            calls[1]
                .args
                .contains(&"--host=i386-apple-ios".to_string())
        );
    }

    #[test]
    fn test_configure_omits_host_for_native_build() {
        let builder = test_builder(ScriptedRunner::new());
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        builder.build(&desc, &BuildOptions::default()).unwrap();

        let calls = builder.runner.calls.borrow();
        assert!(!calls[1].args.iter().any(|a| a.starts_with("--host=")));
    }

    #[test]
    fn test_configure_options_prefix_and_shared_flag() {
        let builder = test_builder(ScriptedRunner::new());

        let static_args = builder
            .configure_options(&BuildOptions { shared: false })
            .unwrap();
        assert!(static_args[0].starts_with("--prefix="));
        assert!(static_args.contains(&"--disable-shared".to_string()));

        let shared_args = builder
            .configure_options(&BuildOptions { shared: true })
            .unwrap();
        assert!(shared_args.contains(&"--enable-shared".to_string()));
    }

    #[test]
    fn test_failing_compile_stops_pipeline() {
        // Call 2 is make; fail it and install must never run.
        let builder = test_builder(ScriptedRunner::failing_at(2, 2));
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        let err = builder
            .build(&desc, &BuildOptions::default())
            .unwrap_err();

        match err {
            RecipeError::ToolFailure { stage, code, .. } => {
                assert_eq!(stage, Stage::Compile);
                assert_eq!(code, 2);
            }
            other => panic!("expected ToolFailure, got {:?}", other),
        }
        assert_eq!(builder.runner.calls.borrow().len(), 3);
    }

    #[test]
    fn test_failing_bootstrap_is_fatal() {
        let builder = test_builder(ScriptedRunner::failing_at(0, 1));
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        let err = builder
            .build(&desc, &BuildOptions::default())
            .unwrap_err();

        match err {
            RecipeError::ToolFailure { stage, .. } => assert_eq!(stage, Stage::Bootstrap),
            other => panic!("expected ToolFailure, got {:?}", other),
        }
        assert_eq!(builder.runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_spawn_failure_carries_stage() {
        struct NoSpawn;
        impl CommandRunner for NoSpawn {
            fn run(&self, _: &str, _: &[String], _: &Path) -> io::Result<RunOutput> {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such tool"))
            }
        }
        let work = std::env::temp_dir().join("meshpack-builder-test");
        let builder = AutotoolsBuilder::with_runner("/src/meshlink", NoSpawn).build_dir(work);
        let desc = PlatformDescriptor::new("Linux", "x86_64", "gcc");
        let err = builder
            .build(&desc, &BuildOptions::default())
            .unwrap_err();

        match err {
            RecipeError::ToolSpawn { stage, command, .. } => {
                assert_eq!(stage, Stage::Bootstrap);
                assert_eq!(command, "autoreconf");
            }
            other => panic!("expected ToolSpawn, got {:?}", other),
        }
    }
}
