//! Core types for meshpack-sdk.
//!
//! This module defines the fundamental types used throughout the SDK:
//!
//! - [`PlatformDescriptor`] - The platform being built for (OS, arch, compiler)
//! - [`BuildOptions`] - Recipe options (shared vs. static)
//! - [`Stage`] - Pipeline stage identity, carried in errors
//! - [`RecipeError`] - Error types for build and packaging operations
//! - [`PackageManifest`] / [`CopyRule`] / [`LinkInfo`] - Packaging contract

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Description of the platform a build targets.
///
/// Supplied once per build invocation by the caller and never mutated.
/// The descriptor is matched against the cross-compilation pattern table
/// via its [`query`](PlatformDescriptor::query) string.
///
/// # Example
///
/// ```
/// use meshpack_sdk::PlatformDescriptor;
///
/// let desc = PlatformDescriptor::new("iOS", "x86_64", "clang");
/// assert_eq!(desc.query(), "iOS-x86_64-clang");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Operating system name (e.g., "iOS", "Linux").
    pub os: String,
    /// CPU architecture (e.g., "x86", "x86_64", "armv8").
    pub arch: String,
    /// Compiler identity (e.g., "clang", "gcc").
    pub compiler: String,
}

impl PlatformDescriptor {
    /// Creates a new platform descriptor.
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        compiler: impl Into<String>,
    ) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            compiler: compiler.into(),
        }
    }

    /// Formats the query string matched against the pattern table.
    ///
    /// Fields are joined with `-` in os-arch-compiler order. Empty or
    /// wildcard-containing fields are formatted as-is; matching always
    /// proceeds literally over the result.
    pub fn query(&self) -> String {
        format!("{}-{}-{}", self.os, self.arch, self.compiler)
    }
}

/// Options controlling the build, beyond the platform itself.
///
/// The recipe exposes a single option: whether to produce shared or
/// static libraries. The default is a static build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Build shared libraries (`--enable-shared`) instead of static.
    pub shared: bool,
}

/// Identity of a pipeline stage, preserved in stage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `autoreconf` in the source root.
    Bootstrap,
    /// `configure` with the resolved options.
    Configure,
    /// `make`.
    Compile,
    /// `make install`.
    Install,
}

impl Stage {
    /// Returns the stage name as reported in errors and progress output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bootstrap => "bootstrap",
            Stage::Configure => "configure",
            Stage::Compile => "compile",
            Stage::Install => "install",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for meshpack-sdk operations.
///
/// Covers everything that can go wrong while driving the native
/// toolchain and assembling the package. External-tool failures are
/// fatal and never retried; the failing stage's identity is always
/// preserved so the caller can report which step broke.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// An external tool could not be started at all.
    ///
    /// Usually means the tool is not installed or not on PATH.
    #[error("failed to start `{command}` during {stage}: {source}. Ensure the tool is installed and on PATH")]
    ToolSpawn {
        /// Stage that was running when the spawn failed.
        stage: Stage,
        /// The command that could not be started.
        command: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// An external tool ran but exited non-zero.
    ///
    /// This aborts the pipeline immediately; later stages are never
    /// reached. The exit code is propagated verbatim (-1 when the
    /// process was terminated by a signal).
    #[error("{stage} stage failed: `{command}` exited with code {code}\n{stderr}")]
    ToolFailure {
        /// Stage whose tool failed.
        stage: Stage,
        /// The command that failed.
        command: String,
        /// Exit code of the process.
        code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A packaging source directory does not exist.
    ///
    /// Raised when `package()` runs before a successful build, rather
    /// than silently producing an empty package.
    #[error("missing source path: {0}. Run the build before packaging")]
    MissingSourcePath(PathBuf),

    /// An I/O error occurred while copying artifacts.
    #[error("I/O error: {0}. Check file paths and permissions")]
    Io(#[from] io::Error),
}

/// A single copy rule of the packaging contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Directory the files are copied from, relative to the install prefix.
    pub source: PathBuf,
    /// Directory the files land in, relative to the package root.
    pub dest: PathBuf,
    /// Filename glob restricting what is copied (`None` copies everything).
    pub pattern: Option<String>,
    /// Discard source subdirectory structure when copying.
    pub flatten: bool,
}

/// The packaging contract: what gets copied where, and what consumers link.
///
/// Static per recipe version; [`Packager::package`](crate::Packager::package)
/// returns the manifest it applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Header copy rule (recursive, structure-preserving).
    pub headers: CopyRule,
    /// Library copy rule (flattened).
    pub libraries: CopyRule,
    /// Library names exposed to downstream consumers.
    pub libs: Vec<String>,
}

/// Link-time metadata published to downstream build systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Library names to link against (e.g., `["meshlink"]`).
    pub libs: Vec<String>,
}
