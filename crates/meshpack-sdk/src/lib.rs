//! Build and packaging recipe for the meshlink-tiny native library.
//!
//! `meshpack-sdk` turns an abstract platform description (OS, CPU
//! architecture, compiler) into a concrete autotools invocation and a
//! normalized package layout. It handles three concerns:
//!
//! - **Target resolution**: match the platform against a table of
//!   wildcard patterns to pick a cross-compilation triple for known
//!   mobile platforms, or fall back to native host inference.
//! - **Build orchestration**: drive the bootstrap → configure → make →
//!   make install pipeline, aborting on the first failing stage.
//! - **Packaging**: copy produced headers and libraries into the
//!   `include/` + flat `lib/` layout and publish link metadata.
//!
//! # Example
//!
//! ```no_run
//! use meshpack_sdk::{
//!     AutotoolsBuilder, BuildOptions, Packager, PlatformDescriptor,
//! };
//!
//! fn main() -> Result<(), meshpack_sdk::RecipeError> {
//!     let descriptor = PlatformDescriptor::new("iOS", "x86_64", "clang");
//!
//!     // Build into the current working directory as the install prefix.
//!     let builder = AutotoolsBuilder::new("meshlink");
//!     builder.build(&descriptor, &BuildOptions::default())?;
//!
//!     // Assemble the package and report what consumers should link.
//!     let packager = Packager::new(".", "package");
//!     let manifest = packager.package()?;
//!     println!("link against: {:?}", manifest.libs);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`TargetResolver`]: pure lookup over an ordered, immutable pattern
//!   table; first match wins.
//! - [`AutotoolsBuilder`]: sequences the pipeline through an injected
//!   [`CommandRunner`], so sequencing is testable without a toolchain.
//! - [`Packager`]: applies the fixed copy contract and fails fast when
//!   run against an absent build.

// Public modules
pub mod builder;
pub mod packager;
pub mod runner;
pub mod targets;
pub mod types;

// Re-export key types for convenience
pub use builder::AutotoolsBuilder;
pub use packager::Packager;
pub use runner::{CommandRunner, ProcessRunner, RunOutput};
pub use targets::{CROSS_TARGETS, PatternEntry, TargetResolver};
pub use types::{
    BuildOptions, CopyRule, LinkInfo, PackageManifest, PlatformDescriptor, RecipeError, Stage,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
