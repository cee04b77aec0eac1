//! Artifact packaging.
//!
//! After a successful build, copies the produced headers and libraries
//! out of the install prefix into the normalized package layout consumed
//! by downstream build systems, and publishes the link metadata.
//!
//! The contract is fixed per recipe version:
//!
//! - headers: `src/include/**/*.h` → `include/`, subpaths preserved
//! - libraries: everything under `src/lib/` → `lib/`, flattened
//! - link metadata: the single canonical library name

use std::fs;
use std::path::{Path, PathBuf};

use crate::targets::wildcard_match;
use crate::types::{CopyRule, LinkInfo, PackageManifest, RecipeError};

/// Header source directory, relative to the install prefix.
const HEADER_SOURCE: &str = "src/include";
/// Library source directory, relative to the install prefix.
const LIB_SOURCE: &str = "src/lib";
/// Filename glob for header files.
const HEADER_PATTERN: &str = "*.h";

/// Assembles the package layout from a completed build.
///
/// Must only run after the build pipeline succeeded; against an absent
/// build tree it fails fast with [`RecipeError::MissingSourcePath`]
/// rather than producing an empty package.
///
/// # Example
///
/// ```no_run
/// use meshpack_sdk::Packager;
///
/// let packager = Packager::new(".", "package");
/// let manifest = packager.package()?;
/// println!("exposed libs: {:?}", manifest.libs);
/// # Ok::<(), meshpack_sdk::RecipeError>(())
/// ```
pub struct Packager {
    /// Install prefix the build wrote into.
    prefix: PathBuf,
    /// Root of the package layout being assembled.
    package_dir: PathBuf,
    /// Canonical library name exposed to consumers.
    library_name: String,
    verbose: bool,
}

impl Packager {
    /// Creates a packager with the canonical `meshlink` library name.
    pub fn new(prefix: impl Into<PathBuf>, package_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            package_dir: package_dir.into(),
            library_name: "meshlink".to_string(),
            verbose: false,
        }
    }

    /// Overrides the exposed library name.
    pub fn library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = name.into();
        self
    }

    /// Enables per-file progress output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The copy contract this packager applies.
    pub fn manifest(&self) -> PackageManifest {
        PackageManifest {
            headers: CopyRule {
                source: self.prefix.join(HEADER_SOURCE),
                dest: self.package_dir.join("include"),
                pattern: Some(HEADER_PATTERN.to_string()),
                flatten: false,
            },
            libraries: CopyRule {
                source: self.prefix.join(LIB_SOURCE),
                dest: self.package_dir.join("lib"),
                pattern: None,
                flatten: true,
            },
            libs: vec![self.library_name.clone()],
        }
    }

    /// Link-time metadata for downstream consumers.
    pub fn package_info(&self) -> LinkInfo {
        LinkInfo {
            libs: vec![self.library_name.clone()],
        }
    }

    /// Applies the copy contract and returns the manifest it applied.
    ///
    /// Deterministic and non-additive: re-running against the same build
    /// overwrites the same destination files and produces a byte-identical
    /// tree.
    pub fn package(&self) -> Result<PackageManifest, RecipeError> {
        let manifest = self.manifest();

        for rule in [&manifest.headers, &manifest.libraries] {
            if !rule.source.is_dir() {
                return Err(RecipeError::MissingSourcePath(rule.source.clone()));
            }
        }

        println!("Packaging headers into {}...", manifest.headers.dest.display());
        self.apply_rule(&manifest.headers)?;
        println!("Packaging libraries into {}...", manifest.libraries.dest.display());
        self.apply_rule(&manifest.libraries)?;

        Ok(manifest)
    }

    fn apply_rule(&self, rule: &CopyRule) -> Result<(), RecipeError> {
        fs::create_dir_all(&rule.dest)?;
        self.copy_tree(&rule.source, &rule.source, rule)
    }

    fn copy_tree(&self, root: &Path, dir: &Path, rule: &CopyRule) -> Result<(), RecipeError> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.copy_tree(root, &path, rule)?;
                continue;
            }

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if let Some(pattern) = &rule.pattern
                && !wildcard_match(pattern, &file_name)
            {
                continue;
            }

            let dest = if rule.flatten {
                rule.dest.join(&file_name)
            } else {
                // Mirror the path relative to the rule's source root.
                let rel = path.strip_prefix(root).unwrap_or(&path);
                let dest = rule.dest.join(rel);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                dest
            };

            if self.verbose {
                println!("  {} -> {}", path.display(), dest.display());
            }
            fs::copy(&path, &dest)?;
        }
        Ok(())
    }
}
