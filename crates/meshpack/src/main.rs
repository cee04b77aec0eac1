use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::env;
use std::fs;
use std::path::PathBuf;

use meshpack_sdk::{
    AutotoolsBuilder, BuildOptions, Packager, PlatformDescriptor, TargetResolver,
};

use config::MeshpackConfig;

mod config;

/// CLI for building and packaging the meshlink-tiny native library.
#[derive(Parser, Debug)]
#[command(name = "meshpack", author, version, about = "Build and package meshlink-tiny for a target platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full build pipeline (bootstrap, configure, make, make install).
    Build {
        #[arg(long, help = "Target operating system (e.g., iOS, Linux)")]
        os: String,
        #[arg(long, help = "Target CPU architecture (e.g., x86, x86_64)")]
        arch: String,
        #[arg(long, help = "Compiler identity (e.g., clang, gcc)")]
        compiler: String,
        #[arg(long, help = "Build shared libraries instead of static")]
        shared: bool,
        #[arg(long, help = "Root of the native source tree")]
        source_dir: Option<PathBuf>,
        #[arg(long, help = "Build directory and install prefix (default: cwd)")]
        build_dir: Option<PathBuf>,
        #[arg(long, help = "Print each toolchain invocation")]
        verbose: bool,
    },
    /// Assemble the package layout from a completed build.
    Package {
        #[arg(long, help = "Install prefix the build wrote into (default: cwd)")]
        prefix: Option<PathBuf>,
        #[arg(long, default_value = "package")]
        output: PathBuf,
        #[arg(long, help = "Print each copied file")]
        verbose: bool,
    },
    /// Resolve a platform to its cross-compilation triple, if any.
    Resolve {
        #[arg(long)]
        os: String,
        #[arg(long)]
        arch: String,
        #[arg(long)]
        compiler: String,
    },
    /// Print link metadata for downstream consumers as JSON.
    Info,
    /// Write a starter meshpack.toml.
    Init {
        #[arg(long, default_value = "meshpack.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            os,
            arch,
            compiler,
            shared,
            source_dir,
            build_dir,
            verbose,
        } => cmd_build(os, arch, compiler, shared, source_dir, build_dir, verbose),
        Command::Package {
            prefix,
            output,
            verbose,
        } => cmd_package(prefix, output, verbose),
        Command::Resolve { os, arch, compiler } => cmd_resolve(os, arch, compiler),
        Command::Info => cmd_info(),
        Command::Init { output } => cmd_init(output),
    }
}

/// Loads the discovered config, or defaults when none exists.
fn load_config() -> Result<MeshpackConfig> {
    Ok(MeshpackConfig::discover()?
        .map(|(config, _)| config)
        .unwrap_or_default())
}

fn cmd_build(
    os: String,
    arch: String,
    compiler: String,
    shared: bool,
    source_dir: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = load_config()?;

    let source_dir = source_dir.unwrap_or_else(|| config.source_dir());
    let mut builder = AutotoolsBuilder::new(&source_dir).verbose(verbose);
    if let Some(dir) = build_dir.or_else(|| config.build.build_dir.clone()) {
        builder = builder.build_dir(dir);
    }

    let descriptor = PlatformDescriptor::new(os, arch, compiler);
    let options = BuildOptions {
        shared: shared || config.build.shared,
    };

    builder
        .build(&descriptor, &options)
        .with_context(|| format!("build failed for {}", descriptor.query()))?;

    println!("✓ Build complete for {}", descriptor.query());
    Ok(())
}

fn cmd_package(prefix: Option<PathBuf>, output: PathBuf, verbose: bool) -> Result<()> {
    let config = load_config()?;

    let prefix = match prefix {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let packager = Packager::new(&prefix, &output)
        .library_name(config.library_name())
        .verbose(verbose);

    let manifest = packager
        .package()
        .with_context(|| format!("packaging from {} failed", prefix.display()))?;

    println!("{}", serde_json::to_string_pretty(&manifest)?);
    println!("✓ Package assembled at {}", output.display());
    Ok(())
}

fn cmd_resolve(os: String, arch: String, compiler: String) -> Result<()> {
    let resolver = TargetResolver::default();
    let descriptor = PlatformDescriptor::new(os, arch, compiler);

    match resolver.resolve(&descriptor) {
        Some(triple) => println!("{}", triple),
        None => println!("native"),
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = load_config()?;
    let info = Packager::new(".", "package")
        .library_name(config.library_name())
        .package_info();

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_init(output: PathBuf) -> Result<()> {
    if output.exists() {
        bail!(
            "{} already exists; remove it first or pass --output",
            output.display()
        );
    }

    fs::write(&output, MeshpackConfig::generate_starter_toml())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Wrote {}", output.display());
    Ok(())
}
