//! # Shapegen CLI
//!
//! Command-line interface for Shapegen.
//!
//! ## Commands
//!
//! - `generate` - Emit schemas, stores and forms from an IR document or a
//!   directory of documents
//! - `inspect` - List the declarations of a batch and what each backend will
//!   do with them
//!
//! Settings come from `shapegen.toml` (or `--config`), and command-line flags
//! override the file.

pub mod input;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use shapegen_codegen::{
    CONFIG_FILE_NAME, GeneratedProject, Generator, GeneratorConfig, Target, Targets, summarize,
};
use shapegen_ir::{Declaration, ParseResult};
use std::path::{Path, PathBuf};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Arguments
// ============================================================================

/// Generate zod schemas, zustand stores and React forms from declared types
#[derive(Parser, Debug)]
#[command(name = "shapegen", version, about)]
pub struct Cli {
    /// Log every emitted artifact
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate code for a batch of declarations
    Generate(GenerateArgs),
    /// Show the declarations of a batch
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// IR document, or a directory searched for `*.json` documents
    pub input: PathBuf,

    /// Only generate this declaration
    #[arg(short, long = "decl", value_name = "NAME")]
    pub declaration: Option<String>,

    /// Output directory (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Config file [default: ./shapegen.toml when present]
    #[arg(short, long, value_name = "FILE", env = "SHAPEGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Persist stores to localStorage
    #[arg(long)]
    pub persist: bool,

    /// Storage key for persisted stores (implies --persist)
    #[arg(long, value_name = "KEY")]
    pub storage_key: Option<String>,

    /// Restrict generation to these backends
    #[arg(long, value_delimiter = ',', value_name = "TARGETS")]
    pub only: Vec<Target>,

    /// Print what would be written without touching the disk
    #[arg(long)]
    pub dry_run: bool,

    /// Replace existing files
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// IR document, or a directory searched for `*.json` documents
    pub input: PathBuf,
}

// ============================================================================
// Entry point
// ============================================================================

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => run_generate(&args),
        Command::Inspect(args) => run_inspect(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let batch = input::load_batch(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    let generator = Generator::new(config);
    let output = match &args.declaration {
        Some(name) => generator.generate_declaration(&batch, name)?,
        None => generator.generate(&batch)?,
    };

    print_warnings(&output);

    let out_dir = &generator.config().output_dir;
    if args.dry_run {
        println!("{} nothing written", "Dry run:".yellow().bold());
        for file in &output.files {
            println!(
                "  {} {} ({} bytes)",
                "would write".dimmed(),
                out_dir.join(&file.path).display(),
                file.content.len()
            );
        }
        return Ok(());
    }

    if output.files.is_empty() {
        bail!("no files were generated; see warnings above");
    }

    let written = output
        .write_to_disk(out_dir, generator.config().overwrite)
        .context("failed to write generated files")?;
    for path in &written {
        println!("  {} {}", "wrote".green(), path.display());
    }
    print!("{}", summarize(&output));

    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let batch = input::load_batch(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let recursive = batch.recursive_types();

    println!(
        "{} {} declaration(s)",
        "Batch:".bold(),
        batch.len().to_string().cyan()
    );
    for decl in batch.dependency_sorted() {
        let mut flags = Vec::new();
        if !decl.is_exported {
            flags.push("private".yellow().to_string());
        }
        if recursive.contains(&decl.name) {
            flags.push("recursive".magenta().to_string());
        }

        println!(
            "  {} {} {}",
            decl.name.bold(),
            format!("({})", decl.ty.kind_name()).dimmed(),
            flags.join(" ")
        );
        let refs = decl.referenced_names();
        if !refs.is_empty() {
            let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
            println!("      {} {}", "references".dimmed(), refs.join(", "));
        }
        println!("      {} {}", "emits".dimmed(), planned_targets(decl, &batch).join(", "));
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Load the config file and apply command-line overrides.
pub fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if Path::new(CONFIG_FILE_NAME).exists() => GeneratorConfig::load(CONFIG_FILE_NAME)
            .with_context(|| format!("failed to load config {}", CONFIG_FILE_NAME))?,
        None => GeneratorConfig::default(),
    };

    if let Some(out) = &args.out {
        config = config.with_output_dir(out);
    }
    if !args.only.is_empty() {
        config = config.with_targets(Targets::only(&args.only));
    }
    if args.persist {
        config = config.persisted();
    }
    if let Some(key) = &args.storage_key {
        config = config.persisted().with_storage_key(key);
    }
    if args.overwrite {
        config = config.allow_overwrite();
    }

    Ok(config)
}

/// Backends that will produce an artifact for `decl`.
fn planned_targets(decl: &Declaration, batch: &ParseResult) -> Vec<&'static str> {
    let schema = decl.is_exported || batch.is_depended_upon(&decl.name);
    let object = decl.is_exported && decl.is_object();

    let mut targets = Vec::new();
    if schema && !decl.ty.is_function() {
        targets.push(Target::Schema.as_str());
    }
    if object {
        targets.push(Target::Store.as_str());
        targets.push(Target::Form.as_str());
    }
    if targets.is_empty() {
        targets.push("nothing");
    }
    targets
}

fn print_warnings(output: &GeneratedProject) {
    for warning in &output.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}
