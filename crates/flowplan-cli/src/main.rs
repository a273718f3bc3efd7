//! Flowplan command-line tools.
//!
//! Provides the `flowplan` binary. Every subcommand reads JSON files and
//! writes JSON (or a single value) to stdout; diagnostics go to stderr,
//! filtered by `RUST_LOG` (default `warn`).
//!
//! Exit codes: 0 = success, 1 = rejected or invalid data,
//! 2 = computation error, 3 = I/O or parse error.

mod config;
mod error;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use flowplan_core::validate::validate_flowchart;
use flowplan_core::{add_units, merge_flowcharts_course_data, Flowchart, PositionedFlowchart, Term};
use flowplan_engine::{
    generate_flowchart, refresh_derived, GenerateRequest, IncomingChunk, MutationEngine,
    MutationOutcome, MutationResponse,
};
use flowplan_storage::{generate_flow_hash, upgrade};

use crate::config::{read_json, CacheArgs};
use crate::error::CliError;

/// Flowchart planning tools.
#[derive(Parser)]
#[command(name = "flowplan", about = "Flowchart planning tools")]
struct Cli {
    #[command(flatten)]
    caches: CacheArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Apply a batch of update chunks to a flowchart collection.
    Mutate {
        /// JSON array of `{ flowchart, pos }` entries.
        #[arg(short, long)]
        flowcharts: PathBuf,

        /// JSON array of update chunks.
        #[arg(short, long)]
        chunks: PathBuf,

        /// Recompute `unitTotal` and `hash` of every flowchart afterwards.
        #[arg(long)]
        refresh: bool,
    },

    /// Upgrade a stored flowchart to the current version.
    Migrate {
        /// The stored flowchart record.
        input: PathBuf,

        /// Owner of the flowchart.
        #[arg(short, long)]
        owner: String,
    },

    /// Print the `metaHash.contentHash` fingerprint of a flowchart.
    Hash {
        input: PathBuf,
    },

    /// Merge per-program template term lists.
    Merge {
        /// JSON array of term lists, one per program.
        templates: PathBuf,

        /// Program ids, in slot order.
        #[arg(short = 'p', long = "program", required = true)]
        program_ids: Vec<String>,

        /// Keep catalog courses shared between programs.
        #[arg(long)]
        no_course_merge: bool,
    },

    /// Create a new flowchart from program templates.
    Generate {
        /// Generation request (owner, name, programs, start year).
        request: PathBuf,

        /// JSON array of term lists, one per program.
        templates: PathBuf,
    },

    /// Add two ranged-unit strings.
    Units {
        a: String,
        b: String,
    },

    /// Check a flowchart against the data-model invariants.
    Validate {
        input: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

/// Installs a stderr subscriber filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Commands::Mutate {
            flowcharts,
            chunks,
            refresh,
        } => run_mutate(&cli.caches, &flowcharts, &chunks, refresh),
        Commands::Migrate { input, owner } => {
            let (courses, programs) = cli.caches.load()?;
            let raw: serde_json::Value = read_json(&input)?;
            let flowchart = upgrade(&owner, raw, &courses, &programs)?;
            info!(id = %flowchart.id, "migrated flowchart");
            print_json(&flowchart)?;
            Ok(0)
        }
        Commands::Hash { input } => {
            let flowchart: Flowchart = read_json(&input)?;
            println!("{}", generate_flow_hash(&flowchart)?);
            Ok(0)
        }
        Commands::Merge {
            templates,
            program_ids,
            no_course_merge,
        } => {
            let (courses, programs) = cli.caches.load()?;
            let templates: Vec<Vec<Term>> = read_json(&templates)?;
            let program_ids: Vec<Option<String>> = program_ids.into_iter().map(Some).collect();
            let merged = merge_flowcharts_course_data(
                &templates,
                &program_ids,
                &courses,
                &programs,
                !no_course_merge,
            )?;
            print_json(&merged)?;
            Ok(0)
        }
        Commands::Generate { request, templates } => {
            let (courses, programs) = cli.caches.load()?;
            let request: GenerateRequest = read_json(&request)?;
            let templates: Vec<Vec<Term>> = read_json(&templates)?;
            let flowchart = generate_flowchart(&request, &templates, &courses, &programs)?;
            print_json(&flowchart)?;
            Ok(0)
        }
        Commands::Units { a, b } => match add_units(&a, &b) {
            Ok(sum) => {
                println!("{}", sum);
                Ok(0)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(1)
            }
        },
        Commands::Validate { input } => {
            let flowchart: Flowchart = read_json(&input)?;
            validate_flowchart(&flowchart)?;
            println!("ok");
            Ok(0)
        }
    }
}

/// Execute the mutate subcommand.
///
/// Prints the mutation response; returns 1 when the batch was rejected.
fn run_mutate(
    caches: &CacheArgs,
    flowcharts_path: &Path,
    chunks_path: &Path,
    refresh: bool,
) -> Result<i32, CliError> {
    let (courses, programs) = caches.load()?;
    let flowcharts: Vec<PositionedFlowchart> = read_json(flowcharts_path)?;
    let chunks: Vec<IncomingChunk> = read_json(chunks_path)?;
    debug!(flowcharts = flowcharts.len(), chunks = chunks.len(), "applying batch");

    let outcome = match MutationEngine::new(&courses, &programs).apply(&flowcharts, &chunks)? {
        MutationOutcome::Applied(mut result) if refresh => {
            for entry in &mut result {
                refresh_derived(&mut entry.flowchart, &courses, &programs)?;
            }
            MutationOutcome::Applied(result)
        }
        outcome => outcome,
    };

    let code = if outcome.is_applied() { 0 } else { 1 };
    print_json(&MutationResponse::from(outcome))?;
    Ok(code)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
