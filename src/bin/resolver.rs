//! Interactive resolver driver
//!
//! Loads one of the three storage backends from a row file plus its metadata
//! file, then either answers targets typed on stdin or, in test mode, dumps
//! the resolution of every in-bounds target as JSON:
//!
//! ```text
//! {
//!   "TARGET": ["LABEL", ...],
//!   ...
//! }
//! ```
//!
//! Test-mode output is deliberately identical across backends, so piping two
//! invocations through `diff` checks that they agree.
//!
//! # Usage
//!
//! ```text
//! resolver [-q] [-t] direct  ROW_FILE META_FILE
//! resolver [-q] [-t] memory  ROW_FILE META_FILE
//! resolver [-q] [-t] deflate ROW_FILE META_FILE
//! ```

use bitgrid::engine::{Resolver, RowScratch};
use bitgrid::error::ConstructionError;
use bitgrid::meta::ResolverMeta;
use bitgrid::types::Target;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "resolver",
    about = "Resolve integer targets to label sets against a bit matrix"
)]
struct Cli {
    /// Suppress the interactive prompt
    #[arg(short, long)]
    quiet: bool,

    /// Resolve every target in bounds and print the results as JSON
    #[arg(short, long)]
    test: bool,

    #[command(subcommand)]
    backend: Backend,
}

#[derive(Subcommand)]
enum Backend {
    /// Seek into the row file for every lookup
    Direct {
        /// Fixed-size row records, one per target
        row_file: PathBuf,
        /// Metadata text file describing the matrix
        meta_file: PathBuf,
    },
    /// Repack the row file into a resident bit-packed matrix
    Memory {
        /// Fixed-size row records, one per target
        row_file: PathBuf,
        /// Metadata text file describing the matrix
        meta_file: PathBuf,
    },
    /// Repack and zlib-compress the row file, resolving by skip-ahead inflation
    Deflate {
        /// Fixed-size row records, one per target
        row_file: PathBuf,
        /// Metadata text file describing the matrix
        meta_file: PathBuf,
    },
}

fn build_resolver(backend: &Backend) -> Result<Resolver, ConstructionError> {
    match backend {
        Backend::Direct {
            row_file,
            meta_file,
        } => {
            let meta = ResolverMeta::load(meta_file)?;
            Resolver::direct(row_file, meta)
        }
        Backend::Memory {
            row_file,
            meta_file,
        } => {
            let meta = ResolverMeta::load(meta_file)?;
            let rows = std::fs::read(row_file)?;
            Resolver::memory_from_rows(&rows, meta)
        }
        Backend::Deflate {
            row_file,
            meta_file,
        } => {
            let meta = ResolverMeta::load(meta_file)?;
            let rows = std::fs::read(row_file)?;
            Resolver::deflate_from_rows(&rows, meta)
        }
    }
}

/// Render the filled slots (up to the sentinel) as a JSON array
fn labels_json(out: &[Option<&str>]) -> io::Result<String> {
    let labels: Vec<&str> = out.iter().map_while(|slot| *slot).collect();
    serde_json::to_string(&labels).map_err(io::Error::other)
}

/// Resolve every in-bounds target and dump one JSON object
fn run_test_dump(resolver: &Resolver) -> io::Result<()> {
    let mut scratch = RowScratch::new();
    let mut out = vec![None; resolver.num_labels()];
    let stdout = io::stdout();
    let mut w = stdout.lock();

    write!(w, "{{")?;
    for target in resolver.min_target()..=resolver.max_target() {
        if let Err(e) = resolver.resolve(target, &mut scratch, &mut out) {
            // Cannot produce a complete dump; stop here.
            eprintln!("{}: {}", target, e);
            break;
        }
        if target > resolver.min_target() {
            write!(w, ",")?;
        }
        write!(w, "\n  \"{}\": {}", target, labels_json(&out)?)?;
    }
    writeln!(w, "\n}}")?;
    Ok(())
}

/// Prompt loop: one target per line, per-call errors do not end the session
fn run_interactive(resolver: &Resolver, quiet: bool) -> io::Result<()> {
    let mut scratch = RowScratch::new();
    let mut out = vec![None; resolver.num_labels()];
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if !quiet {
            print!(
                "Enter target as an integer in {} .. {} interval: ",
                resolver.min_target(),
                resolver.max_target()
            );
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;

        let target: Target = match line.trim().parse() {
            Ok(target) => target,
            Err(_) => {
                eprintln!("`{}': invalid/missing target", line);
                continue;
            }
        };
        if target < resolver.min_target() || resolver.max_target() < target {
            eprintln!(
                "{}: invalid target, outside: {} .. {} interval",
                target,
                resolver.min_target(),
                resolver.max_target()
            );
            continue;
        }

        match resolver.resolve(target, &mut scratch, &mut out) {
            Ok(()) => println!("{} -> {}", target, labels_json(&out)?),
            Err(e) => eprintln!("{}: {}", target, e),
        }
    }

    if !quiet {
        println!();
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let resolver = match build_resolver(&cli.backend) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.test {
        run_test_dump(&resolver)
    } else {
        run_interactive(&resolver, cli.quiet)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
