//! Rosterload CLI - bulk import legacy member records
//!
//! # Commands
//!
//! ```bash
//! rosterload import members.csv     # Run the full pipeline (staging store)
//! rosterload check members.csv      # Validate only, nothing written
//! rosterload parse members.csv      # Dump parsed rows as JSON (debug)
//! ```
//!
//! The `import` command runs against the bundled in-memory store, which makes
//! it a dry run: it exercises parsing, validation and duplicate detection
//! within the file itself. Production imports go through the host system,
//! which wires its real store into the `rosterload` library.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rosterload::{
    import_file, normalize, parse_file, validate, ImportOptions, MemoryStore, DEFAULT_DELIMITER,
    DEFAULT_EMAIL_DOMAIN,
};

#[derive(Parser)]
#[command(name = "rosterload")]
#[command(about = "Bulk import legacy alumni member records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full import pipeline against the staging store
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Cell delimiter
        #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
        delimiter: char,

        /// Records per chunk
        #[arg(long, default_value_t = rosterload::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Domain for synthesized placeholder emails
        #[arg(long)]
        domain: Option<String>,

        /// Write the JSON report to a file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize and validate every row without writing anything
    Check {
        /// Input CSV file
        input: PathBuf,

        /// Cell delimiter
        #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
        delimiter: char,

        /// Domain for synthesized placeholder emails
        #[arg(long)]
        domain: Option<String>,
    },

    /// Parse a CSV file and dump the raw rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Cell delimiter
        #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
        delimiter: char,
    },
}

/// Placeholder domain: flag, then environment, then the compiled default.
fn email_domain(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("ROSTERLOAD_EMAIL_DOMAIN").ok())
        .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string())
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            delimiter,
            chunk_size,
            domain,
            output,
        } => cmd_import(&input, delimiter, chunk_size, domain, output.as_deref()).await,

        Commands::Check {
            input,
            delimiter,
            domain,
        } => cmd_check(&input, delimiter, domain),

        Commands::Parse { input, delimiter } => cmd_parse(&input, delimiter),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_import(
    input: &Path,
    delimiter: char,
    chunk_size: usize,
    domain: Option<String>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ImportOptions {
        delimiter,
        chunk_size,
        email_domain: email_domain(domain),
        ..Default::default()
    };

    let store = MemoryStore::new();
    let report = import_file(input, &store, &options).await?;

    eprintln!(
        "{} of {} records imported, {} failed",
        report.processed,
        report.processed + report.failed,
        report.failed
    );
    for error in report.errors.iter().take(10) {
        eprintln!("  - {}", error);
    }
    if report.errors.len() > 10 {
        eprintln!("  ... +{} more", report.errors.len() - 10);
    }

    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, output)?;

    if !report.success {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_check(
    input: &Path,
    delimiter: char,
    domain: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let domain = email_domain(domain);
    let parsed = parse_file(input, delimiter)?;
    eprintln!(
        "Parsed {} rows ({} columns, {})",
        parsed.rows.len(),
        parsed.headers.len(),
        parsed.encoding
    );

    let mut valid = 0;
    let mut invalid = 0;
    for row in &parsed.rows {
        let record = normalize(row);
        match validate(record, &domain) {
            Ok(v) => {
                valid += 1;
                if v.placeholder_email {
                    eprintln!("  line {}: placeholder email {}", row.line, v.email);
                }
            }
            Err(e) => {
                invalid += 1;
                eprintln!("  line {}: {}", row.line, e);
            }
        }
    }

    eprintln!("{} valid, {} invalid", valid, invalid);
    if invalid > 0 {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_parse(input: &Path, delimiter: char) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_file(input, delimiter)?;
    eprintln!(
        "Encoding: {}, columns: {}",
        parsed.encoding,
        parsed.headers.join(", ")
    );

    let rows: Vec<serde_json::Value> = parsed
        .rows
        .iter()
        .map(|row| {
            row.fields
                .iter()
                .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                .collect::<serde_json::Map<_, _>>()
                .into()
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
