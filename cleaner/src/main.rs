//! Arachnid CLI - clean DBpedia Arachnid CSV exports into JSON documents
//!
//! # Main Commands
//!
//! ```bash
//! arachnid clean arachnid.csv                  # Clean export to a JSON array on stdout
//! arachnid clean arachnid.csv -f jsonl -o out  # One document per line, for mongoimport
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! arachnid parse arachnid.csv      # Raw rows (after preamble) as JSON
//! arachnid mapping                 # Built-in field mapping as JSON
//! arachnid rules                   # Describe the cleaning rules
//! ```

use arachnid::logging::{init_logging, LogConfig};
use arachnid::{
    clean_file, parse_file, rules_description, write_records, CleanOptions, FieldMapping,
    OutputFormat, RowPolicy,
};
use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "arachnid")]
#[command(about = "Clean DBpedia Arachnid CSV exports into nested JSON documents", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReaderArgs {
    /// Preamble rows after the header (default: 3, or ARACHNID_SKIP_ROWS)
    #[arg(long)]
    skip_rows: Option<usize>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an export file
    Clean {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mapping JSON file (default: built-in, or ARACHNID_MAPPING)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        #[command(flatten)]
        reader: ReaderArgs,

        /// Skip rows that fail to clean instead of aborting
        #[arg(long)]
        skip_invalid: bool,

        /// Clean rows in parallel
        #[arg(long)]
        parallel: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Parse an export and output raw rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        reader: ReaderArgs,
    },

    /// Show the built-in field mapping
    Mapping {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Describe the cleaning rules
    Rules,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_ansi(io::stderr().is_terminal());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Clean {
            input,
            output,
            mapping,
            reader,
            skip_invalid,
            parallel,
            format,
        } => cmd_clean(
            &input,
            output.as_deref(),
            mapping,
            &reader,
            skip_invalid,
            parallel,
            format,
        ),

        Commands::Parse {
            input,
            output,
            reader,
        } => cmd_parse(&input, output.as_deref(), &reader),

        Commands::Mapping { output } => cmd_mapping(output.as_deref()),

        Commands::Rules => cmd_rules(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment defaults with CLI flags layered on top.
fn build_options(
    mapping: Option<PathBuf>,
    reader: &ReaderArgs,
) -> Result<CleanOptions, Box<dyn std::error::Error>> {
    let mut options = CleanOptions::from_env()?;
    if mapping.is_some() {
        options.mapping_path = mapping;
    }
    if let Some(skip_rows) = reader.skip_rows {
        options.reader.skip_rows = skip_rows;
    }
    options.reader.delimiter = reader.delimiter;
    Ok(options)
}

fn cmd_clean(
    input: &Path,
    output: Option<&Path>,
    mapping: Option<PathBuf>,
    reader: &ReaderArgs,
    skip_invalid: bool,
    parallel: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = build_options(mapping, reader)?;
    options.policy = if skip_invalid {
        RowPolicy::Skip
    } else {
        RowPolicy::Abort
    };
    options.parallel = parallel;

    eprintln!("📄 Cleaning: {}", input.display());
    let result = clean_file(input, &options)?;

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", result.csv_info.delimiter.escape_default());
    eprintln!("   Rows: {}", result.csv_info.row_count);

    if !result.skipped.is_empty() {
        eprintln!("   ⚠️  Skipped: {}", result.skipped.len());
        for skip in result.skipped.iter().take(5) {
            eprintln!("     - row {}: {}", skip.row, skip.reason);
        }
    }

    match output {
        Some(path) => {
            write_records(&result.records, format, BufWriter::new(File::create(path)?))?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => write_records(&result.records, format, io::stdout().lock())?,
    }

    eprintln!("✅ Cleaned {} records", result.records.len());
    Ok(())
}

fn cmd_parse(
    input: &Path,
    output: Option<&Path>,
    reader: &ReaderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_options(None, reader)?;

    eprintln!("📄 Parsing CSV: {}", input.display());
    let result = parse_file(input, &options.reader)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Columns: {}", result.headers.len());
    eprintln!("✅ Parsed {} rows", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)
}

fn cmd_mapping(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = FieldMapping::arachnid();
    eprintln!(
        "📋 {} ({} columns)",
        mapping.description(),
        mapping.columns().len()
    );
    let json = mapping.to_json()?;
    write_output(&json, output)
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", rules_description());
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
