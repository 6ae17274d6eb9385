use clap::{Parser, Subcommand};
use colored::*;
use datatooltk::cli::{self, ImportArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datatooltk")]
#[command(about = "Import spreadsheets and delimited text as datatool databases")]
#[command(long_about = "datatooltk - typed data import for the LaTeX datatool package

Every cell is classified as a string, integer, decimal, currency, date,
time or date-time value, formatted for the configured locale, and escaped
so that it is safe to use in a LaTeX document.

COMMANDS:
  import    - Read a CSV/TSV/XLSX/XLS/ODS file and write DTLTEX, CSV, TSV or XLSX
  inspect   - Show the columns, inferred types and first rows of a data file
  classify  - Show how individual values are classified

EXAMPLES:
  datatooltk import scores.xlsx scores.dtltex
  datatooltk import data.csv data.dtltex --blank-rows end --empty-to-null
  datatooltk inspect budget.ods --sheet Summary
  datatooltk classify '$1,234.50' 2024-03-05 '1.5e3'

LOGGING:
  Set RUST_LOG (e.g. RUST_LOG=datatooltk=debug) or pass --verbose.")]
#[command(version)]
struct Cli {
    /// Show progress and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Import a data file and write it out as a database.

The output format follows the output file extension:
  .dtltex / .tex  DTLTEX 3.0, loadable with \\DTLread
  .csv / .tsv     delimited text of the formatted values
  .xlsx           a single worksheet with numeric cells kept numeric

SETTINGS:
  Options can be stored in a YAML file (--settings) using the same names,
  e.g. 'locale: de-DE' or 'blank-rows: end'. Command-line options win.")]
    /// Import a data file and write it as a database
    Import {
        /// Input file (.csv, .tsv, .xlsx, .xlsm, .xls, .ods)
        input: PathBuf,

        /// Output file (.dtltex, .tex, .csv, .tsv, .xlsx)
        output: PathBuf,

        #[command(flatten)]
        args: ImportArgs,
    },

    /// Show the columns, types and first rows of a data file
    Inspect {
        /// Input file
        input: PathBuf,

        /// Number of rows to preview
        #[arg(short, long, default_value = "5")]
        rows: usize,

        #[command(flatten)]
        args: ImportArgs,
    },

    /// Classify values as they would be on import
    Classify {
        /// Values to classify
        #[arg(required = true)]
        values: Vec<String>,

        /// Number locale
        #[arg(long, value_name = "ID")]
        locale: Option<String>,

        /// YAML settings file
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "datatooltk=debug"
    } else {
        "datatooltk=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Import {
            input,
            output,
            args,
        } => cli::import(input, output, &args, cli.verbose),

        Commands::Inspect { input, rows, args } => cli::inspect(input, &args, rows),

        Commands::Classify {
            values,
            locale,
            settings,
        } => cli::classify(values, locale, settings),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "❌ Error:".bold().red(), err);
        std::process::exit(err.exit_code());
    }
}
