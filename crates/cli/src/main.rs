// markgrid CLI - headless exam grading runs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use markgrid_cli::exit_codes::EXIT_SUCCESS;
use markgrid_cli::{ops, CliError};

#[derive(Parser)]
#[command(name = "mgrid")]
#[command(about = "Exam grading and identifier reconciliation (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a student sheet against a question bank
    #[command(after_help = "\
Examples:
  mgrid grade bank.xlsx sheet.xlsx
  mgrid grade bank.csv sheet.csv --json
  mgrid grade bank.xlsx sheet.xlsx --output run.json
  mgrid grade bank.xlsx sheet.xlsx --config keywords.toml")]
    Grade {
        /// Question bank file (csv, tsv, xlsx, xls)
        bank: PathBuf,

        /// Student answer sheet file
        sheet: PathBuf,

        /// TOML file overriding role keywords and exclusion patterns
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full run report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON run report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Infer column roles from a question bank without grading
    #[command(after_help = "\
Examples:
  mgrid inspect bank.xlsx
  mgrid inspect bank.csv --json")]
    Inspect {
        /// Question bank file
        bank: PathBuf,

        /// TOML file overriding role keywords and exclusion patterns
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the bank report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Export the bank rows a student answered wrong
    #[command(after_help = "\
Examples:
  mgrid errors bank.xlsx sheet.xlsx Alice
  mgrid errors bank.xlsx sheet.xlsx Alice --out alice.xlsx
  mgrid errors bank.xlsx sheet.xlsx --all --out-dir books/")]
    Errors {
        /// Question bank file
        bank: PathBuf,

        /// Student answer sheet file
        sheet: PathBuf,

        /// Student name (omit with --all)
        student: Option<String>,

        /// Export one error book per student
        #[arg(long)]
        all: bool,

        /// Output file for a single student (format by extension)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output directory for --all
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// TOML file overriding role keywords and exclusion patterns
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print or export the class ranking (name, score)
    #[command(after_help = "\
Examples:
  mgrid summary bank.xlsx sheet.xlsx
  mgrid summary bank.xlsx sheet.xlsx --output scores.xlsx")]
    Summary {
        /// Question bank file
        bank: PathBuf,

        /// Student answer sheet file
        sheet: PathBuf,

        /// Output file (csv, tsv, or xlsx by extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// TOML file overriding role keywords and exclusion patterns
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade { bank, sheet, config, json, output } => {
            ops::run_grade(&bank, &sheet, config.as_deref(), json, output.as_deref())
        }
        Commands::Inspect { bank, config, json } => {
            ops::run_inspect(&bank, config.as_deref(), json)
        }
        Commands::Errors { bank, sheet, student, all, out, out_dir, config } => ops::run_errors(
            &bank,
            &sheet,
            student.as_deref(),
            all,
            out.as_deref(),
            out_dir.as_deref(),
            config.as_deref(),
        ),
        Commands::Summary { bank, sheet, output, config } => {
            ops::run_summary(&bank, &sheet, output.as_deref(), config.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            eprintln!("error: {message}");
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}
