//! juken CLI: answer judgment and grading from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "juken", version, about = "Answer judgment and grading for exam drills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a single answer against the expected one
    Judge {
        /// The student's answer
        #[arg(allow_negative_numbers = true)]
        student: String,

        /// The expected answer
        #[arg(allow_negative_numbers = true)]
        correct: String,

        /// Absolute tolerance for numeric answers
        #[arg(long)]
        tolerance: Option<f64>,

        /// Accept leading numeric prefixes such as "4.8cm"
        #[arg(long)]
        lax: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade answer sheets against an answer key
    Grade {
        /// Path to the answer key .toml
        #[arg(long)]
        key: PathBuf,

        /// Answer sheet .toml file or directory of sheets
        #[arg(long)]
        sheets: PathBuf,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, text
        #[arg(long, default_value = "json")]
        format: String,

        /// Max answer sheets loaded concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate answer key TOML files
    Validate {
        /// Path to answer key file or directory
        #[arg(long)]
        key: PathBuf,
    },

    /// Compare two grading reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example answer key
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("juken=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Judge {
            student,
            correct,
            tolerance,
            lax,
            format,
            config,
        } => commands::judge::execute(student, correct, tolerance, lax, format, config),
        Commands::Grade {
            key,
            sheets,
            output,
            format,
            parallelism,
            config,
        } => commands::grade::execute(key, sheets, output, format, parallelism, config).await,
        Commands::Validate { key } => commands::validate::execute(key),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
