mod commands;
mod config;
mod error;
mod output;
mod server;
mod telemetry;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "prevalence",
    version,
    about = "Estimate drug-use prevalence for a demographic profile from published survey rates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank drugs by estimated prevalence for a set of answers
    Predict {
        /// An answer as QUESTION=OPTION (repeatable), e.g. -a age=20–24
        #[arg(short, long = "answer", value_name = "QUESTION=OPTION")]
        answer: Vec<String>,

        /// JSON object of answers; -a flags override entries in it
        #[arg(long = "answers", value_name = "FILE")]
        answers: Option<PathBuf>,

        /// Rate table JSON file (takes precedence over --dataset)
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,

        /// Bundled dataset name (default: csew-sample)
        #[arg(long, value_name = "NAME")]
        dataset: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show per-question rates and ratios
        #[arg(long)]
        verbose: bool,
    },
    /// List the questions and their answer options
    Questions {
        /// Rate table JSON file (takes precedence over --dataset)
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,

        /// Bundled dataset name (default: csew-sample)
        #[arg(long, value_name = "NAME")]
        dataset: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Extract a rate table from the CSEW drug misuse XLSX appendix tables
    Extract {
        /// Path to the appendix XLSX workbook
        input_file: PathBuf,

        /// Write the rate table to a JSON file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Validate a rate table file
    Validate {
        /// Path to rate table JSON file
        file: PathBuf,
    },
    /// Serve predictions over HTTP
    Serve {
        /// Bind host (overrides PREVALENCE__SERVER__HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PREVALENCE__SERVER__PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Rate table JSON file (overrides PREVALENCE__DATA__TABLE_PATH)
        #[arg(long, value_name = "FILE")]
        table: Option<PathBuf>,

        /// Bundled dataset name (overrides PREVALENCE__DATA__DATASET)
        #[arg(long, value_name = "NAME")]
        dataset: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // serve sets up logging from its own configuration
    if !matches!(cli.command, Commands::Serve { .. }) {
        telemetry::init("warn");
    }

    let result = match cli.command {
        Commands::Predict {
            answer,
            answers,
            table,
            dataset,
            output,
            verbose,
        } => commands::predict::run(answer, answers, table, dataset, &output, verbose),
        Commands::Questions {
            table,
            dataset,
            output,
        } => commands::questions::run(table, dataset, &output),
        Commands::Extract { input_file, out } => commands::extract::run(input_file, out),
        Commands::Validate { file } => commands::validate::run(&file),
        Commands::Serve {
            host,
            port,
            table,
            dataset,
        } => commands::serve::run(host, port, table, dataset),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
