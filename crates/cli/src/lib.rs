pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::recommend::RecommendSource;

#[derive(Debug, Parser)]
#[command(
    name = "swimfit",
    about = "SwimFit operator CLI",
    long_about = "Run offline fit recommendations, apply analytics migrations, inspect config, and check readiness.",
    after_help = "Examples:\n  swimfit recommend --json '{\"bra\":\"36C\",\"modesty\":\"high\"}'\n  swimfit doctor --json\n  swimfit stats --limit 5"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a size and coverage recommendation without recording analytics")]
    Recommend {
        #[arg(long, conflicts_with = "json", help = "Read the request payload from a JSON file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Inline JSON request payload")]
        json: Option<String>,
    },
    #[command(about = "Apply pending analytics store migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, size chart, and analytics store connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Summarize recorded recommendations from the SQLite analytics store")]
    Stats {
        #[arg(long, default_value_t = 10, help = "Number of recent records to include")]
        limit: u32,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { file, json } => {
            let source = match (file, json) {
                (Some(path), _) => RecommendSource::File(path),
                (None, Some(text)) => RecommendSource::Inline(text),
                (None, None) => RecommendSource::Stdin,
            };
            commands::recommend::run(source)
        }
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Stats { limit } => commands::stats::run(limit),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
