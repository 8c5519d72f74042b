//! prepdrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod catalog;
mod commands;

#[derive(Parser)]
#[command(name = "prepdrill", version, about = "Interview practice with AI feedback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a timed practice session
    Practice {
        /// Category slug (e.g. "javascript")
        #[arg(long)]
        category: Option<String>,

        /// Difficulty: easy, medium, hard
        #[arg(long)]
        difficulty: Option<String>,

        /// Pick a specific question by id
        #[arg(long)]
        question: Option<String>,

        /// Answer modality: text, audio, video
        #[arg(long, default_value = "text")]
        modality: String,

        /// Directory for persisted drafts
        #[arg(long)]
        drafts_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Question set TOML (defaults to the built-in set)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Score answer text once, without a session
    Score {
        /// Answer text (reads stdin when neither --text nor --file is given)
        #[arg(long)]
        text: Option<String>,

        /// Read the answer from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Elapsed answer time in seconds
        #[arg(long, default_value = "0")]
        elapsed: u64,

        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the question catalog
    Questions {
        /// Filter to one category
        #[arg(long)]
        category: Option<String>,

        /// Question set TOML (defaults to the built-in set)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Create a starter config and example question set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prepdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            category,
            difficulty,
            question,
            modality,
            drafts_dir,
            config,
            catalog,
        } => {
            commands::practice::execute(
                category, difficulty, question, modality, drafts_dir, config, catalog,
            )
            .await
        }
        Commands::Score {
            text,
            file,
            elapsed,
            json,
        } => commands::score::execute(text, file, elapsed, json),
        Commands::Questions { category, catalog } => {
            commands::questions::execute(category, catalog)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
