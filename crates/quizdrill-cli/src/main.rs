//! quizdrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizdrill", version, about = "Quiz drilling and exam practice at the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalogue: modules, checkpoints and final exams
    List {
        /// Catalogue manifest file (overrides the config)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a catalogue manifest
    Validate {
        /// Catalogue manifest file (overrides the config)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz at the terminal
    Take {
        /// What to take: module, checkpoint, final, or saved
        kind: String,

        /// Catalogue id (or saved quiz id)
        id: String,

        /// Catalogue manifest file (overrides the config)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for reproducible question pooling
        #[arg(long)]
        seed: Option<u64>,

        /// Directory to save the score report JSON into
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print a per-question review after finishing
        #[arg(long)]
        review: bool,
    },

    /// Build a custom quiz from chosen modules and save it
    Build {
        /// Module ids to pool from (comma-separated)
        #[arg(long)]
        modules: String,

        /// Question count (default: 20)
        #[arg(long)]
        count: Option<usize>,

        /// Quiz title
        #[arg(long)]
        title: Option<String>,

        /// Seed for reproducible question pooling
        #[arg(long)]
        seed: Option<u64>,

        /// Catalogue manifest file (overrides the config)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List saved custom quizzes, or delete one
    Saved {
        /// Delete the saved quiz with this id
        #[arg(long)]
        delete: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and example catalogue
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizdrill=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { manifest, config } => commands::list::execute(manifest, config),
        Commands::Validate { manifest, config } => commands::validate::execute(manifest, config),
        Commands::Take {
            kind,
            id,
            manifest,
            config,
            seed,
            report,
            review,
        } => commands::take::execute(kind, id, manifest, config, seed, report, review).await,
        Commands::Build {
            modules,
            count,
            title,
            seed,
            manifest,
            config,
        } => commands::build::execute(modules, count, title, seed, manifest, config).await,
        Commands::Saved { delete, config } => commands::saved::execute(delete, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
