use clap::{Parser, Subcommand};
use profile_assistant::Result;
use profile_assistant::commands::{ask_questions, build_index, chunk_file, run_chat};
use profile_assistant::config::{Config, get_config_dir, run_interactive_config, show_config};
use profile_assistant::index::Metric;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "profile-assistant")]
#[command(about = "Answer questions about a personal profile with retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to ~/.profile-assistant)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the provider connection and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// With --show, also verify the provider is reachable
        #[arg(long, requires = "show")]
        check: bool,
    },
    /// Split a corpus file into chunks and print them
    Chunk {
        /// Plain text profile corpus
        file: PathBuf,
        /// Maximum words per chunk
        #[arg(long)]
        max_words: Option<usize>,
    },
    /// Chunk and embed a corpus file, then save the index
    BuildIndex {
        /// Plain text profile corpus
        corpus: PathBuf,
        /// Maximum words per chunk
        #[arg(long)]
        max_words: Option<usize>,
        /// Similarity metric: l2 or inner_product
        #[arg(long)]
        metric: Option<Metric>,
    },
    /// Answer one or more questions
    Ask {
        /// Questions to answer
        #[arg(required = true)]
        questions: Vec<String>,
    },
    /// Start an interactive question and answer session
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config_dir = get_config_dir(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Config { show, check } => {
            if show {
                show_config(&Config::load(&config_dir)?, check)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Chunk { file, max_words } => {
            let config = Config::load(&config_dir)?;
            chunk_file(&file, max_words.unwrap_or(config.chunking.max_words))?;
        }
        Commands::BuildIndex {
            corpus,
            max_words,
            metric,
        } => {
            build_index(&Config::load(&config_dir)?, &corpus, max_words, metric)?;
        }
        Commands::Ask { questions } => {
            ask_questions(&Config::load(&config_dir)?, questions).await?;
        }
        Commands::Chat => {
            run_chat(&Config::load(&config_dir)?)?;
        }
    }

    Ok(())
}
