//! # Farm Advisor CLI (`fad`)
//!
//! The `fad` binary is the interface to the Farm Advisor pipeline. It
//! provides commands for building the vector index from a document corpus,
//! asking corpus-grounded questions, inspecting raw retrieval, and
//! generating seasonal farming advice.
//!
//! ## Usage
//!
//! ```bash
//! fad --config ./config/advisor.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fad build` | Load the corpus, chunk, embed, and write the index |
//! | `fad ask "<question>"` | Answer a question with source citations |
//! | `fad search "<query>"` | Show the raw nearest-neighbor retrieval |
//! | `fad advise --location <L>` | Seasonal farming advice for a location |
//! | `fad questions` | Print the example questions |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use farm_advisor::advise;
use farm_advisor::advisor::Advisor;
use farm_advisor::answer::citation_label;
use farm_advisor::chunk::split_documents;
use farm_advisor::config::load_config;
use farm_advisor::embedding::create_embedder;
use farm_advisor::generation::create_generator;
use farm_advisor::index::VectorIndex;
use farm_advisor::loader::load_corpus;
use farm_advisor::season::Hemisphere;

/// Example questions surfaced by the presentation layer.
const QUICK_QUESTIONS: [&str; 4] = [
    "How do I improve soil quality naturally?",
    "What crops are best for sandy soil?",
    "How to prevent pest infestations in crops?",
    "What are the best irrigation techniques?",
];

/// Farm Advisor CLI — retrieval-augmented agricultural question answering.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/advisor.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "fad",
    about = "Farm Advisor — retrieval-augmented agricultural question answering",
    version,
    long_about = "Farm Advisor ingests a corpus of agricultural reference material (PDF, \
    plain text, CSV), embeds it into a persisted vector index, and answers questions by \
    retrieving the most similar passages and asking a language model for a cited answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/advisor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector index from the corpus directory.
    ///
    /// Loads every supported file (PDF per page, text per file, CSV per
    /// row), splits the documents into overlapping chunks, embeds them in
    /// batches, and writes the index artifact. Rebuilding regenerates the
    /// artifact from scratch.
    Build,

    /// Ask a question and get a corpus-grounded, cited answer.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve (defaults to retrieval.top_k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Show the raw nearest-neighbor retrieval for a query.
    Search {
        /// The search query.
        query: String,

        /// Number of entries to return (defaults to retrieval.top_k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Generate seasonal farming advice for a location.
    ///
    /// Resolves the current season from today's date and the hemisphere,
    /// then asks the language model for advice on activities, challenges,
    /// resource management, preparation, and sustainable practices.
    Advise {
        /// Geographic location (country, region, etc.).
        #[arg(long)]
        location: String,

        /// Optional crop to focus the advice on.
        #[arg(long)]
        crop: Option<String>,

        /// `northern` or `southern`.
        #[arg(long, default_value = "northern")]
        hemisphere: String,
    },

    /// Print the example questions.
    Questions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Questions = cli.command {
        for q in QUICK_QUESTIONS {
            println!("- {}", q);
        }
        return Ok(());
    }

    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Build => {
            let documents = load_corpus(&cfg.corpus)?;
            let chunks = split_documents(
                &documents,
                cfg.chunking.chunk_size,
                cfg.chunking.chunk_overlap,
            )?;
            let embedder = create_embedder(&cfg.embedding)?;
            let index = VectorIndex::build(
                &cfg.index.path,
                embedder.as_ref(),
                &chunks,
                cfg.embedding.batch_size,
            )
            .await?;

            println!("build");
            println!("  documents loaded: {}", documents.len());
            println!("  chunks embedded: {}", chunks.len());
            println!(
                "  model: {} ({} dims)",
                index.model(),
                index.dims()
            );
            println!("  index written: {}", cfg.index.path.display());
            println!("ok");
            index.close().await;
        }

        Commands::Ask { question, k } => {
            let embedder = create_embedder(&cfg.embedding)?;
            let generator = create_generator(&cfg.generation)?;
            let index = VectorIndex::open(&cfg.index.path).await?;
            let advisor = Advisor::new(embedder, generator, index);

            let reply = advisor
                .ask(&question, k.unwrap_or(cfg.retrieval.top_k))
                .await?;

            println!("{}", reply.text);
            if !reply.citations.is_empty() {
                println!();
                println!("Sources:");
                for citation in &reply.citations {
                    println!("- {}", citation);
                }
            }
            if !reply.grounded {
                println!();
                println!("(no relevant passages were found; this answer is not grounded in the corpus)");
            }
            advisor.close().await;
        }

        Commands::Search { query, k } => {
            let embedder = create_embedder(&cfg.embedding)?;
            let index = VectorIndex::open(&cfg.index.path).await?;

            let results = index
                .query(embedder.as_ref(), &query, k.unwrap_or(cfg.retrieval.top_k))
                .await?;

            if results.is_empty() {
                println!("No results.");
            }
            for (i, result) in results.iter().enumerate() {
                println!(
                    "{}. [{:.3}] {}",
                    i + 1,
                    result.score,
                    citation_label(&result.source, result.page)
                );
                println!("    excerpt: \"{}\"", excerpt(&result.text));
                println!();
            }
            index.close().await;
        }

        Commands::Advise {
            location,
            crop,
            hemisphere,
        } => {
            let generator = create_generator(&cfg.generation)?;
            let hemisphere: Hemisphere = hemisphere.parse()?;

            let advice =
                advise::seasonal_advice(generator.as_ref(), &location, crop.as_deref(), hemisphere)
                    .await?;

            println!("Season: {}", advice.season);
            println!();
            println!("{}", advice.text);
        }

        Commands::Questions => unreachable!(),
    }

    Ok(())
}

fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    flat.trim().chars().take(160).collect()
}
