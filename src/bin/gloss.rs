//! Gloss CLI
//!
//! Reads a word list, resolves a gloss for every word and writes the ordered
//! result for the dictation sheet renderer.
//!
//! Usage:
//!   cargo run --features cli --bin gloss -- word.txt --output glosses.json
//!
//! Examples:
//!   # TSV to stdout, four concurrent dictionary lookups
//!   cargo run --features cli --bin gloss -- word.txt --format tsv --concurrency 4
//!
//!   # Blank sheet (part-of-speech tags only) from the image step's comma list
//!   cargo run --features cli --bin gloss -- word.txt --comma-separated --blank
//!
//!   # Both sheets from a single resolution pass
//!   cargo run --features cli --bin gloss -- word.txt -o glosses.json --blank-output blank.json

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use dictation_gloss::{
    export_to_path, load_word_list, write_export, BatchTranslator, DictionaryClient, EnrichmentPipeline,
    ExportFormat, GlossConfig, OmittedWordPolicy, OpenAiCompatibleClient,
};

#[derive(Parser, Debug)]
#[command(name = "gloss")]
#[command(about = "Resolve glosses for a word list: dictionary first, LLM fallback")]
struct Args {
    /// Word list, one word or phrase per line
    input: PathBuf,

    /// YAML configuration file (defaults plus GLOSS_* environment otherwise)
    #[arg(long, short = 'c', env = "GLOSS_CONFIG")]
    config: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format: json or tsv
    #[arg(long, short = 'f', default_value = "json")]
    format: ExportFormat,

    /// Keep only part-of-speech tags (fill-in dictation sheet)
    #[arg(long)]
    blank: bool,

    /// Also write the blank sheet to this file, from the same results
    #[arg(long)]
    blank_output: Option<PathBuf>,

    /// Input is comma separated instead of one item per line
    #[arg(long)]
    comma_separated: bool,

    /// Words per model call (1-20)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Concurrent dictionary lookups
    #[arg(long)]
    concurrency: Option<usize>,

    /// Re-send words the model omitted once before giving up
    #[arg(long)]
    retry_omitted: bool,
}

fn load_config(args: &Args) -> Result<GlossConfig> {
    let mut config = match &args.config {
        Some(path) => GlossConfig::from_file(path)?,
        None => GlossConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(size) = args.chunk_size {
        config.pipeline.chunk_size = size;
    }
    if let Some(n) = args.concurrency {
        config.pipeline.lookup_concurrency = n;
    }
    if args.retry_omitted {
        config.pipeline.omitted_word_policy = OmittedWordPolicy::RetryOnce;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dictation_gloss=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    // The word list is the only fatal input; nothing is looked up without it
    let words = match load_word_list(&args.input, args.comma_separated) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("{} {}", "ERROR:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let dictionary = DictionaryClient::new(&config.dictionary)?;
    let llm = OpenAiCompatibleClient::from_config(&config.model)
        .context("Failed to create model client")?;
    let translator = BatchTranslator::with_config(Arc::new(llm), &config.model);
    let pipeline = EnrichmentPipeline::from_config(&config, Arc::new(dictionary), translator);

    let report = pipeline.resolve_with_report(&words).await;

    match &args.output {
        Some(path) => export_to_path(&report, args.format, args.blank, path)?,
        None => write_export(&report, args.format, args.blank, io::stdout().lock())?,
    }
    if let Some(path) = &args.blank_output {
        export_to_path(&report, args.format, true, path)?;
    }

    let stats = &report.stats;
    eprintln!("\n{} {} words", "Resolved:".green().bold(), stats.total_words);
    eprintln!("  {} {}", "dictionary:".cyan(), stats.dictionary_found);
    eprintln!("  {} {}", "model:".cyan(), stats.model_resolved);
    if stats.unresolved > 0 {
        eprintln!("  {} {}", "unresolved:".yellow().bold(), stats.unresolved);
    }
    if stats.batches_failed > 0 {
        eprintln!(
            "  {} {}/{}",
            "failed batches:".red(),
            stats.batches_failed,
            stats.batches_attempted
        );
    }
    for path in args.output.iter().chain(&args.blank_output) {
        eprintln!("{} {}", "Saved:".green().bold(), path.display());
    }

    Ok(())
}
