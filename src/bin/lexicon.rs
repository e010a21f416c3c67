//! Dictionary maintenance: extract the emoji universe, generate word
//! batches through an external CLI, merge batches into the dictionary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emoji_core::dictionary::{Dictionary, MergePolicy};
use emoji_core::generator::{batch_files, BatchGenerator, ProcessSource};
use emoji_core::ranges::{self, DEFAULT_RANGES};
use emoji_core::{Error, LexiconConfig, OffsetStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "lexicon")]
#[command(about = "Build the emoji dictionary: extract, generate, merge")]
#[command(version)]
struct Cli {
    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ordered emoji list
    #[arg(long, global = true)]
    universe: Option<PathBuf>,

    /// Directory holding batch_<start>-<end>.json files
    #[arg(long, global = true)]
    batch_dir: Option<PathBuf>,

    /// Offset state file
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Dictionary file
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate emoji code-point ranges into the universe file
    Extract {
        /// Output path (defaults to the configured universe file)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Keep code points that look like letters, digits or punctuation
        #[arg(long)]
        no_filter: bool,
    },

    /// Generate words for the next batch of emoji
    Generate {
        /// Start offset; defaults to the saved state
        offset: Option<String>,

        #[arg(short, long)]
        batch_size: Option<usize>,

        #[arg(long)]
        min_words: Option<usize>,

        #[arg(long)]
        max_words: Option<usize>,

        /// Per-emoji timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Generation program to run
        #[arg(long)]
        program: Option<String>,
    },

    /// Merge batch files into the dictionary
    Merge {
        /// Batch files; defaults to every batch file in the batch directory
        files: Vec<PathBuf>,

        /// Replace words of emoji already in the dictionary
        #[arg(long)]
        overwrite: bool,

        /// Category label for newly added emoji
        #[arg(short, long)]
        category: Option<String>,

        /// Start a new dictionary if none exists
        #[arg(long)]
        create: bool,
    },

    /// Show progress through the universe
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("emoji_core=info".parse().expect("static directive"))
                .add_directive("lexicon=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(inner) if inner.is_missing_prerequisite() => error!("{e:#}"),
                _ => error!("unrecoverable error: {e:#}"),
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = LexiconConfig::load(cli.config.as_deref())?;
    if let Some(p) = cli.universe {
        config.universe_path = p;
    }
    if let Some(p) = cli.batch_dir {
        config.batch_dir = p;
    }
    if let Some(p) = cli.state {
        config.state_path = p;
    }
    if let Some(p) = cli.dictionary {
        config.dictionary_path = p;
    }

    match cli.command {
        Commands::Extract { out, no_filter } => extract(&config, out, no_filter),
        Commands::Generate { offset, batch_size, min_words, max_words, timeout, program } => {
            config.batch_size = batch_size.unwrap_or(config.batch_size);
            config.min_words = min_words.unwrap_or(config.min_words);
            config.max_words = max_words.unwrap_or(config.max_words);
            config.timeout_secs = timeout.unwrap_or(config.timeout_secs);
            if let Some(program) = program {
                config.program = program;
            }
            generate(&config, offset.as_deref()).await
        }
        Commands::Merge { files, overwrite, category, create } => {
            merge(&config, files, MergePolicy { overwrite, category }, create)
        }
        Commands::Status => status(&config),
    }
}

fn extract(config: &LexiconConfig, out: Option<PathBuf>, no_filter: bool) -> Result<()> {
    let path = out.unwrap_or_else(|| config.universe_path.clone());
    let items = ranges::enumerate(DEFAULT_RANGES, !no_filter);
    ranges::write_universe(&path, &items)?;
    println!("Wrote {} emoji to '{}'", items.len(), path.display());
    Ok(())
}

async fn generate(config: &LexiconConfig, offset_arg: Option<&str>) -> Result<()> {
    config.validate()?;
    let universe = ranges::load_universe(&config.universe_path)
        .with_context(|| "run `lexicon extract` first to create the emoji list")?;

    if universe.is_empty() {
        warn!(path = %config.universe_path.display(), "universe is empty, nothing to generate");
        return Ok(());
    }

    let store = OffsetStore::at_path(&config.state_path);
    let state = store.load(offset_arg);

    let generator = BatchGenerator::from_config(ProcessSource::from_config(config), config);
    let run = generator.run_batch(&universe, state).await;
    let window = run.batch.window().clone();

    if run.batch.is_empty() {
        warn!(start = window.start, end = window.end, "no usable emoji in this window");
        println!("Skipped positions {}-{}: no usable emoji", window.start, window.end - 1);
    } else {
        let path = run.batch.write_to(&config.batch_dir)?;
        println!(
            "Processed {} emoji ({}-{}) -> '{}'",
            run.batch.len(),
            window.start,
            window.end - 1,
            path.display()
        );
    }
    let saved = store.save(run.next_state.current_offset)?;
    println!("Next offset: {} of {}", saved.current_offset, universe.len());
    if saved.current_offset >= universe.len() {
        println!("Reached the end of the list; the next run starts over at 0.");
    }
    Ok(())
}

fn merge(config: &LexiconConfig, files: Vec<PathBuf>, policy: MergePolicy, create: bool) -> Result<()> {
    let files = if files.is_empty() { batch_files(&config.batch_dir)? } else { files };
    if files.is_empty() {
        println!("No batch files to merge.");
        return Ok(());
    }

    let mut dictionary = Dictionary::load_or_create(&config.dictionary_path, create)?;
    let report = dictionary.merge_files(&files, &policy);

    for file in &report.unreadable {
        println!("Skipped '{}': not a readable batch file", file.display());
    }
    for emoji in &report.skipped {
        println!("Skipped {emoji}: already in the dictionary (use --overwrite to replace)");
    }
    if report.changed() {
        let backup = dictionary.save_with_backup(&config.dictionary_path)?;
        println!(
            "Added {}, replaced {}, skipped {}; dictionary now has {} emoji",
            report.added.len(),
            report.replaced.len(),
            report.skipped.len(),
            dictionary.len()
        );
        if let Some(bak) = backup {
            println!("Previous dictionary saved to '{}'", bak.display());
        }
    } else {
        println!("Nothing new to merge ({} skipped).", report.skipped.len());
    }
    Ok(())
}

fn status(config: &LexiconConfig) -> Result<()> {
    let store = OffsetStore::at_path(&config.state_path);
    let state = store.read();

    match ranges::load_universe(&config.universe_path) {
        Ok(universe) => {
            let offset = state.map(|s| s.current_offset).unwrap_or(0);
            let done = offset.min(universe.len());
            let pct = if universe.is_empty() { 100.0 } else { done as f64 * 100.0 / universe.len() as f64 };
            println!("Universe:   {} emoji ({} positions)", universe.usable(), universe.len());
            println!("Offset:     {offset} ({pct:.1}% processed)");
        }
        Err(Error::MissingFile(p)) => println!("Universe:   missing ('{}')", p.display()),
        Err(e) => return Err(e.into()),
    }
    if let Some(updated) = state.and_then(|s| s.last_updated) {
        println!("Updated:    {}", updated.to_rfc3339());
    }

    let batches = batch_files(&config.batch_dir).map(|f| f.len()).unwrap_or(0);
    println!("Batches:    {batches} in '{}'", config.batch_dir.display());

    match Dictionary::load(&config.dictionary_path) {
        Ok(d) => println!("Dictionary: {} emoji", d.len()),
        Err(Error::MissingFile(_)) => println!("Dictionary: not created yet"),
        Err(e) => warn!(error = %e, "dictionary is unreadable"),
    }
    Ok(())
}
