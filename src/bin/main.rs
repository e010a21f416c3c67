use anyhow::Result;
use clap::Parser;
use crossterm::style::Stylize;
use emoji_core::core::converter::SubstitutionMode;
use emoji_core::core::engine::Suggestion;
use emoji_core::EmojiEngine;
use std::io::{stdin, stdout, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "emojify")]
#[command(about = "Replace words with emoji")]
#[command(version)]
struct Cli {
    /// Text to convert; read from stdin when omitted
    text: Vec<String>,

    /// Dictionary file (defaults to the user config directory)
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Keep the words and add the emoji after them
    #[arg(short, long)]
    append: bool,

    /// Also match words with a single typo
    #[arg(short, long)]
    fuzzy: bool,

    /// List emoji for words starting with PREFIX instead of converting
    #[arg(short, long, value_name = "PREFIX")]
    suggest: Option<String>,

    /// Number of suggestions
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// Prompt for lines until 'exit'
    #[arg(short, long)]
    interactive: bool,
}

// Gets the default path for any user, falling back to the working directory.
fn get_dictionary_path() -> PathBuf {
    match dirs::config_dir() {
        Some(mut path) => {
            path.push("emoji-lexicon");
            path.push("dictionary.json");
            path
        }
        None => PathBuf::from("dictionary.json"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("emoji_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let dict_path = cli.dictionary.clone().unwrap_or_else(get_dictionary_path);
    let engine = EmojiEngine::from_file_or_new(&dict_path);
    if engine.dictionary.is_empty() {
        tracing::warn!(path = %dict_path.display(), "dictionary is empty; text will pass through unchanged");
    }
    let mode = if cli.append { SubstitutionMode::Append } else { SubstitutionMode::Replace };

    if let Some(prefix) = &cli.suggest {
        for s in engine.suggest(prefix, cli.count) {
            println!("{}  {} ({})", s.emoji, s.word, s.score);
        }
        return Ok(());
    }

    if cli.interactive {
        return interactive(&engine, mode, cli.fuzzy, cli.count);
    }

    let text = if cli.text.is_empty() {
        let mut buf = String::new();
        stdin().read_to_string(&mut buf)?;
        buf
    } else {
        cli.text.join(" ")
    };
    print!("{}", engine.emojify(&text, mode, cli.fuzzy));
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn interactive(engine: &EmojiEngine, mut mode: SubstitutionMode, mut fuzzy: bool, count: usize) -> Result<()> {
    println!("{}", "Emojify. Type text to convert, 'exit' to quit.".bold());
    println!("Commands: ':s <prefix>' suggestions, ':fuzzy' and ':append' toggle options.");
    println!("---------------------------------------------------------------");

    loop {
        print!("\n{} ", ">".green());
        stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim_end_matches(&['\r', '\n'][..]);

        match cmd.trim() {
            "exit" => break,
            "" => {}
            ":fuzzy" => {
                fuzzy = !fuzzy;
                println!("fuzzy matching {}", if fuzzy { "on" } else { "off" });
            }
            ":append" => {
                mode = match mode {
                    SubstitutionMode::Replace => SubstitutionMode::Append,
                    SubstitutionMode::Append => SubstitutionMode::Replace,
                };
                println!("mode: {:?}", mode);
            }
            s if s == ":s" || s.starts_with(":s ") => {
                let prefix = s[2..].trim();
                print_suggestions(prefix, &engine.suggest(prefix, count));
            }
            _ => {
                let converted = engine.emojify(cmd, mode, fuzzy);
                println!("{}", converted.as_str().bold());
                if let Some(last) = cmd.split_whitespace().last() {
                    print_suggestions(last, &engine.suggest(last, count));
                }
            }
        }
    }
    Ok(())
}

fn print_suggestions(prefix: &str, suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("{}", format!("No suggestions for '{prefix}'.").dark_grey());
        return;
    }
    println!("{}", format!("Suggestions for '{prefix}':").dark_grey());
    for (i, s) in suggestions.iter().enumerate() {
        println!("  :{}: {} {} (score: {})", i + 1, s.emoji, s.word, s.score);
    }
}
