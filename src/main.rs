use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Read};

use queryquill::config::Config;
use queryquill::engine::SuggestionEngine;

/// QueryQuill - context-aware path query suggestions and evaluation
#[derive(Parser)]
#[command(name = "queryquill")]
#[command(version)]
#[command(about = "Query JSON/YAML documents and get completion suggestions", long_about = None)]
struct Cli {
    /// Document to query (omit to read from stdin if piped)
    file: Option<String>,

    /// Document format: json or yaml
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Query language: jsonpath or yq
    #[arg(short, long, default_value = "jsonpath")]
    language: String,

    /// Evaluate a query and print the results as JSON
    #[arg(short, long)]
    query: Option<String>,

    /// Print completion suggestions for a partial query
    #[arg(short, long)]
    suggest: Option<String>,

    /// Cursor position inside the partial query (defaults to its end)
    #[arg(long, requires = "suggest")]
    cursor: Option<usize>,

    /// Check query syntax without evaluating
    #[arg(long)]
    validate: Option<String>,
}

fn read_document(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path)),
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!("no input: pass a file or pipe a document to stdin");
            }
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read from stdin")?;
            Ok(content)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    let mut engine = SuggestionEngine::new(&cli.format, &cli.language, config)
        .context("Failed to construct engine")?;

    let content = read_document(cli.file.as_deref())?;
    if !engine.initialize(&content) {
        anyhow::bail!("document failed to parse as {}", cli.format);
    }

    if let Some(query) = &cli.validate {
        let validation = engine.validate_query(query)?;
        if validation.valid {
            println!("valid");
        } else {
            println!("invalid: {}", validation.error.unwrap_or_default());
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(query) = &cli.query {
        let results = engine.execute_query(query)?;
        for result in results {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        return Ok(());
    }

    if let Some(partial) = &cli.suggest {
        for suggestion in engine.get_suggestions(partial, cli.cursor) {
            println!(
                "{}\t{}\t{}",
                suggestion.insert_text, suggestion.display_text, suggestion.description
            );
        }
        return Ok(());
    }

    // No action given: describe the document instead.
    let info = engine.get_info();
    println!(
        "{} document, {} paths, language {}",
        info.document_type, info.available_paths_count, info.query_language
    );
    for suggestion in engine.get_root_suggestions() {
        println!("{}\t{}", suggestion.insert_text, suggestion.description);
    }

    Ok(())
}
