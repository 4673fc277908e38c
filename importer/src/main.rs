use anyhow::{Context, Result};
use catalog::persist::{load_catalog, save_catalog, CatalogPaths};
use catalog::{Book, Catalog, PopularEntry, SimilarityIndex};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{EnvFilter, fmt};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Parser)]
#[command(name = "importer")]
#[command(about = "Convert training exports into catalog artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the artifact directory from books.jsonl, popular.json, pivot.json and similarity.json
    Build {
        /// Directory holding the training exports
        #[arg(long)]
        input: String,
        /// Output artifact directory
        #[arg(long)]
        output: String,
    },
    /// Load an artifact directory exactly as the server does and report its contents
    Verify {
        #[arg(long, default_value = "./models")]
        data: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_artifacts(Path::new(&input), Path::new(&output)),
        Commands::Verify { data } => verify(Path::new(&data)),
    }
}

fn build_artifacts(input: &Path, output: &Path) -> Result<()> {
    let catalog = read_exports(input)?;
    tracing::info!(
        books = catalog.books().len(),
        popular = catalog.popular().len(),
        titles = catalog.titles().len(),
        "exports validated"
    );

    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    save_catalog(&CatalogPaths::new(output), &catalog, created_at)?;
    tracing::info!(output = %output.display(), "artifacts written");
    Ok(())
}

fn verify(data: &Path) -> Result<()> {
    let catalog = load_catalog(&CatalogPaths::new(data))?;
    let missing = catalog
        .titles()
        .iter()
        .filter(|t| catalog.first_book_with_title(t).is_none())
        .count();
    if missing > 0 {
        tracing::warn!(missing, "pivot titles without a metadata row; recommendations touching them will fail");
    }
    tracing::info!(data = %data.display(), "catalog ok");
    Ok(())
}

/// Read the four training exports and check they form a consistent catalog.
fn read_exports(input: &Path) -> Result<Catalog> {
    let books: Vec<Book> = read_jsonl(&input.join("books.jsonl"))?;
    let popular: Vec<PopularEntry> = read_json(&input.join("popular.json"))?;
    let titles: Vec<String> = read_json(&input.join("pivot.json"))?;
    let rows: Vec<Vec<f32>> = read_json(&input.join("similarity.json"))?;

    let index = SimilarityIndex::from_rows(titles, rows)?;
    Catalog::new(books, popular, index)
}

fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", file.display()))?;
    Ok(value)
}

fn read_jsonl<T: DeserializeOwned>(file: &Path) -> Result<Vec<T>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let item = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(item);
    }
    Ok(out)
}
