mod document;
mod miner;
mod parser;
mod store;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use miner::{GroupSpec, Taxonomy};

#[derive(Parser)]
#[command(name = "review_miner", about = "Review page extractor + complaint verbatim miner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract review records from a saved product page
    Reviews {
        /// Saved HTML page
        #[arg(short, long)]
        input: PathBuf,
        /// Review table destination
        #[arg(short, long, default_value = "reviews.csv")]
        output: PathBuf,
        /// Declared encoding of the saved page
        #[arg(long, default_value = "utf-8")]
        encoding: String,
    },
    /// Mine complaint verbatims into component and failure categories
    Mine {
        /// Complaint dataset (CSV with CAUSAL_VERBATIM / CUSTOMER_VERBATIM)
        #[arg(short, long)]
        input: PathBuf,
        /// Augmented dataset destination
        #[arg(short, long, default_value = "mined.csv")]
        output: PathBuf,
        /// Ordered component taxonomy, JSON [{label, keywords}]
        #[arg(long)]
        components: Option<PathBuf>,
        /// Ordered failure taxonomy, JSON [{label, keywords}]
        #[arg(long)]
        failures: Option<PathBuf>,
    },
    /// Extract reviews and mine the dataset in one go
    Run {
        /// Saved HTML page
        #[arg(long)]
        page: PathBuf,
        /// Complaint dataset
        #[arg(long)]
        dataset: PathBuf,
        /// Declared encoding of the saved page
        #[arg(long, default_value = "utf-8")]
        encoding: String,
        #[arg(long, default_value = "reviews.csv")]
        reviews_out: PathBuf,
        #[arg(long, default_value = "mined.csv")]
        mined_out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reviews {
            input,
            output,
            encoding,
        } => run_reviews(&input, &output, &encoding),
        Commands::Mine {
            input,
            output,
            components,
            failures,
        } => run_mine(&input, &output, components.as_deref(), failures.as_deref()),
        Commands::Run {
            page,
            dataset,
            encoding,
            reviews_out,
            mined_out,
        } => {
            // The two pipelines share no state; run them back to back
            run_reviews(&page, &reviews_out, &encoding)?;
            run_mine(&dataset, &mined_out, None, None)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_reviews(input: &Path, output: &Path, encoding: &str) -> Result<()> {
    println!("--- Extracting reviews from '{}' ---", input.display());
    if !input.exists() {
        println!("ERROR: '{}' not found.", input.display());
        return Ok(());
    }

    let doc = document::load(input, encoding)?;
    let extraction = parser::extract_reviews(&doc);
    store::write_reviews(output, &extraction.reviews)?;

    if extraction.reviews.is_empty() {
        println!("Extracted 0 reviews; empty table written to '{}'.", output.display());
        println!(
            "Tip: open the page in a browser. If no reviews show there, it was saved before they rendered."
        );
        return Ok(());
    }

    let strategy = extraction
        .strategy
        .map(parser::Strategy::name)
        .unwrap_or("none");
    println!(
        "Extracted {} reviews ({} scan), written to '{}'.",
        extraction.reviews.len(),
        strategy,
        output.display()
    );

    // Compact sample, full text lives in the CSV
    println!(
        "\n{:>3} | {:<20} | {:>6} | {:<8}",
        "#", "Reviewer", "Rating", "Sentiment"
    );
    println!("{}", "-".repeat(46));
    for (i, review) in extraction.reviews.iter().take(5).enumerate() {
        println!(
            "{:>3} | {:<20} | {:>6} | {:<8}",
            i + 1,
            truncate(&review.reviewer, 20),
            review.rating,
            review.sentiment
        );
    }

    Ok(())
}

fn run_mine(
    input: &Path,
    output: &Path,
    components_path: Option<&Path>,
    failures_path: Option<&Path>,
) -> Result<()> {
    println!("--- Mining '{}' ---", input.display());
    if !input.exists() {
        println!("ERROR: '{}' not found.", input.display());
        return Ok(());
    }

    let components = match components_path {
        Some(path) => load_taxonomy(path, "Other")?,
        None => Taxonomy::components(),
    };
    let failures = match failures_path {
        Some(path) => load_taxonomy(path, "Unknown")?,
        None => Taxonomy::failures(),
    };

    let stats = store::mine_dataset(input, output, &components, &failures)?;
    if stats.rows == 0 {
        println!("Mined 0 rows; empty table written to '{}'.", output.display());
        println!("Tip: check that the dataset has data rows below its header.");
        return Ok(());
    }

    stats.print();
    println!("Saved '{}'.", output.display());
    Ok(())
}

fn load_taxonomy(path: &Path, default_label: &str) -> Result<Taxonomy> {
    let file =
        File::open(path).with_context(|| format!("opening taxonomy '{}'", path.display()))?;
    let specs: Vec<GroupSpec> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing taxonomy '{}'", path.display()))?;
    Taxonomy::from_spec(default_label, &specs)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
