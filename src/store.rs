use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::miner::{self, Taxonomy};
use crate::parser::Review;

pub const REVIEW_HEADERS: [&str; 4] = ["Reviewer Name", "Rating", "Review Text", "Sentiment"];

const CAUSAL_COLUMN: &str = "CAUSAL_VERBATIM";
const CUSTOMER_COLUMN: &str = "CUSTOMER_VERBATIM";

const MINE_CHUNK: usize = 500;

/// Write the review table. Column set and order are the compatibility contract
/// for downstream consumers; an empty extraction still writes the header row.
pub fn write_reviews(path: &Path, reviews: &[Review]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating '{}'", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    if reviews.is_empty() {
        writer.write_record(REVIEW_HEADERS)?;
    }
    for review in reviews {
        writer.serialize(review)?;
    }
    writer.flush()?;
    info!("wrote {} reviews to '{}'", reviews.len(), path.display());
    Ok(())
}

pub struct MineStats {
    pub rows: usize,
    /// (component label, row count), most frequent first.
    pub component_counts: Vec<(String, usize)>,
}

impl MineStats {
    pub fn print(&self) {
        println!("Mined {} rows.", self.rows);
        if !self.component_counts.is_empty() {
            println!("\nFailure frequency by component:");
            for (label, count) in &self.component_counts {
                println!("  {:<16} {:>5}", label, count);
            }
        }
    }
}

/// Read the complaint dataset, classify each row against both taxonomies, and
/// write it back out with Mined_Component and Mined_Failure appended. All other
/// columns pass through unmodified.
pub fn mine_dataset(
    input: &Path,
    output: &Path,
    components: &Taxonomy,
    failures: &Taxonomy,
) -> Result<MineStats> {
    let file = File::open(input).with_context(|| format!("opening '{}'", input.display()))?;
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let causal_idx = find_column(&headers, CAUSAL_COLUMN);
    let customer_idx = find_column(&headers, CUSTOMER_COLUMN);
    if causal_idx.is_none() && customer_idx.is_none() {
        bail!(
            "'{}' has neither a {} nor a {} column",
            input.display(),
            CAUSAL_COLUMN,
            CUSTOMER_COLUMN
        );
    }

    let records: Vec<StringRecord> = reader
        .records()
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("reading rows from '{}'", input.display()))?;

    let out_file =
        File::create(output).with_context(|| format!("creating '{}'", output.display()))?;
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(BufWriter::new(out_file));

    let mut out_headers = headers.clone();
    out_headers.push_field("Mined_Component");
    out_headers.push_field("Mined_Failure");
    writer.write_record(&out_headers)?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut tally: HashMap<String, usize> = HashMap::new();
    for chunk in records.chunks(MINE_CHUNK) {
        // Rows are independent; classification order never affects labels
        let mined: Vec<(String, String)> = chunk
            .par_iter()
            .map(|record| {
                let causal = field_at(record, causal_idx);
                let customer = field_at(record, customer_idx);
                miner::mine_row(causal, customer, components, failures)
            })
            .collect();

        for (record, (component, failure)) in chunk.iter().zip(&mined) {
            let mut out = record.clone();
            out.push_field(component);
            out.push_field(failure);
            writer.write_record(&out)?;
            *tally.entry(component.clone()).or_default() += 1;
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    writer.flush()?;

    let mut component_counts: Vec<(String, usize)> = tally.into_iter().collect();
    component_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    info!("mined {} rows from '{}'", records.len(), input.display());
    Ok(MineStats {
        rows: records.len(),
        component_counts,
    })
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Missing columns and short rows both read as empty text.
fn field_at<'a>(record: &'a StringRecord, idx: Option<usize>) -> &'a str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

// ── Tests ──
