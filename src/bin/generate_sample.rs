use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Write a synthetic CORD-19-style metadata file.
#[derive(Debug, Parser)]
struct Args {
    /// Output file; `.csv` or `.parquet`
    #[arg(default_value = "cord19_metadata.csv")]
    output: PathBuf,

    /// Number of papers
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One row in the CORD-19 `metadata.csv` column layout.
#[derive(Debug, Serialize)]
struct Row {
    title: String,
    authors: Option<String>,
    journal: Option<String>,
    source_x: String,
    publish_time: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    doi: Option<String>,
    has_full_text: bool,
}

const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "MedRxiv", "BioRxiv"];
const JOURNALS: &[&str] = &[
    "The Lancet",
    "BMJ",
    "Nature",
    "Science",
    "PLoS One",
    "Journal of Virology",
    "Vaccine",
    "Emerging Infectious Diseases",
    "Clinical Infectious Diseases",
    "Viruses",
];
const TOPICS: &[&str] = &[
    "SARS-CoV-2 transmission",
    "vaccine efficacy",
    "ACE2 receptor binding",
    "hospital outcomes",
    "antiviral treatment",
    "mask usage",
    "viral genome sequencing",
    "public health response",
];
const SURNAMES: &[&str] = &[
    "Smith", "Wang", "Garcia", "Müller", "Kim", "Rossi", "Silva", "Ivanova", "Nguyen", "Okafor",
];

fn generate_row(rng: &mut StdRng, id: usize) -> Row {
    let topic = *TOPICS.choose(rng).unwrap_or(&"coronavirus");
    let title = format!("{} in cohort {id}", capitalize(topic));

    let authors = (!rng.gen_bool(0.03)).then(|| {
        let n = rng.gen_range(1..=12);
        (0..n)
            .map(|_| {
                let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
                let initial = (b'A' + rng.gen_range(0..26)) as char;
                format!("{surname}, {initial}.")
            })
            .collect::<Vec<_>>()
            .join("; ")
    });

    let journal =
        (!rng.gen_bool(0.08)).then(|| JOURNALS[rng.gen_range(0..JOURNALS.len())].to_string());

    // Weighted toward 2020-2021; a few malformed or missing dates.
    let publish_time = match rng.gen_range(0..100) {
        0..=1 => None,
        2 => Some("unknown".to_string()),
        3..=5 => Some(format!("{}", rng.gen_range(2015..2020))),
        _ => {
            let year = if rng.gen_bool(0.7) {
                2020
            } else {
                rng.gen_range(2019..=2022)
            };
            Some(format!("{year}-{:02}-{:02}", rng.gen_range(1..=12), rng.gen_range(1..=28)))
        }
    };

    let abstract_text = (!rng.gen_bool(0.15)).then(|| {
        let sentences = rng.gen_range(2..8);
        (0..sentences)
            .map(|_| {
                let topic = TOPICS[rng.gen_range(0..TOPICS.len())];
                let patients = rng.gen_range(10..5000);
                format!("We study {topic} across {patients} patients.")
            })
            .collect::<Vec<_>>()
            .join(" ")
    });

    let doi =
        (!rng.gen_bool(0.1)).then(|| format!("10.{}/cord.{id:06}", rng.gen_range(1000..9999)));

    Row {
        title,
        authors,
        journal,
        source_x: SOURCES[rng.gen_range(0..SOURCES.len())].to_string(),
        publish_time,
        abstract_text,
        doi,
        has_full_text: rng.gen_bool(0.4),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    fn text(rows: &[Row], f: impl Fn(&Row) -> Option<&str>) -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("authors", DataType::Utf8, true),
        Field::new("journal", DataType::Utf8, true),
        Field::new("source_x", DataType::Utf8, false),
        Field::new("publish_time", DataType::Utf8, true),
        Field::new("abstract", DataType::Utf8, true),
        Field::new("doi", DataType::Utf8, true),
        Field::new("has_full_text", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(rows, |r| Some(r.title.as_str())),
            text(rows, |r| r.authors.as_deref()),
            text(rows, |r| r.journal.as_deref()),
            text(rows, |r| Some(r.source_x.as_str())),
            text(rows, |r| r.publish_time.as_deref()),
            text(rows, |r| r.abstract_text.as_deref()),
            text(rows, |r| r.doi.as_deref()),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.has_full_text).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let rows: Vec<Row> = (0..args.rows).map(|id| generate_row(&mut rng, id)).collect();

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!("Wrote {} papers to {}", rows.len(), args.output.display());
    println!("Wrote {} papers to {}", rows.len(), args.output.display());
    Ok(())
}
