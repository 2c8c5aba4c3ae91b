//! Resource Metadata Description CLI
//!
//! Command-line tool for describing a stored resource as DataCite XML/JSON,
//! JSON-LD, or Turtle.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use metadata_describe::{
    datacite, gather_description_set, render_jsonld_string, render_turtle, DateGranularity,
    MemoryStore, MetadataError, VocabRegistry, WalkOptions,
};

#[derive(Parser)]
#[command(name = "metadata-describe")]
#[command(about = "Describe a stored resource as DataCite XML/JSON, JSON-LD, or Turtle")]
#[command(version)]
struct Cli {
    /// Path to the resource store (JSON document)
    store: PathBuf,

    /// Guid (or same-domain IRI) of the resource to describe
    guid: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::DataciteXml)]
    format: Format,

    /// Maximum number of resources to visit during the walk
    #[arg(long, default_value_t = 64)]
    max_visits: usize,

    /// Abort the walk after this many milliseconds and emit a partial record
    #[arg(long, value_name = "MILLIS")]
    walk_timeout: Option<u64>,

    /// Keep full datetime precision instead of truncating dates to days
    #[arg(long)]
    datetime: bool,

    /// Explicit DOI for the DataCite identifier element
    #[arg(long)]
    doi: Option<String>,

    /// Base domain for guid-derived IRIs
    #[arg(long)]
    domain: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    DataciteXml,
    DataciteJson,
    Jsonld,
    Turtle,
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), MetadataError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Wrote metadata record to {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), MetadataError> {
    let content = fs::read_to_string(&cli.store)?;
    let store = MemoryStore::from_json_str(&content)?;
    let vocab = match cli.domain {
        Some(domain) => VocabRegistry::with_domain(domain)?,
        None => VocabRegistry::default(),
    };
    let options = WalkOptions {
        max_visits: cli.max_visits,
        date_granularity: if cli.datetime {
            DateGranularity::DateTime
        } else {
            DateGranularity::Day
        },
        deadline: cli
            .walk_timeout
            .map(|millis| Instant::now() + Duration::from_millis(millis)),
    };

    let description = gather_description_set(&store, &vocab, &cli.guid, &options)?;
    if !description.complete {
        warn!(
            guid = %cli.guid,
            visited = description.visited.len(),
            "walk hit its deadline; output describes a partial graph"
        );
    }

    let rendered = match cli.format {
        Format::DataciteXml => datacite::serialize_xml(&description, cli.doi.as_deref())?,
        Format::DataciteJson => datacite::serialize_json(&description, cli.doi.as_deref())?,
        Format::Jsonld => render_jsonld_string(&description.basket, &vocab)?,
        Format::Turtle => render_turtle(&description.basket, &vocab),
    };
    write_output(&rendered, cli.output.as_ref())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
