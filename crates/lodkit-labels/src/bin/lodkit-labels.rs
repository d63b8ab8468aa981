//! lodkit-labels: add missing labels to an RDF document.
//!
//! Reads a document (file or stdin), queries a SPARQL endpoint for labels of
//! every unlabeled IRI and writes the result to stdout as N-Quads.

use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use oxrdfio::{RdfFormat, RdfSerializer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodkit_labels::{parse_body, LabelConfig, LabelLoader};
use lodkit_sparql::{SparqlClient, SparqlConfig};

#[derive(Parser, Debug)]
#[command(name = "lodkit-labels")]
#[command(author, version, about = "Fetch missing labels for an RDF document from a SPARQL endpoint")]
struct Cli {
    /// SPARQL query endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Input document (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Input syntax as a media type or file extension (default: from the
    /// input extension, else Turtle)
    #[arg(short, long)]
    format: Option<String>,

    /// Only label IRIs in this namespace (can specify multiple)
    #[arg(short, long)]
    namespace: Vec<String>,

    /// Terms per label query
    #[arg(long)]
    chunk_size: Option<i64>,

    /// Concurrent label queries
    #[arg(long)]
    concurrency: Option<i64>,

    /// Per-query timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<i64>,

    /// TOML file with [sparql] and [labels] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print only the fetched labels instead of the enriched document
    #[arg(long)]
    labels_only: bool,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_format(explicit: Option<&str>, input: Option<&Path>) -> anyhow::Result<RdfFormat> {
    if let Some(name) = explicit {
        return RdfFormat::from_media_type(name)
            .or_else(|| RdfFormat::from_extension(name))
            .with_context(|| format!("Unknown RDF format '{}'", name));
    }

    let from_extension = input
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .and_then(RdfFormat::from_extension);
    Ok(from_extension.unwrap_or(RdfFormat::Turtle))
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Settings precedence: command-line flags, then the config file when given,
/// otherwise the environment, then built-in defaults.
fn load_configs(cli: &Cli) -> anyhow::Result<(SparqlConfig, LabelConfig)> {
    let (mut sparql, mut labels) = match &cli.config {
        Some(path) => (
            SparqlConfig::from_file(path)?,
            LabelConfig::from_file(path)?,
        ),
        None => (SparqlConfig::from_env(), LabelConfig::from_env()),
    };

    if let Some(endpoint) = &cli.endpoint {
        sparql = sparql.with_endpoint(endpoint.clone());
    }
    if !cli.namespace.is_empty() {
        labels.label_namespace = None;
        labels.label_namespaces = cli.namespace.clone();
    }
    if let Some(chunk_size) = cli.chunk_size {
        labels = labels.with_chunk_size(chunk_size);
    }
    if let Some(concurrency) = cli.concurrency {
        labels = labels.with_concurrency(concurrency);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        labels = labels.with_timeout_ms(timeout_ms);
    }

    Ok((sparql, labels))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let (sparql_config, label_config) = load_configs(&cli)?;

    let format = resolve_format(cli.format.as_deref(), cli.input.as_deref())?;
    let input = read_input(cli.input.as_deref())?;
    if input.is_empty() {
        bail!("Input document is empty");
    }
    let graph = parse_body(format, &input).context("Failed to parse input document")?;
    info!(
        quad_count = graph.len(),
        format = format.media_type(),
        "Loaded input document"
    );

    let loader = LabelLoader::builder()
        .with_config(label_config)
        .with_executor(SparqlClient::new(sparql_config)?)
        .build()?;

    let output = if cli.labels_only {
        loader.load_labels(&graph).await.dataset
    } else {
        loader.enrich(&graph).await
    };

    let stdout = std::io::stdout();
    let mut serializer =
        RdfSerializer::from_format(RdfFormat::NQuads).for_writer(BufWriter::new(stdout.lock()));
    for quad in output.iter() {
        serializer.serialize_quad(quad)?;
    }
    serializer.finish()?.flush()?;

    info!(quad_count = output.len(), "Wrote output");
    Ok(())
}
