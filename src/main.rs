// Command-line harness for the medical data sources.
//
// Runs one acquisition operation and prints the records as JSON on stdout.
// Logs go to stderr; set RUST_LOG to adjust verbosity.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use medical_sources::{Config, DrugSearchField, MedicalSources, load_yaml_config};

#[derive(Parser, Debug)]
#[command(name = "medical-sources", version, about = "Query medical data sources and print JSON")]
struct Cli {
    /// YAML config file (defaults to MEDICAL_SOURCES_CONFIG or config.yaml)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// openFDA drug labels
    Labels {
        query: String,
        #[arg(long, value_enum)]
        field: Option<DrugSearchField>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// openFDA drug label by product NDC
    Ndc { ndc: String },
    /// openFDA adverse-event reports for a drug
    Events {
        drug: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// PubMed articles
    Articles {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// PubMed clinical guidelines
    Guidelines {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// WHO health indicator data points
    Indicators {
        indicator: String,
        /// ISO 3166 alpha-3 country code
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// RxNorm concepts for a drug name
    Rxnorm { query: String },
    /// Google Scholar results (launches a headless browser)
    Scholar {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => load_yaml_config(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let sources = MedicalSources::new(&config).context("Failed to build HTTP clients")?;

    match cli.command {
        Command::Labels { query, field, limit } => {
            let labels = sources.search_drug_labels(&query, field, limit).await?;
            print_json(&labels)
        }
        Command::Ndc { ndc } => print_json(&sources.get_drug_by_ndc(&ndc).await),
        Command::Events { drug, limit } => {
            print_json(&sources.search_adverse_events(&drug, limit).await)
        }
        Command::Articles { query, limit } => print_json(&sources.search_articles(&query, limit).await),
        Command::Guidelines { query, limit } => {
            print_json(&sources.search_clinical_guidelines(&query, limit).await)
        }
        Command::Indicators { indicator, country, limit } => print_json(
            &sources
                .search_health_indicators(&indicator, country.as_deref(), limit)
                .await,
        ),
        Command::Rxnorm { query } => print_json(&sources.search_drug_nomenclature(&query).await),
        Command::Scholar { query, limit } => print_json(&sources.search_scholar(&query, limit).await),
    }
}
