//! Command-line surface for islandora-export.
//!
//! Argument parsing and wiring only; every algorithm lives in
//! `islandora-export-core`. [`run`] is the entrypoint for both `main` and
//! the integration tests.
use crate::load_config::{load_config, CliConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use islandora_export_core::aggregate::aggregate;
use islandora_export_core::config::{CrossrefSettings, DepositKind};
use islandora_export_core::contract::Fetcher;
use islandora_export_core::crossref::{project, render::to_xml};
use islandora_export_core::entity::Entity;
use islandora_export_core::fetch::HttpFetcher;
use islandora_export_core::traverse::traverse;
use islandora_export_core::warm::{fetch_url_list, warm_urls};
use islandora_export_core::workbench::entities_from_csv;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Export Islandora metadata as merged workbench CSV or Crossref XML.
#[derive(Parser, Debug)]
#[clap(name = "islandora-export", version)]
pub struct Cli {
    /// Optional YAML settings file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export from a live repository
    Export {
        #[clap(subcommand)]
        format: ExportFormat,
    },
    /// Transform a local export into another format
    Transform {
        #[clap(subcommand)]
        source: TransformSource,
    },
    /// Request every URL listed by an endpoint so an image server caches it
    CacheWarm {
        /// Endpoint returning a JSON array of {"url": ...}
        #[clap(long)]
        endpoint: String,
        #[clap(long, default_value_t = 2)]
        workers: usize,
        /// Per-URL timeout
        #[clap(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExportFormat {
    /// Recursively merge the workbench CSV of a node and its containers
    Csv {
        #[clap(long)]
        base_url: String,
        #[clap(long)]
        nid: i64,
        #[clap(long, default_value = "merged.csv")]
        output: PathBuf,
    },
    /// Walk a journal's node tree and write a Crossref deposit
    Crossref {
        #[clap(long)]
        base_url: String,
        #[clap(long)]
        nid: i64,
        #[clap(long)]
        target: PathBuf,
        #[clap(flatten)]
        crossref: CrossrefArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransformSource {
    /// From a workbench CSV
    Csv {
        #[clap(subcommand)]
        format: CsvTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum CsvTarget {
    /// Project a merged workbench CSV onto a Crossref deposit
    Crossref {
        #[clap(long)]
        source: PathBuf,
        #[clap(long)]
        target: PathBuf,
        /// Repository root, used for resource URLs and agent term lookups
        #[clap(long)]
        base_url: String,
        /// Node id of the journal; defaults to the first row
        #[clap(long)]
        nid: Option<i64>,
        #[clap(flatten)]
        crossref: CrossrefArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CrossrefArgs {
    #[clap(long = "type", value_enum, default_value_t = DepositType::JournalIssue)]
    pub deposit_type: DepositType,
    #[clap(long)]
    pub registrant: Option<String>,
    #[clap(long)]
    pub depositor_name: Option<String>,
    #[clap(long)]
    pub depositor_email: Option<String>,
    #[clap(long)]
    pub journal_doi: Option<String>,
    #[clap(long)]
    pub journal_url: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepositType {
    JournalVolume,
    #[default]
    JournalIssue,
}

impl From<DepositType> for DepositKind {
    fn from(t: DepositType) -> Self {
        match t {
            DepositType::JournalVolume => DepositKind::JournalVolume,
            DepositType::JournalIssue => DepositKind::JournalIssue,
        }
    }
}

impl CrossrefArgs {
    /// Flags win over the settings file.
    pub fn settings(&self, file: &CliConfig) -> CrossrefSettings {
        let pick = |flag: &Option<String>, fallback: &Option<String>| {
            flag.clone().or_else(|| fallback.clone())
        };
        let section = &file.crossref;
        CrossrefSettings {
            registrant: pick(&self.registrant, &section.registrant).unwrap_or_default(),
            depositor_name: pick(&self.depositor_name, &section.depositor_name).unwrap_or_default(),
            depositor_email: pick(&self.depositor_email, &section.depositor_email)
                .unwrap_or_default(),
            journal_doi: pick(&self.journal_doi, &section.journal_doi),
            journal_url: pick(&self.journal_url, &section.journal_url),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Export { format } => match format {
            ExportFormat::Csv {
                base_url,
                nid,
                output,
            } => {
                tracing::info!(command = "export csv", base_url = %base_url, nid, "Starting CSV export");
                let fetcher = http_fetcher(&file);
                let table = aggregate(&fetcher, &base_url, nid)
                    .await
                    .with_context(|| format!("Failed to export CSV for node {nid}"))?;
                let out = std::fs::File::create(&output)
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                table
                    .write_csv(out)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("CSV files merged successfully into {}", output.display());
                Ok(())
            }
            ExportFormat::Crossref {
                base_url,
                nid,
                target,
                crossref,
            } => {
                tracing::info!(command = "export crossref", base_url = %base_url, nid, "Starting Crossref export");
                let fetcher = http_fetcher(&file);
                let nodes = traverse(&fetcher, &base_url, nid)
                    .await
                    .with_context(|| format!("Failed to fetch node tree under {nid}"))?;
                write_crossref(&fetcher, &nodes, nid, &base_url, &crossref, &file, &target).await
            }
        },
        Commands::Transform {
            source: TransformSource::Csv {
                format:
                    CsvTarget::Crossref {
                        source,
                        target,
                        base_url,
                        nid,
                        crossref,
                    },
            },
        } => {
            tracing::info!(command = "transform csv crossref", source = %source.display(), "Starting CSV to Crossref transform");
            let input = std::fs::File::open(&source)
                .with_context(|| format!("Could not open the CSV file {}", source.display()))?;
            let nodes = entities_from_csv(input)
                .with_context(|| format!("Could not read the CSV file {}", source.display()))?;
            let root = nid
                .or_else(|| nodes.first().map(|n| n.nid))
                .context("CSV file contains no rows with a node_id")?;
            let fetcher = http_fetcher(&file);
            write_crossref(&fetcher, &nodes, root, &base_url, &crossref, &file, &target).await
        }
        Commands::CacheWarm {
            endpoint,
            workers,
            timeout_secs,
        } => {
            tracing::info!(command = "cache-warm", endpoint = %endpoint, workers, "Starting cache warm");
            let client = reqwest::Client::new();
            let urls = fetch_url_list(&client, &endpoint)
                .await
                .with_context(|| format!("Error fetching URLs from {endpoint}"))?;
            let report = warm_urls(&client, urls, workers, Duration::from_secs(timeout_secs)).await;
            println!(
                "Warmed {} of {} URLs ({} failed)",
                report.succeeded, report.attempted, report.failed
            );
            Ok(())
        }
    }
}

fn http_fetcher(file: &CliConfig) -> HttpFetcher {
    let config = file.fetch_config();
    config.trace_loaded();
    HttpFetcher::new(&config)
}

async fn write_crossref<F: Fetcher>(
    fetcher: &F,
    nodes: &[Entity],
    root: i64,
    base_url: &str,
    args: &CrossrefArgs,
    file: &CliConfig,
    target: &Path,
) -> Result<()> {
    let settings = args.settings(file);
    settings.trace_loaded();
    let doc = project(fetcher, nodes, root, base_url, &settings)
        .await
        .with_context(|| format!("Failed to build Crossref document for node {root}"))?;
    let xml = to_xml(&doc, args.deposit_type.into()).context("Failed to render Crossref XML")?;
    std::fs::write(target, xml)
        .with_context(|| format!("Error writing output file {}", target.display()))?;
    tracing::info!(
        file = %target.display(),
        volumes = doc.volumes.len(),
        direct_articles = doc.articles.len(),
        "Crossref journal written"
    );
    println!("Crossref journal written to {}", target.display());
    Ok(())
}
