use anyhow::{Context, Result};
use clap::Parser;
use diligence::clustering::Consolidator;
use diligence::finding::{ParkedArticle, RawFinding};
use diligence::llm::ConsolidatorConfig;
use diligence::logging::configure_logging;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Deduplicate adverse-media findings into cited incidents", long_about = None)]
struct Cli {
    /// JSON file holding { "subject", "findings", "parkedArticles" }
    input: PathBuf,

    /// Override the similarity threshold (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Override the threshold used when findings share a named entity (0.0-1.0)
    #[arg(short, long)]
    same_person_threshold: Option<f64>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsolidationInput {
    subject: String,
    #[serde(default)]
    findings: Vec<RawFinding>,
    #[serde(default)]
    parked_articles: Vec<ParkedArticle>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let input: ConsolidationInput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    let mut config = ConsolidatorConfig::from_env();
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(threshold) = cli.same_person_threshold {
        config.same_person_threshold = threshold;
    }

    let consolidator = Consolidator::from_config(&config);
    let consolidated = consolidator
        .consolidate_findings(&input.findings, &input.subject, &input.parked_articles)
        .await?;

    info!(
        "{} findings about {} consolidated into {} incident(s)",
        input.findings.len(),
        input.subject,
        consolidated.len()
    );

    let json = serde_json::to_string_pretty(&consolidated)?;
    match cli.output {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}
