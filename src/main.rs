use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, warn};

use elig_normalizer::config::PartnerConfigStore;
use elig_normalizer::logging;
use elig_normalizer::pipeline::EligibilityPipeline;
use elig_normalizer::reader::LocalFileReader;
use elig_normalizer::sink::{CsvFileSink, OutputSink};

#[derive(Parser)]
#[command(name = "elig_normalizer")]
#[command(about = "Canonicalizes partner eligibility files into one unified dataset")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full normalization pipeline
    Run {
        /// Path to the partner configuration document (JSON)
        #[arg(long)]
        config: String,
        /// Path for the unified output CSV
        #[arg(long, default_value = "output/eligibility_standardized.csv")]
        output: String,
        /// Specific partners to process (comma-separated); default is all configured partners
        #[arg(long)]
        partners: Option<String>,
    },
    /// Parse and validate the configuration document without processing any data
    ValidateConfig {
        /// Path to the partner configuration document (JSON)
        #[arg(long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            output,
            partners,
        } => run_pipeline(&config, &output, partners).await,
        Commands::ValidateConfig { config } => validate_config(&config).await,
    }
}

async fn run_pipeline(
    config_path: &str,
    output_path: &str,
    partners: Option<String>,
) -> anyhow::Result<()> {
    let document = tokio::fs::read_to_string(config_path).await?;
    let mut store = PartnerConfigStore::from_json(&document)?;

    if let Some(list) = partners {
        let names: Vec<String> = list.split(',').map(|s| s.trim().to_string()).collect();
        for name in &names {
            if store.get(name).is_none() {
                warn!(partner = %name, "Requested partner is not configured");
                println!("⚠️  Unknown partner: {name}");
            }
        }
        store.retain(&names);
    }
    if store.is_empty() {
        anyhow::bail!("no partners selected");
    }

    println!("🔄 Running eligibility pipeline for {} partners...", store.len());
    let pipeline = EligibilityPipeline::new(store, Arc::new(LocalFileReader));
    match pipeline.run().await {
        Ok((dataset, result)) => {
            println!("\n📊 Pipeline Results:");
            for count in &result.partner_counts {
                println!("   {} ({}): {} rows", count.partner, count.partner_code, count.rows);
            }
            println!("   Dropped (no external id): {}", result.dropped_rows);
            println!("   Total rows: {}", result.total_rows);

            CsvFileSink::new(output_path).write(&dataset).await?;
            println!("   Output file: {output_path}");
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            anyhow::bail!("pipeline failed: {e}")
        }
    }
}

async fn validate_config(config_path: &str) -> anyhow::Result<()> {
    let document = tokio::fs::read_to_string(config_path).await?;
    match PartnerConfigStore::from_json(&document) {
        Ok(store) => {
            println!("✅ Configuration is valid ({} partners):", store.len());
            for (name, cfg) in store.partners() {
                println!(
                    "   {} -> code {}, delimiter '{}', {} column mappings",
                    name,
                    cfg.partner_code,
                    cfg.delimiter as char,
                    cfg.mappings.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Configuration invalid: {}", e);
            anyhow::bail!("configuration invalid: {e}")
        }
    }
}
