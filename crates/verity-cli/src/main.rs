//! `verity` command line: check a claim, or print the effective configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use verity_core::CheckReport;
use verity_runtime::{FactChecker, RuntimeConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file; defaults apply when omitted
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a claim against web evidence
    Check {
        /// The claim to check
        claim: String,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Skip generated reasoning
        #[arg(long)]
        no_reasoning: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Check {
            claim,
            json,
            no_reasoning,
        } => {
            if claim.trim().is_empty() {
                anyhow::bail!("claim must not be empty");
            }
            if no_reasoning {
                config.reasoning.enabled = false;
            }

            let checker = FactChecker::from_env(config).context("failed to build fact checker")?;
            let report = checker.check(&claim).await;
            tracing::debug!(
                search_cache = checker.search_cache_stats().size,
                article_cache = checker.article_cache_stats().size,
                "Cache sizes after check"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

fn print_report(report: &CheckReport) {
    println!("Claim:    {}", report.claim);
    println!("Verdict:  {}", report.verdict);
    println!("Reason:   {}", report.reason);
    println!(
        "Articles: {} ({:.1}s)",
        report.articles_processed, report.processing_time_seconds
    );

    if !report.evidence.is_empty() {
        println!("\nEvidence:");
        for (i, item) in report.evidence.iter().enumerate() {
            println!(
                "{:>3}. [E {:.2} / C {:.2}] {} ({})",
                i + 1,
                item.entailment,
                item.contradiction,
                item.sentence,
                item.source.domain
            );
        }
    }

    if let Some(advisory) = &report.advisory {
        println!("\nAdvisory: {} ({})", advisory.label, advisory.reason);
    }

    println!("\n{}", report.rationale);

    if !report.absorbed_failures.is_empty() {
        println!("\nDegraded:");
        for failure in &report.absorbed_failures {
            println!("  - {}", failure);
        }
    }
}
