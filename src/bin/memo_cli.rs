//! Deal memo CLI
//!
//! Drives an analysis session end to end from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a deal file
//! memo_cli analyze --file deal.txt
//!
//! # Analyze text from stdin
//! cat deal.txt | memo_cli analyze
//!
//! # Analyze the bundled sample deal
//! memo_cli analyze --sample
//!
//! # Print or save the sample deal text
//! memo_cli sample
//! memo_cli sample --output sample-data.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use genovate::ai::{AiConfig, AnalysisClient, GeminiClient};
use genovate::context::InMemoryDealStore;
use genovate::samples;
use genovate::session::AnalysisSession;

/// Messages rotated while a request is in flight.
const PROGRESS_MESSAGES: &[&str] = &[
    "Contacting satellite network for property data...",
    "Analyzing market trends and comparable sales...",
    "Cross-referencing demographic shifts...",
    "Assessing regulatory and environmental risks...",
    "Calculating preliminary valuation models...",
    "Compiling executive summary...",
    "Finalizing the deal memo...",
];

#[derive(Parser)]
#[command(name = "memo_cli")]
#[command(version = "0.1.0")]
#[command(about = "Generate AI-powered commercial real estate deal memos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze deal text and print the generated memo
    Analyze {
        /// Input file (reads stdin if not provided)
        #[arg(short, long, conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Use the bundled sample deal text
        #[arg(long)]
        sample: bool,
    },

    /// Print the bundled sample deal text
    Sample {
        /// Write the sample to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { file, sample } => {
            let input = read_input(file, sample)?;
            run_analysis(&input).await
        }
        Commands::Sample { output } => {
            match output {
                Some(path) => {
                    std::fs::write(&path, samples::sample_deal_text())
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("{} {}", "Sample written to".green(), path.display());
                }
                None => print!("{}", samples::sample_deal_text()),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(file: Option<PathBuf>, sample: bool) -> Result<String> {
    if sample {
        return Ok(samples::sample_deal_text().to_string());
    }
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

async fn run_analysis(input: &str) -> Result<ExitCode> {
    let store = Arc::new(InMemoryDealStore::with_sample_data());
    let client = GeminiClient::new(AiConfig::from_env(), store)
        .context("failed to construct Gemini client")?;
    let session = Arc::new(AnalysisSession::new(
        Arc::new(client) as Arc<dyn AnalysisClient>
    ));

    // Rotate through progress messages while the request is in flight.
    let progress = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(2500));
        for message in PROGRESS_MESSAGES.iter().cycle() {
            ticker.tick().await;
            eprintln!("{}", message.cyan());
        }
    });

    session.submit(input).await;
    progress.abort();

    let snapshot = session.snapshot();
    if let Some(memo) = snapshot.result {
        println!("{memo}");
        Ok(ExitCode::SUCCESS)
    } else {
        let message = snapshot
            .error
            .unwrap_or_else(|| "An unexpected error occurred.".to_string());
        eprintln!("{} {}", "Analysis failed:".red().bold(), message);
        Ok(ExitCode::FAILURE)
    }
}
