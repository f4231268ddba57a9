//! Command-line front end for the nutrition analysis backend.
//!
//! Configuration comes from the environment (NUTRITION_API_URL, POLL_MAX_ATTEMPTS,
//! POLL_INTERVAL_MS, REQUEST_TIMEOUT_SECS); `--api-url` overrides the base URL.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use nutrition_analysis_client::config::AppConfig;
use nutrition_analysis_client::models::nutrition::NutritionAnalysisResult;
use nutrition_analysis_client::services::workflow::describe_metrics;
use nutrition_analysis_client::{AnalysisError, AnalysisOutcome, NutritionApiClient};

#[derive(Parser)]
#[command(name = "nutrition-analysis", about = "Nutrition analysis backend CLI")]
struct Cli {
    /// Backend base URL (overrides NUTRITION_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print result documents as JSON and log in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend health
    Health,
    /// Upload a meal video and wait for the analysis
    AnalyzeVideo {
        /// Path to the video file
        file: PathBuf,
        /// Filename to register with the backend (defaults to the file's name)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Upload a meal photo and wait for the analysis
    AnalyzeImage {
        /// Path to the image file (.png is sent as image/png, anything else as image/jpeg)
        file: PathBuf,
        /// Filename to register with the backend (defaults to the file's name)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Show the current status of a job
    Status {
        /// Job ID
        job_id: String,
    },
    /// Fetch and normalize the results of a completed job
    Results {
        /// Job ID
        job_id: String,
        /// Skip the detailed results (no segmented images)
        #[arg(long)]
        simple: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn display_name(file: &Path, filename: Option<String>) -> anyhow::Result<String> {
    match filename {
        Some(name) => Ok(name),
        None => file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context("Media path has no file name; pass --filename"),
    }
}

fn print_result(result: &NutritionAnalysisResult) {
    println!("Job {} ({})", result.job_id, result.status);
    for (index, item) in result.items.iter().enumerate() {
        print!(
            "  {}. {} - {:.0} kcal - {:.0} g",
            index + 1,
            item.food_name,
            item.total_calories,
            item.mass_g
        );
        match item.volume_ml {
            Some(volume) => println!(" - {:.0} ml", volume),
            None => println!(),
        }
    }
    if let Some(summary) = &result.nutrition_summary {
        println!("Meal summary:");
        println!("  Total calories: {:.1} kcal", summary.total_calories_kcal);
        println!("  Total mass:     {:.1} g", summary.total_mass_g);
        println!("  Total volume:   {:.1} ml", summary.total_food_volume_ml);
        println!("  Food items:     {}", summary.num_food_items);
    }
}

fn report(outcome: &AnalysisOutcome, json: bool) -> anyhow::Result<()> {
    match outcome.result() {
        Some(result) if json => print_json(result)?,
        Some(result) => {
            println!("{}", outcome.headline());
            print_result(result);
        }
        None => {
            if let AnalysisOutcome::Failed(e) = outcome {
                println!("{}: {}", outcome.headline(), e);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);
    describe_metrics();

    let mut config = AppConfig::from_env().context("Failed to load configuration from environment")?;
    if let Some(url) = cli.api_url {
        config.nutrition_api_url = url;
    }

    let client = NutritionApiClient::from_config(&config).context("Failed to create API client")?;
    tracing::info!(base_url = %client.base_url(), "Using nutrition analysis backend");

    let progress = |message: &str| eprintln!("{}", message);

    match cli.command {
        Commands::Health => {
            let healthy = client.check_health().await;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                std::process::exit(1);
            }
        }
        Commands::AnalyzeVideo { file, filename } => {
            let filename = display_name(&file, filename)?;
            let outcome = AnalysisOutcome::from(
                client.analyze_video(&file, &filename, Some(&progress)).await,
            );
            report(&outcome, cli.json)?;
            if matches!(outcome, AnalysisOutcome::Failed(_)) {
                std::process::exit(1);
            }
        }
        Commands::AnalyzeImage { file, filename } => {
            let filename = display_name(&file, filename)?;
            let outcome = AnalysisOutcome::from(
                client.analyze_image(&file, &filename, Some(&progress)).await,
            );
            report(&outcome, cli.json)?;
            if matches!(outcome, AnalysisOutcome::Failed(_)) {
                std::process::exit(1);
            }
        }
        Commands::Status { job_id } => {
            let status = client
                .check_status(&job_id)
                .await
                .with_context(|| format!("Could not fetch status for job {}", job_id))?;
            if cli.json {
                print_json(&status)?;
            } else {
                println!("Job {}: {}", status.job_id, status.status);
                if let Some(progress) = status.progress {
                    println!("  Progress:  {:.0}%", progress);
                }
                if let Some(completed) = status.completed_at() {
                    println!("  Completed: {}", completed.to_rfc3339());
                }
                if let Some(error) = &status.error {
                    println!("  Error:     {}", error);
                }
            }
        }
        Commands::Results { job_id, simple } => {
            let result = client
                .get_results(&job_id, !simple)
                .await
                .with_context(|| format!("Could not fetch results for job {}", job_id))?;
            report(&AnalysisOutcome::from(Ok::<_, AnalysisError>(result)), cli.json)?;
        }
    }

    Ok(())
}
