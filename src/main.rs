//! CLI entry point for the VANET route advisor.
//!
//! Provides subcommands for synthesizing simulation scenarios, running
//! the prediction pipeline over a snapshot, summarizing a simulation run,
//! and listing the available scenario options.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use vanet_advisor::generate::OllamaClient;
use vanet_advisor::output::{to_json_pretty, write_json, write_text};
use vanet_advisor::pipeline::{Advisory, run_pipeline};
use vanet_advisor::scenario::{
    density_options, generate_scenario, mix_options, pattern_options,
};
use vanet_advisor::selector::Objective;
use vanet_advisor::snapshot::{load_steps, summarize};

#[derive(Parser)]
#[command(name = "vanet_advisor")]
#[command(about = "Traffic route prediction from simulation telemetry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a vehicle schedule document from scenario parameters
    Scenario {
        /// Traffic density tier: low | medium | high | rush_hour
        #[arg(short, long, default_value = "medium")]
        density: String,

        /// Vehicle mix tier: cars_only | mixed | heavy_commercial
        #[arg(short = 'm', long, default_value = "mixed")]
        vehicle_mix: String,

        /// Arrival pattern: uniform | rush_hour | random
        #[arg(short, long, default_value = "uniform")]
        pattern: String,

        /// Random seed for reproducibility
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// File to write the schedule document to
        #[arg(short, long, default_value = "scenario.rou.xml")]
        output: String,
    },
    /// Run the prediction pipeline over a snapshot file
    Predict {
        /// Path to a snapshot JSON file (one step or an array of steps)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: String,

        /// Vehicle type the advice is for
        #[arg(short, long, default_value = "car")]
        vehicle_type: String,

        /// Objective: fast (minimize travel time) or safe (minimize load)
        #[arg(short = 'O', long, default_value = "fast")]
        objective: String,

        /// Ollama chat endpoint (falls back to OLLAMA_URL)
        #[arg(long)]
        url: Option<String>,

        /// Model name (falls back to MODEL_NAME)
        #[arg(long)]
        model: Option<String>,

        /// Optional file to write the advisory JSON to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Summarize a simulation run from a steps file
    Summary {
        /// Path to a snapshot JSON file (array of steps)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: String,
    },
    /// List available scenario options
    Options,
}

/// Advisory plus request context, as emitted on stdout.
#[derive(Serialize)]
struct AdvisoryEnvelope {
    generated_at: chrono::DateTime<Utc>,
    vehicle_type: String,
    objective: String,
    #[serde(flatten)]
    advisory: Advisory,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/vanet_advisor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vanet_advisor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenario {
            density,
            vehicle_mix,
            pattern,
            seed,
            output,
        } => {
            let (document, duration) = generate_scenario(&density, &vehicle_mix, &pattern, seed)?;
            write_text(&output, &document)?;
            info!(
                density,
                vehicle_mix,
                pattern,
                seed,
                duration,
                output,
                "Scenario written"
            );
        }
        Commands::Predict {
            snapshot,
            vehicle_type,
            objective,
            url,
            model,
            output,
        } => {
            let steps = load_steps(&snapshot)?;
            let Some(step) = steps.last() else {
                anyhow::bail!("snapshot file {} contains no steps", snapshot);
            };

            let url = url
                .or_else(|| std::env::var("OLLAMA_URL").ok())
                .unwrap_or_else(|| vanet_advisor::generate::DEFAULT_URL.to_string());
            let model = model
                .or_else(|| std::env::var("MODEL_NAME").ok())
                .unwrap_or_else(|| vanet_advisor::generate::DEFAULT_MODEL.to_string());

            let objective = Objective::from_param(&objective);
            let client = OllamaClient::new(url, model)?;

            let advisory = run_pipeline(&client, step, &vehicle_type, objective).await;

            let envelope = AdvisoryEnvelope {
                generated_at: Utc::now(),
                vehicle_type,
                objective: objective.to_string(),
                advisory,
            };

            println!("{}", to_json_pretty(&envelope)?);
            if let Some(path) = output {
                write_json(&path, &envelope)?;
            }
        }
        Commands::Summary { snapshot } => {
            let steps = load_steps(&snapshot)?;
            let summary = summarize(&steps);
            println!("{}", to_json_pretty(&summary)?);
        }
        Commands::Options => {
            let options = serde_json::json!({
                "density": density_options(),
                "vehicle_mix": mix_options(),
                "pattern": pattern_options(),
            });
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
    }

    Ok(())
}
