//! stresscast command-line interface
//!
//! Three modes: serve the prediction API, score records from a file or
//! stdin, or inspect a trained artifact bundle.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stresscast::config::StressConfig;
use stresscast::features::RawRecord;
use stresscast::server::{run_server, ServerConfig};
use stresscast::service::InferenceService;
use stresscast::ModelArtifact;

#[derive(Parser)]
#[command(name = "stresscast")]
#[command(version, about = "Fuzzy + ensemble stress level prediction")]
struct Cli {
    /// Path to a TOML config file (overrides the search path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the model artifact (overrides the config)
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the prediction HTTP server
    Serve {
        /// Port to listen on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Score records from a JSON file ("-" for stdin)
    Predict {
        /// Input: one record object or an array of records
        input: PathBuf,
    },

    /// Print a summary of a trained artifact bundle
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StressConfig::from_file(path)?,
        None => StressConfig::load()?,
    };
    if let Some(path) = &cli.artifact {
        config.model.artifact_path = path.display().to_string();
    }
    if cli.verbose {
        config.general.log_level = "verbose".to_string();
    } else if cli.quiet {
        config.general.log_level = "quiet".to_string();
    }

    match cli.command {
        Command::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            cmd_serve(&config)
        }
        Command::Predict { input } => cmd_predict(&config, &input),
        Command::Inspect => cmd_inspect(&config),
    }
}

fn load_service(config: &StressConfig) -> Result<InferenceService> {
    InferenceService::from_path(&config.model.artifact_path)
        .with_context(|| format!("Cannot load artifact '{}'", config.model.artifact_path))
}

fn cmd_serve(config: &StressConfig) -> Result<()> {
    // A bad artifact must kill the process before it starts listening
    let service = load_service(config)?;

    let server_config = ServerConfig::new(config.server.port)
        .with_host(config.server.host.clone())
        .with_cors(config.server.cors_enabled);

    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    runtime
        .block_on(run_server(service, server_config))
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

fn cmd_predict(config: &StressConfig, input: &PathBuf) -> Result<()> {
    let service = load_service(config)?;
    let verbose = config.general.log_level == "verbose";

    let data = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Cannot read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Cannot read '{}'", input.display()))?
    };

    // Accept a single object or an array of objects
    let records: Vec<RawRecord> = match serde_json::from_str::<serde_json::Value>(&data)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?,
        value => vec![serde_json::from_value(value)?],
    };

    let mut failures = 0;
    for (i, result) in service.predict_batch(&records).iter().enumerate() {
        match result {
            Ok(prediction) => {
                if verbose {
                    println!(
                        "record {}: {} (label id {})",
                        i, prediction.label, prediction.label_id
                    );
                } else {
                    println!("{}", prediction.label);
                }
            }
            Err(e) => {
                eprintln!("record {}: {}", i, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} records failed", failures, records.len());
    }
    Ok(())
}

fn cmd_inspect(config: &StressConfig) -> Result<()> {
    let artifact = ModelArtifact::load(&config.model.artifact_path)
        .with_context(|| format!("Cannot load artifact '{}'", config.model.artifact_path))?;
    let summary = artifact.summary();

    println!("Artifact: {}", config.model.artifact_path);
    println!("  format version: {}", summary.version);
    println!("  trained columns: {}", summary.column_count);
    println!("  trees: {}", summary.tree_count);
    println!("  classes: {}", summary.classes.join(", "));
    Ok(())
}
