//! fwmod CLI - firmware transformation from the command line.

use clap::{Parser, Subcommand};
use fwmod::{classify, Config, FwmodError, MemoryLedger, Orchestrator, PatchRequest};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "fwmod")]
#[command(about = "Firmware transformation with vendor-profiled signature rewriting")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a firmware image for a device serial number
    Patch {
        /// Path to the firmware image (.bin, .hex or .fw)
        #[arg(short, long)]
        input: PathBuf,

        /// Device serial number used for vendor profiling
        #[arg(short, long)]
        serial: String,

        /// Override the directory receiving the patched image
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Override the per-checkpoint delay in milliseconds
        #[arg(long)]
        step_delay_ms: Option<u64>,
    },

    /// Detect the vendor profile for a serial number
    Classify {
        /// Device serial number
        #[arg(short, long)]
        serial: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), FwmodError> {
    let cli = Cli::parse();

    // Classify needs no logging, config or tokio machinery beyond parsing.
    if let Commands::Classify { serial } = &cli.command {
        println!("{}", classify::classify(serial));
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(FwmodError::Config)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?.with_auto_tuning();
    if let Some(path) = &cli.config {
        info!("Loaded configuration from {:?}", path);
    }

    match cli.command {
        Commands::Classify { .. } => unreachable!(), // Handled above
        Commands::Patch { input, serial, output_dir, step_delay_ms } => {
            // Apply overrides
            if let Some(dir) = output_dir {
                config.engine.output_dir = dir;
            }
            if let Some(delay) = step_delay_ms {
                config.engine.step_delay_ms = delay;
            }

            let data = tokio::fs::read(&input).await?;
            let original_file_name = input
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("firmware.bin")
                .to_string();

            let orchestrator = Orchestrator::new(config, Arc::new(MemoryLedger::new()));
            let outcome = orchestrator
                .run_to_completion(PatchRequest {
                    original_file_name,
                    serial_number: serial,
                    data,
                })
                .await?;

            if cli.output_json {
                println!("{}", outcome.to_json()?);
            } else {
                println!("\nTransformation completed!");
                println!("  Job ID: {}", outcome.job_id);
                println!("  Vendor profile: {}", outcome.vendor);
                println!("  Input: {} bytes", outcome.input_bytes);
                println!("  Output: {} bytes", outcome.output_bytes);
                println!("  Artifact: {}", outcome.output_path.display());
                println!("  Duration: {:.2}s", outcome.duration_seconds);
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
