use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use depbrief::{
    brief::BriefGenerator,
    config::Config,
    logging::init_tracing,
    model::{ManifestKind, ScanOutcome},
    output::{format_result_to_string, print_result, OutputFormat},
    scan::ScanPipeline,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const REJECTED: u8 = 2;
    pub const RISK_ABOVE_THRESHOLD: u8 = 3;
}

#[derive(Parser)]
#[command(name = "depbrief")]
#[command(
    author,
    version,
    about = "Scan a dependency manifest against OSV.dev and summarize the risk"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a requirements.txt, pyproject.toml, or package-lock.json file
    Scan {
        /// Manifest to scan
        file: PathBuf,

        /// Ask the configured LLM for an executive brief
        #[arg(long)]
        brief: bool,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with code 3 if the risk score is above this value
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        fail_above: Option<u8>,
    },

    /// List supported manifest formats
    Formats,

    /// Show service status and the active LLM provider
    Health,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = Config::default();
            config.apply_env(|key| std::env::var(key).ok());
            (config, Some(e))
        }
    };

    init_tracing(&config.log_level)?;
    if let Some(e) = load_error {
        let reason = format!("{e:#}");
        warn!(error = %reason, "ignoring config file, using defaults");
    }

    match cli.command {
        Commands::Scan {
            file,
            brief,
            format,
            output,
            fail_above,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
            run_scan(&config, &file, brief, format, output, fail_above).await
        }
        Commands::Formats => {
            list_formats();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Health => {
            print_health(&config)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    file: &Path,
    with_brief: bool,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    fail_above: Option<u8>,
) -> Result<u8> {
    let is_interactive = format == OutputFormat::Table;

    let content =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let pipeline = ScanPipeline::from_config(config)?;

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Checking {} for vulnerabilities...", filename));
        Some(pb)
    } else {
        None
    };

    let outcome = if with_brief {
        let generator = BriefGenerator::from_config(&config.llm)?;
        if let Some(pb) = &progress {
            pb.set_message(format!(
                "Checking {} and writing brief with {}...",
                filename,
                generator.backend_name()
            ));
        }
        pipeline.scan_with_brief(&filename, &content, &generator).await
    } else {
        pipeline.scan(&filename, &content).await
    };

    if let Some(pb) = progress {
        match &outcome {
            ScanOutcome::Success(report) => pb.finish_with_message(format!(
                "Scanned {} packages",
                report.packages_scanned
            )),
            ScanOutcome::Failure(_) => pb.finish_and_clear(),
        }
    }

    // Handle output
    if let Some(path) = output_file {
        let rendered = format_result_to_string(&outcome, format)?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&outcome, format)?;
    }

    Ok(determine_exit_code(&outcome, fail_above))
}

/// Determine the exit code from the outcome and --fail-above setting
fn determine_exit_code(outcome: &ScanOutcome, fail_above: Option<u8>) -> u8 {
    match outcome {
        ScanOutcome::Failure(_) => exit_codes::REJECTED,
        ScanOutcome::Success(report) => match fail_above {
            Some(threshold) if report.risk_score > threshold => exit_codes::RISK_ABOVE_THRESHOLD,
            _ => exit_codes::SUCCESS,
        },
    }
}

fn list_formats() {
    println!("Supported manifests:");
    println!();

    for kind in ManifestKind::ALL {
        println!("  {:<20} ecosystem: {}", kind.file_name(), kind.ecosystem());
    }

    println!();
    println!("Files are matched by name suffix, e.g. dev-requirements.txt.");
}

fn print_health(config: &Config) -> Result<()> {
    let status = serde_json::json!({
        "status": "ok",
        "service": "depbrief",
        "llm_provider": config.llm.provider.as_str(),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'depbrief config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
