//! swagger-modeler CLI entrypoint
//! Parses command-line arguments and runs the resolution pass.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use swagger_modeler::application::{
    ApplicationError, BuildModelRequest, BuildModelResponse, BuildModelUseCase, ModelOutput,
};
use swagger_modeler::core::ModelerConfig;
use swagger_modeler::infrastructure::output::JsonModelOutput;
use swagger_modeler::infrastructure::swagger::CompositeSpecLoader;
use swagger_modeler::modeler::ResolutionErrors;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-modeler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Resolve a Swagger document and write its client model as JSON
    Resolve {
        /// Path or URL of the Swagger 2.0 document (YAML or JSON)
        source: String,
        /// Modeler configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file for the model (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve a Swagger document and report every defect found
    Check {
        /// Path or URL of the Swagger 2.0 document (YAML or JSON)
        source: String,
        /// Modeler configuration file (TOML or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Default level INFO; logs go to stderr so the model can be piped
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Resolve {
            source,
            config,
            output,
        } => resolve(source, config.as_deref(), output.as_deref()).await,
        Commands::Check { source, config } => check(source, config.as_deref()).await,
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<ModelerConfig> {
    match path {
        Some(path) => ModelerConfig::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ModelerConfig::default()),
    }
}

async fn build(source: &str, config: ModelerConfig) -> Result<BuildModelResponse, ApplicationError> {
    let loader = CompositeSpecLoader::new()?;
    BuildModelUseCase::new(Arc::new(loader))
        .execute(BuildModelRequest::new(source, config))
        .await
}

fn report(errors: &ResolutionErrors) {
    error!("Resolution failed with {} error(s)", errors.len());
    for resolution_error in errors {
        error!("{resolution_error}");
    }
}

async fn resolve(
    source: &str,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path).await?;
    let response = match build(source, config).await {
        Ok(response) => response,
        Err(ApplicationError::ResolutionFailed(errors)) => {
            report(&errors);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to build model from {source}")),
    };

    let writer = match output {
        Some(path) => JsonModelOutput::to_file(path),
        None => JsonModelOutput::to_stdout(),
    };
    writer
        .write_model(&response.model)
        .await
        .context("Failed to write client model")?;

    if let Some(path) = output {
        info!("Wrote client model to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn check(source: &str, config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path).await?;
    match build(source, config).await {
        Ok(response) => {
            println!("OK {}", response.summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(ApplicationError::ResolutionFailed(errors)) => {
            for resolution_error in &errors {
                println!("{resolution_error}");
            }
            println!("{} error(s)", errors.len());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to check {source}")),
    }
}
