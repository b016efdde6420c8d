use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use wayfarer::prelude::*;
use wayfarer_log::{error, info};

/// Wayfarer Tours site backend
#[derive(Debug, Parser)]
#[command(name = "wayfarer", version, about)]
struct Cli {
    /// Configuration file (TOML, JSON or .env)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Alternate .env file
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<SiteConfig, AppError> {
    let mut builder = SiteConfigBuilder::new();
    if let Some(path) = &cli.config {
        builder = builder.add_file(path);
    }
    builder = builder.load_dotenv(cli.env_file.clone()).load_env();
    if let Some(port) = cli.port {
        builder = builder.set("port", port.to_string());
    }
    Ok(builder.build()?)
}

async fn serve(config: SiteConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config.bind_address().parse()?;
    info!(
        environment = %config.environment,
        security_headers = config.security_headers,
        csp_report_only = config.csp_report_only,
        report_dir = %config.report_dir.display(),
        "Starting Wayfarer"
    );
    build_application(&config)?.listen(addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration loads .env into the environment, so it comes before logging
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("wayfarer: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match LogConfig::from_env().init() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("wayfarer: {err}");
            return ExitCode::FAILURE;
        }
    };

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Server stopped");
            ExitCode::FAILURE
        }
    }
}
