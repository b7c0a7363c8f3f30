#![forbid(unsafe_code)]

use clap::Parser;
use ipgate_lib::config::load_from_path;
use ipgate_lib::telemetry::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "IP allow-list gate in front of an HTTP service")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "IPGATE_CONFIG",
        default_value = "config/ipgate.toml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = init_tracing("info", false);
            error!(%err, config = %cli.config.display(), "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_tracing(&cfg.logging.level, cfg.logging.show_target) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    info!(
        listen = %cfg.listen,
        upstream = %cfg.upstream,
        allowlist = cfg.allowlist.len(),
        "configuration loaded"
    );

    if let Err(err) = ipgate_lib::run(Arc::new(cfg)).await {
        error!(%err, "gate exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
