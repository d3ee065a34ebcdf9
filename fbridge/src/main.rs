use std::process::ExitCode;

use clap::Parser;
use fbridge::cli::Cli;
use fbridge::{BridgeConfig, BridgeError, build_bridge};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "fbridge stopped");
            eprintln!("fbridge: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BridgeError> {
    let conversation_id = cli.conversation_id()?;
    let config = BridgeConfig::load(&cli.config)?;
    let bridge = build_bridge(&config)?;
    tracing::info!(
        config = %cli.config.display(),
        endpoints = bridge.failover().registry().len(),
        conversation_id = %conversation_id,
        "fbridge ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| BridgeError::io(format!("failed to read stdin: {err}")))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let reply = bridge.converse(conversation_id.clone(), &line).await;
        stdout
            .write_all(format!("{reply}\n").as_bytes())
            .await
            .map_err(|err| BridgeError::io(format!("failed to write stdout: {err}")))?;
        stdout
            .flush()
            .await
            .map_err(|err| BridgeError::io(format!("failed to flush stdout: {err}")))?;
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
