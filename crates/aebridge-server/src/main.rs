//! Binary entrypoint for the bridge server.
//!
//! Configuration comes from `AEBRIDGE_*` environment variables (see
//! [`aebridge_server::config`]). Scripts are evaluated by the host program
//! named in `AEBRIDGE_EVAL_COMMAND`, which receives each script on stdin.

use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use aebridge_server::config::{BridgeConfig, ConfigError};
use aebridge_server::host::CommandEvaluator;
use aebridge_server::server::serve;
use aebridge_server::BridgeError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        tracing::error!("{}", err);
        process::exit(1);
    }
}

async fn run() -> Result<(), BridgeError> {
    let config = BridgeConfig::from_env()?;
    let command = config
        .host_command
        .clone()
        .ok_or(ConfigError::MissingEvalCommand)?;

    tracing::info!(
        program = %command.program,
        permits = config.eval_concurrency,
        timeout = ?config.eval_timeout,
        "using host command evaluator"
    );
    let evaluator = CommandEvaluator::new(command, config.eval_concurrency);

    serve(&config, Arc::new(evaluator)).await
}
