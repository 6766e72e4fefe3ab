use std::process::ExitCode;

use tracing::{error, info, warn};

use tokenbridge::config::{load_config, print_schema, DEFAULT_CONFIG_PATH};
use tokenbridge::utils::logger::init_logging;
use tokenbridge::{init_from_config, BridgeError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event_name = "bridge.failed", "{}", e);
            eprintln!("tokenbridge: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BridgeError> {
    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--print-schema") {
        return print_schema();
    }

    let path = arg.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path)?;
    init_logging(&config.logging)?;
    info!(config = %path, context = %config.context, "Loaded configuration");

    let bridge = init_from_config(&config).await?;

    let Some(poll) = bridge.start_poll() else {
        match bridge.handler().get().await {
            Some(token) => info!(token = ?token, "Session token available"),
            None => info!("No session token available"),
        }
        bridge.teardown();
        return Ok(());
    };

    let cancel = poll.cancellation_token();
    tokio::select! {
        token = poll.wait() => match token {
            Some(token) => info!(event_name = "bridge.token_found", token = ?token, "Session token synced"),
            None => warn!("Polling stopped without a token"),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping poll");
            cancel.cancel();
        }
    }

    bridge.teardown();
    Ok(())
}
