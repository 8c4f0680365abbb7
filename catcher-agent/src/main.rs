//! Stream Catcher binary entry point

use catcher_agent::{logging, run_agent, Args};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(args.log_json)?;

    tokio::select! {
        result = run_agent(args) => {
            if let Err(e) = result {
                tracing::error!("Stream Catcher failed: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping proxy...");
        }
    }

    Ok(())
}
