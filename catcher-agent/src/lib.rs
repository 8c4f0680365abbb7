//! Stream Catcher Agent
//!
//! Runs the intercepting proxy the browser is pointed at, together with the
//! admin API used to read captures and hand them to an external player.

use catcher_core::{CatcherConfig, CatcherError, CertificateAuthority, Platform, ProxyServer};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod logging;

#[cfg(test)]
mod config_test;

const ENV_PREFIX: &str = "STREAMCATCHER_";

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on for browser traffic
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Port the browser uses as its proxy
    #[arg(long)]
    pub listen_port: Option<u16>,

    /// Port to expose the Admin API (message/badge/play)
    #[arg(long)]
    pub admin_port: Option<u16>,

    /// Directory where the root CA is kept
    #[arg(long)]
    pub cert_dir: Option<String>,

    /// Host browser: chromium or firefox
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Default player host for new sessions
    #[arg(long)]
    pub player_host: Option<String>,

    /// Default player port for new sessions
    #[arg(long)]
    pub player_port: Option<String>,

    /// Cancel captured requests in the browser
    #[arg(long)]
    pub use_blocking: Option<bool>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

fn parse_env<T: FromStr>(name: &str) -> catcher_core::Result<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            CatcherError::Configuration(format!("Invalid {}{}: '{}'", ENV_PREFIX, name, raw))
        }),
    }
}

fn load_file(path: &Path) -> catcher_core::Result<CatcherConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CatcherError::Configuration(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        CatcherError::Configuration(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Resolve the startup configuration.
///
/// Sources are layered from lowest to highest priority: built-in defaults,
/// the JSON file named by `--config`, `STREAMCATCHER_*` environment
/// variables, then command line flags.
pub fn load_config(args: &Args) -> catcher_core::Result<CatcherConfig> {
    let mut config = match &args.config {
        Some(path) => load_file(path)?,
        None => CatcherConfig::default(),
    };

    if let Some(v) = env_var("LISTEN_ADDR") {
        config.listen_address = v;
    }
    if let Some(v) = parse_env("LISTEN_PORT")? {
        config.listen_port = v;
    }
    if let Some(v) = parse_env("ADMIN_PORT")? {
        config.admin_port = v;
    }
    if let Some(v) = env_var("CERT_DIR") {
        config.cert_dir = v;
    }
    if let Some(v) = parse_env("PLATFORM")? {
        config.platform = v;
    }
    if let Some(v) = env_var("PLAYER_HOST") {
        config.player.host = v;
    }
    if let Some(v) = env_var("PLAYER_PORT") {
        config.player.port = v;
    }
    if let Some(v) = parse_env("USE_BLOCKING")? {
        config.player.use_blocking = v;
    }

    if let Some(v) = &args.listen_addr {
        config.listen_address = v.clone();
    }
    if let Some(v) = args.listen_port {
        config.listen_port = v;
    }
    if let Some(v) = args.admin_port {
        config.admin_port = v;
    }
    if let Some(v) = &args.cert_dir {
        config.cert_dir = v.clone();
    }
    if let Some(v) = args.platform {
        config.platform = v;
    }
    if let Some(v) = &args.player_host {
        config.player.host = v.clone();
    }
    if let Some(v) = &args.player_port {
        config.player.port = v.clone();
    }
    if let Some(v) = args.use_blocking {
        config.player.use_blocking = v;
    }

    config.validate()?;
    Ok(config)
}

pub async fn run_agent(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Logging should be initialized by the caller (main or test)
    let config = load_config(&args)?;

    tracing::info!("Starting Stream Catcher...");
    tracing::info!("  Proxy: {}:{}", config.listen_address, config.listen_port);
    tracing::info!("  Admin: {}:{}", config.listen_address, config.admin_port);
    tracing::info!(
        "  Player: {}:{} (blocking: {})",
        config.player.host,
        config.player.port,
        config.player.use_blocking
    );

    let ca = CertificateAuthority::load_or_create(Path::new(&config.cert_dir))?;
    tracing::info!(
        "Root CA ready in {}; trust ca.crt in the browser to catch HTTPS media",
        config.cert_dir
    );

    let proxy_server = ProxyServer::new(config, ca);
    proxy_server.run().await?;
    Ok(())
}
