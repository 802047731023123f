//! Keygate activation service.
//!
//! Binds activation keys to client identifiers, first write wins:
//! 1. `POST /verify` activates or re-verifies a key
//! 2. `GET /admin` lists bindings; `POST /remove_key/{key}` revokes one
//!
//! Usage:
//!   keygate --authority-url https://example.com/keys.txt
//!   PORT=8080 keygate --open

use std::{path::PathBuf, time::Duration};
use anyhow::{bail, Context, Result};
use clap::Parser;
use keygate_activation::DEFAULT_AUTHORITY_TIMEOUT;
use keygate_server::{build_router, AppState, AuthorityConfig, ServerConfig};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "keygate")]
#[command(about = "Keygate key activation service")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Path to the JSON binding store
    #[arg(short, long, env = "KEYGATE_DATA_FILE", default_value = "keys.json")]
    data_file: PathBuf,

    /// URL of the newline-separated authority key list
    #[arg(long, env = "KEYGATE_AUTHORITY_URL")]
    authority_url: Option<String>,

    /// Timeout for each authority list fetch, in seconds
    #[arg(long, env = "KEYGATE_AUTHORITY_TIMEOUT_SECS", default_value_t = DEFAULT_AUTHORITY_TIMEOUT.as_secs())]
    authority_timeout_secs: u64,

    /// Accept any key on first use instead of checking an authority list
    #[arg(long, env = "KEYGATE_OPEN")]
    open: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn server_config(&self) -> Result<ServerConfig> {
        let authority = match (&self.authority_url, self.open) {
            (_, true) => {
                if self.authority_url.is_some() {
                    warn!("--open given, ignoring --authority-url");
                }
                AuthorityConfig::Open
            }
            (Some(url), false) => AuthorityConfig::Remote {
                url: url.clone(),
                timeout: Duration::from_secs(self.authority_timeout_secs),
            },
            (None, false) => bail!("--authority-url is required unless --open is set"),
        };

        Ok(ServerConfig {
            data_file: self.data_file.clone(),
            authority,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Keygate starting...");
    let config = args.server_config()?;
    match &config.authority {
        AuthorityConfig::Remote { url, timeout } => {
            info!("Authority list: {} (timeout {:?})", url, timeout);
        }
        AuthorityConfig::Open => warn!("Open activation: every key is accepted on first use"),
    }
    info!("Binding store: {:?}", config.data_file);

    let state = AppState::from_config(&config).context("Failed to initialize activation service")?;
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
