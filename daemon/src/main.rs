use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use voixd::config::load_config;
use voixd::server::DaemonServer;
use voixd::{DaemonState, FeedEngine};

const REQUEST_QUEUE: usize = 64;

#[derive(Parser)]
#[command(name = "voixd")]
#[command(about = "Hold-to-talk voice command daemon")]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/voix/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Socket path, overriding the config file
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    let args = Args::parse();

    info!("voix daemon (voixd) starting...");

    let config = load_config(args.config.as_deref())?;
    let socket_path = args
        .socket
        .unwrap_or_else(|| config.server.socket_path());

    let daemon_state = DaemonState::new(&config, FeedEngine::new())?;
    let (state, event_loop) = daemon_state.spawn(REQUEST_QUEUE);

    let server = DaemonServer::new(socket_path, state);
    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!("Socket server failed: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    drop(server);
    event_loop.abort();
    Ok(())
}
