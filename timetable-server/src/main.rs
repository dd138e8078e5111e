mod routes;
mod singleton;
mod state;

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use timetable_core::Timetable;
use timetable_core::config::TimetableConfig;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_PORT: u16 = 4097;

#[derive(Parser)]
#[command(name = "timetable-server")]
#[command(about = "Serve today's and this week's study timetable over HTTP")]
struct Args {
    /// Port to listen on (localhost only)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = TimetableConfig::load()?;

    // Ensure only one instance writes this data directory
    let _lock = singleton::acquire_lock(&config.data_path())?;

    let state = AppState::new(Timetable::open(&config)?);
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!(
        %addr,
        data_dir = %config.data_path().display(),
        timezone = %config.timezone,
        "timetable-server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
