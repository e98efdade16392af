//! Winrate service entry-point: loads the match table, then serves lookups,
//! health checks and OpenAPI docs while following rows appended to the
//! store.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{LoadedStore, ServerConfig, ServerSettings, create_server, load_match_store};
use winrate::inbound::http::health::HealthState;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings = ServerSettings::load_from_iter(args)
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = ServerConfig::from_settings(&settings)?;
    let LoadedStore { store, feed } = load_match_store(settings.data_path()).await?;
    let config = config.with_match_store(store).with_match_feed(feed);

    info!(
        bind_addr = %config.bind_addr,
        workers = config.workers,
        version = %config.gateway.version,
        "starting winrate server"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
