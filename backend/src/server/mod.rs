//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};
pub(crate) use state_builders::{LoadedStore, load_match_store};

use state_builders::{build_cache, build_feed_follower, build_http_state};

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use winrate::Trace;
#[cfg(debug_assertions)]
use winrate::doc::ApiDoc;
#[cfg(not(feature = "metrics"))]
use winrate::domain::ports::NoOpQueryLatencyMetrics;
use winrate::domain::ports::{QueryLatencyMetrics, WinrateCache};
use winrate::inbound::http::error::query_error_handler;
use winrate::inbound::http::health::{HealthState, live, ready};
use winrate::inbound::http::state::HttpState;
use winrate::inbound::http::winrate::get_winrate;
#[cfg(feature = "metrics")]
use winrate::outbound::metrics::PrometheusQueryLatencyMetrics;

/// Build the HTTP middleware and latency sink sharing one Prometheus registry.
///
/// # Errors
/// Returns [`std::io::Error`] if the middleware or histogram cannot be
/// registered.
#[cfg(feature = "metrics")]
fn build_metrics() -> std::io::Result<(PrometheusMetrics, Arc<dyn QueryLatencyMetrics>)> {
    let prometheus = PrometheusMetricsBuilder::new("winrate")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("prometheus middleware failed: {e}")))?;
    let latency = PrometheusQueryLatencyMetrics::new(&prometheus.registry).map_err(|e| {
        std::io::Error::other(format!("query latency metrics registration failed: {e}"))
    })?;
    Ok((prometheus, Arc::new(latency)))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1").service(get_winrate);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(api)
        .service(get_winrate)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Start following the configured match feed on the current runtime.
fn spawn_feed_follower(
    config: &ServerConfig,
    cache: Arc<dyn WinrateCache>,
) -> Option<JoinHandle<()>> {
    let follower = build_feed_follower(config, cache)?;
    info!(
        interval_ms = config.feed_interval.as_millis(),
        "following match store"
    );
    Some(tokio::spawn(follower.run(config.feed_interval)))
}

/// Construct an Actix HTTP server serving winrates from the configured store.
///
/// Marks `health_state` ready once the listener is bound; the store must
/// already be loaded. When the config carries a match feed, a background
/// task keeps the store in step with it and clears the gateway's cache on
/// every applied batch.
///
/// # Errors
/// Propagates [`std::io::Error`] when metrics registration, binding the
/// socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    #[cfg(feature = "metrics")]
    let (prometheus, latency_metrics) = build_metrics()?;
    #[cfg(not(feature = "metrics"))]
    let latency_metrics: Arc<dyn QueryLatencyMetrics> = Arc::new(NoOpQueryLatencyMetrics);

    let cache = build_cache(&config);
    let http_state = build_http_state(&config, Arc::clone(&cache), latency_metrics);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .workers(config.workers)
    .bind(config.bind_addr)?
    .run();

    // Detached: the follower lives as long as the runtime.
    let _follower = spawn_feed_follower(&config, cache);
    health_state.mark_ready();
    Ok(server)
}
