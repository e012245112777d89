use std::net::SocketAddr;
use std::process::ExitCode;

use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::config::ServerConfig;
use transit_server::contact::ContactMailer;
use transit_server::datasets::Datasets;
use transit_server::fares::{FareSource, FareTable};
use transit_server::ratelimit::RateLimiter;
use transit_server::web::{AppState, create_router};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "transit_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let datasets = Datasets::bundled()?;
    info!(
        bus_stops = datasets.bus_stops.len(),
        train_stations = datasets.train_stations.len(),
        bus_routes = datasets.bus_routes.len(),
        train_routes = datasets.train_routes.len(),
        "loaded datasets"
    );

    let fallback = match &config.fares_path {
        Some(path) => FareTable::load(path)?,
        None => FareTable::bundled()?,
    };
    info!(
        source = fallback.source(),
        last_updated = %fallback.last_updated(),
        "loaded fallback fare table"
    );

    let fares = FareSource::new(&config.fares, fallback)?;
    let limiter = RateLimiter::new(&config.rate_limit);

    let mailer = ContactMailer::new(config.api_secret_key.clone());
    if !mailer.is_configured() {
        warn!("API_SECRET_KEY not set, contact form will answer with a configuration error");
    }

    let state = AppState::new(datasets, fares, limiter, mailer);

    if let Some(url) = &config.fares.url {
        info!(%url, ttl_secs = config.fares.ttl.as_secs(), "fetching fares from remote snapshot");
        state.fares.current().await;

        // Keep the cache warm so requests rarely wait on a fetch
        let fares = state.fares.clone();
        let period = config.fares.ttl;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                fares.current().await;
            }
        });
    }

    let static_dir = config.static_dir.to_string_lossy();
    let app = create_router(state, &static_dir).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "transit finder listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
