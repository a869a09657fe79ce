use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, DatabaseBackend, DatabaseConfig};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::song::repository::{memory::InMemorySongRepository, MongoSongRepository};
use service::SongRepository;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the song repository selected by config into the handler state.
///
/// A failed MongoDB ping is logged but not fatal: the driver reconnects on
/// its own and individual requests report the outage.
pub async fn build_state(cfg: &DatabaseConfig) -> anyhow::Result<AppState> {
    let repo: Arc<dyn SongRepository> = match cfg.backend {
        DatabaseBackend::Mongo => {
            let db = models::db::connect(cfg).await?;
            match models::db::ping(&db).await {
                Ok(()) => info!(database = %cfg.name, collection = %cfg.collection, "mongodb reachable"),
                Err(e) => warn!(error = %e, "mongodb ping failed; song requests will fail until it is reachable"),
            }
            Arc::new(MongoSongRepository::new(models::db::songs_collection(&db, &cfg.collection)))
        }
        DatabaseBackend::Memory => {
            warn!("using in-memory song repository; data is lost on restart");
            Arc::new(InMemorySongRepository::new())
        }
    };
    Ok(AppState::new(repo))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let state = build_state(&cfg.database).await?;

    let app: Router = routes::build_router(state, build_cors());

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(addr = %listener.local_addr()?, "song service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
