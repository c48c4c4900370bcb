use partyof2::core::{AppState, Config};
use partyof2::notifications::NotificationDispatcher;
use partyof2::places::GooglePlacesClient;
use partyof2::store::{DocumentStore, MemoryStore, MySqlStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza il logging (RUST_LOG ha la precedenza)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("partyof2=debug,tower_http=info")),
        )
        .with(fmt::layer())
        .init();

    // Carica la configurazione
    let config = Config::from_env()?;
    config.print_info();

    // Store: MySQL se configurato, altrimenti in memoria
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => Arc::new(
            MySqlStore::connect(url, config.max_connections, config.connection_lifetime_secs)
                .await?,
        ),
        None => {
            warn!("DATABASE_URL not set, data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let mut state = AppState::new(store, config.jwt_secret.clone());
    if let Some(key) = &config.places_api_key {
        state = state.with_places(
            Arc::new(GooglePlacesClient::new(key.clone())),
            chrono::Duration::days(config.favorite_refresh_days),
        );
    }
    let state = Arc::new(state);

    // Dispatcher delle notifiche sul feed degli inviti
    NotificationDispatcher::new(state.clone(), config.notification_dedupe_capacity).spawn();

    let app = partyof2::create_router(state).layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
