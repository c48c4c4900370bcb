use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "un segreto meno bello";

#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database URL the server runs on the in-memory store
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub app_env: String,
    /// Google Places key used to refresh stale favorites
    pub places_api_key: Option<String>,
    pub favorite_refresh_days: i64,
    pub notification_dedupe_capacity: usize,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let connection_lifetime_secs = env::var("DB_CONNECTION_LIFETIME_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .map_err(|_| {
                "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number".to_string()
            })?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let places_api_key = env::var("PLACES_API_KEY").ok().filter(|key| !key.is_empty());

        let favorite_refresh_days = env::var("FAVORITE_REFRESH_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| "Invalid FAVORITE_REFRESH_DAYS: must be a positive number".to_string())?;

        let notification_dedupe_capacity = env::var("NOTIFICATION_DEDUPE_CAPACITY")
            .unwrap_or_else(|_| "4096".to_string())
            .parse::<usize>()
            .map_err(|_| {
                "Invalid NOTIFICATION_DEDUPE_CAPACITY: must be a positive number".to_string()
            })?;

        Ok(Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            app_env,
            places_api_key,
            favorite_refresh_days,
            notification_dedupe_capacity,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        match &self.database_url {
            Some(url) => info!("   Database: {}", Self::mask_url(url)),
            None => info!("   Database: in-memory store (DATABASE_URL not set)"),
        }
        info!("   Max DB Connections: {}", self.max_connections);
        info!("   Connection Lifetime: {}s", self.connection_lifetime_secs);
        info!(
            "   JWT Secret: {}",
            if self.jwt_secret == DEFAULT_JWT_SECRET {
                "USING DEFAULT (INSECURE!)"
            } else {
                "custom secret configured"
            }
        );
        info!(
            "   Places refresh: {}",
            if self.places_api_key.is_some() {
                format!("every {} days", self.favorite_refresh_days)
            } else {
                "disabled (PLACES_API_KEY not set)".to_string()
            }
        );
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}
