//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::invites::{InviteLifecycle, SuggestionEngine};
use crate::places::PlaceDetailsProvider;
use crate::repositories::{FavoriteRepository, NotificationRepository, UserRepository};
use crate::store::DocumentStore;
use crate::ws::usermap::UserMap;
use chrono::Duration;
use std::sync::Arc;

pub const DEFAULT_FAVORITE_REFRESH_DAYS: i64 = 30;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Document store condiviso da tutti i repository
    pub store: Arc<dyn DocumentStore>,

    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per preferiti e catalogo ristoranti
    pub favorite: FavoriteRepository,

    /// Repository per le notifiche
    pub notification: NotificationRepository,

    /// Unico punto di scrittura degli inviti
    pub invites: InviteLifecycle,

    /// Provider dei dettagli dei locali, assente se non configurato
    pub places: Option<Arc<dyn PlaceDetailsProvider>>,

    /// Age after which a favorite's catalog data is refetched
    pub favorite_refresh_age: Duration,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Mappa concorrente degli utenti online con i loro canali WebSocket
    /// Key: user_id, Value: Sender per inviare messaggi al WebSocket dell'utente
    pub users_online: UserMap,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// sullo store fornito e la JWT secret.
    ///
    /// # Arguments
    /// * `store` - Document store condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(store: Arc<dyn DocumentStore>, jwt_secret: String) -> Self {
        Self::with_engine(store, jwt_secret, SuggestionEngine::new())
    }

    /// Same as [`AppState::new`] with an explicit suggestion engine (seeded in tests)
    pub fn with_engine(
        store: Arc<dyn DocumentStore>,
        jwt_secret: String,
        engine: SuggestionEngine,
    ) -> Self {
        Self {
            user: UserRepository::new(store.clone()),
            favorite: FavoriteRepository::new(store.clone()),
            notification: NotificationRepository::new(store.clone()),
            invites: InviteLifecycle::with_engine(store.clone(), engine),
            store,
            places: None,
            favorite_refresh_age: Duration::days(DEFAULT_FAVORITE_REFRESH_DAYS),
            jwt_secret,
            users_online: UserMap::new(),
        }
    }

    /// Enables the background refresh of stale favorites
    pub fn with_places(mut self, provider: Arc<dyn PlaceDetailsProvider>, max_age: Duration) -> Self {
        self.places = Some(provider);
        self.favorite = self.favorite.with_catalog_max_age(max_age);
        self.favorite_refresh_age = max_age;
        self
    }
}
