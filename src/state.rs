use crate::config::Settings;
use crate::store::{InMemoryStore, SqlStore, TriviaStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TriviaStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TriviaStore>) -> Self {
        Self { store }
    }

    pub async fn from_settings(settings: &Settings) -> Self {
        let Some(url) = settings.database_url.as_deref() else {
            info!("DATABASE_URL not set, serving from in-memory store");
            return Self::new(Arc::new(InMemoryStore::seeded()));
        };
        match SqlStore::connect(url, settings.max_connections).await {
            Ok(store) => {
                info!("database connected and migrations applied");
                Self::new(Arc::new(store))
            }
            Err(err) => {
                warn!(
                    "database is unavailable ({}), backend continues in local in-memory mode",
                    err
                );
                Self::new(Arc::new(InMemoryStore::seeded()))
            }
        }
    }
}
