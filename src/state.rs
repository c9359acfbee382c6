use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{config::ServerConfig, events::EventRelay, ws::rooms::Rooms};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    relay: EventRelay,
    rooms: Rooms,
    config: ServerConfig,
}

impl AppState {
    pub fn new(pool: SqlitePool, relay: EventRelay, rooms: Rooms, config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                relay,
                rooms,
                config,
            }),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn relay(&self) -> &EventRelay {
        &self.inner.relay
    }

    pub fn rooms(&self) -> &Rooms {
        &self.inner.rooms
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }
}
