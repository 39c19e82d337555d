use sqlx::PgPool;

use crate::session::SessionStore;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, sessions: SessionStore::new() }
    }
}
