use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;

/// Shared server context: the connection pool and the immutable
/// configuration captured at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool: Arc::new(pool),
            config: Arc::new(config),
        }
    }
}
