use std::sync::Arc;

use anyhow::anyhow;
use tracing::error;

use todoism_db::Database;

use crate::config::Config;
use crate::error::ApiError;
use crate::pagination::Paginator;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: Config,
    pub tokens: TokenService,
    pub paginator: Paginator,
}

impl AppStateInner {
    pub fn new(db: Database, config: Config) -> AppState {
        Arc::new(Self {
            tokens: TokenService::from_config(&config),
            paginator: Paginator::new(config.items_per_page),
            db,
            config,
        })
    }
}

/// Runs blocking database work off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&*state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("blocking task failed: {}", e))
        })?
}
