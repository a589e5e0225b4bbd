//! Builds the HTTP state over PostgreSQL or the in-memory fallback.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use foodgram_backend::inbound::http::state::{Adapters, HttpState};
use foodgram_backend::outbound::memory::MemoryStore;
use foodgram_backend::outbound::persistence::{
    DbPool, DieselIngredientRepository, DieselRecipeRepository, DieselRelationRepository,
    DieselUserRepository,
};

use super::ServerConfig;

fn diesel_state(pool: &DbPool, config: &ServerConfig) -> HttpState {
    HttpState::from_adapters(Adapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
        relations: Arc::new(DieselRelationRepository::new(pool.clone())),
        images: Arc::new(config.media.clone()),
        clock: Arc::new(DefaultClock),
    })
}

fn memory_state(config: &ServerConfig) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::from_adapters(Adapters {
        users: Arc::clone(&store),
        recipes: Arc::clone(&store),
        ingredients: Arc::clone(&store),
        relations: store,
        images: Arc::new(config.media.clone()),
        clock: Arc::new(DefaultClock),
    })
}

/// Build the shared HTTP state for every worker.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => diesel_state(pool, config),
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            memory_state(config)
        }
    };
    web::Data::new(state.with_page_size(config.page_size))
}
