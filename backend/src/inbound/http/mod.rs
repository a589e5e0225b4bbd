//! HTTP inbound adapter exposing the REST API.

pub mod auth;
pub mod error;
pub mod health;
pub(crate) mod images;
pub mod ingredients;
pub mod media;
pub(crate) mod pages;
pub mod recipes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api` route on `cfg`.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .configure(users::configure)
        .configure(ingredients::configure)
        .configure(recipes::configure);
}
