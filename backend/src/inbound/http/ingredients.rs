//! Ingredient catalogue lookups.
//!
//! ```text
//! GET /api/ingredients?name=Са
//! GET /api/ingredients/{id}
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, Ingredient, IngredientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query for the catalogue search.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IngredientSearch {
    /// Case-sensitive name prefix.
    pub name: Option<String>,
}

/// Search ingredients by name prefix; unpaginated.
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(IngredientSearch),
    responses(
        (status = 200, description = "Matching ingredients ordered by name", body = [Ingredient])
    ),
    tags = ["ingredients"],
    operation_id = "searchIngredients",
    security([])
)]
#[get("/ingredients")]
pub async fn search_ingredients(
    state: web::Data<HttpState>,
    query: web::Query<IngredientSearch>,
) -> ApiResult<web::Json<Vec<Ingredient>>> {
    let prefix = query.into_inner().name.filter(|name| !name.is_empty());
    Ok(web::Json(state.ingredients.search(prefix).await?))
}

/// Fetch one ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = Ingredient),
        (status = 404, description = "Unknown ingredient", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id:\\d+}")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Ingredient>> {
    let ingredient = state
        .ingredients
        .get(IngredientId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ingredient))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_ingredients).service(get_ingredient);
}
