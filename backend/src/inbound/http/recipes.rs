//! Recipe endpoints, favorites, shopping cart and its export.
//!
//! ```text
//! GET    /api/recipes?page=1&limit=6&author=3&is_favorited=1
//! POST   /api/recipes
//! GET    /api/recipes/download_shopping_cart
//! GET    /api/recipes/{id}
//! PUT    /api/recipes/{id}
//! PATCH  /api/recipes/{id}
//! DELETE /api/recipes/{id}
//! GET    /api/recipes/{id}/get-link
//! POST   /api/recipes/{id}/favorite
//! DELETE /api/recipes/{id}/favorite
//! POST   /api/recipes/{id}/shopping_cart
//! DELETE /api/recipes/{id}/shopping_cart
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::RecipeListFilter;
use crate::domain::{
    Amount, CookingTime, Error, ErrorCode, ImageUpload, IngredientId, IngredientLine,
    IngredientLines, RecipeChanges, RecipeDraft, RecipeId, RecipeName, RecipeRelation,
    RecipeSummaryView, RecipeText, RecipeView, SHOPPING_LIST_FILENAME, UserId, Viewer,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_actor, viewer};
use crate::inbound::http::images::decode_data_uri;
use crate::inbound::http::pages::{envelope, page_params};
use crate::inbound::http::schemas::RecipePageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldErrors, FieldName, parse_flag, required, unknown_choice_error,
};

const NAME: FieldName = FieldName::new("name");
const TEXT: FieldName = FieldName::new("text");
const COOKING_TIME: FieldName = FieldName::new("cooking_time");
const IMAGE: FieldName = FieldName::new("image");
const INGREDIENTS: FieldName = FieldName::new("ingredients");
const AUTHOR: FieldName = FieldName::new("author");
const IS_FAVORITED: FieldName = FieldName::new("is_favorited");
const IS_IN_SHOPPING_CART: FieldName = FieldName::new("is_in_shopping_cart");

/// One `{id, amount}` line of a recipe payload.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: i64,
    #[schema(minimum = 1, maximum = 32767)]
    pub amount: i64,
}

/// Body for creating or updating a recipe.
///
/// Every field is optional at the parsing stage so absent values surface as
/// field errors rather than deserialisation failures.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    /// `data:image/<ext>;base64,<payload>`.
    pub image: Option<String>,
    #[schema(max_length = 256)]
    pub name: Option<String>,
    pub text: Option<String>,
    #[schema(minimum = 1, maximum = 32767)]
    pub cooking_time: Option<i64>,
}

fn ingredient_lines(raw: Vec<IngredientAmountRequest>) -> Result<IngredientLines, Error> {
    let lines = raw
        .into_iter()
        .map(|line| -> Result<IngredientLine, Error> {
            let ingredient = IngredientId::new(line.id);
            Ok(IngredientLine {
                ingredient,
                amount: Amount::new(ingredient, line.amount)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IngredientLines::new(lines)?)
}

fn parse_name(raw: String) -> Result<RecipeName, Error> {
    Ok(RecipeName::new(raw)?)
}

fn parse_text(raw: String) -> Result<RecipeText, Error> {
    Ok(RecipeText::new(raw)?)
}

fn parse_cooking_time(raw: i64) -> Result<CookingTime, Error> {
    Ok(CookingTime::new(raw)?)
}

fn parse_image(raw: String) -> Result<ImageUpload, Error> {
    decode_data_uri(&raw, IMAGE)
}

impl TryFrom<RecipeRequest> for RecipeDraft {
    type Error = Error;

    fn try_from(value: RecipeRequest) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        let ingredients =
            errors.check(required(value.ingredients, INGREDIENTS).and_then(ingredient_lines));
        let image = errors.check(required(value.image, IMAGE).and_then(parse_image));
        let name = errors.check(required(value.name, NAME).and_then(parse_name));
        let text = errors.check(required(value.text, TEXT).and_then(parse_text));
        let cooking_time = errors.check(
            required(value.cooking_time, COOKING_TIME).and_then(parse_cooking_time),
        );
        let (Some(ingredients), Some(image), Some(name), Some(text), Some(cooking_time)) =
            (ingredients, image, name, text, cooking_time)
        else {
            return Err(errors.into_error());
        };
        Ok(Self {
            name,
            text,
            cooking_time,
            image,
            ingredients,
        })
    }
}

impl TryFrom<RecipeRequest> for RecipeChanges {
    type Error = Error;

    fn try_from(value: RecipeRequest) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        let name = errors.check(value.name.map(parse_name).transpose());
        let text = errors.check(value.text.map(parse_text).transpose());
        let cooking_time =
            errors.check(value.cooking_time.map(parse_cooking_time).transpose());
        let image = errors.check(value.image.map(parse_image).transpose());
        let ingredients = errors.check(value.ingredients.map(ingredient_lines).transpose());
        errors.finish()?;
        Ok(Self {
            name: name.flatten(),
            text: text.flatten(),
            cooking_time: cooking_time.flatten(),
            image: image.flatten(),
            ingredients: ingredients.flatten(),
        })
    }
}

/// Changes for a full replacement: every field but `image` must be present.
fn replacement(value: RecipeRequest) -> Result<RecipeChanges, Error> {
    let mut errors = FieldErrors::default();
    errors.check(required(value.ingredients.as_ref(), INGREDIENTS));
    errors.check(required(value.name.as_ref(), NAME));
    errors.check(required(value.text.as_ref(), TEXT));
    errors.check(required(value.cooking_time, COOKING_TIME));
    errors.finish()?;
    RecipeChanges::try_from(value)
}

/// Listing filters and pagination.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Only recipes by this author.
    pub author: Option<i64>,
    /// `1`/`true` keeps only the viewer's favorites.
    pub is_favorited: Option<String>,
    /// `1`/`true` keeps only recipes in the viewer's cart.
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    fn filter(&self) -> Result<RecipeListFilter, Error> {
        Ok(RecipeListFilter {
            author: self.author.map(UserId::new),
            is_favorited: parse_flag(self.is_favorited.as_deref(), IS_FAVORITED)?,
            is_in_shopping_cart: parse_flag(
                self.is_in_shopping_cart.as_deref(),
                IS_IN_SHOPPING_CART,
            )?,
        })
    }
}

async fn ensure_author_exists(
    state: &HttpState,
    viewer: Viewer,
    author: UserId,
) -> Result<(), Error> {
    match state.users.get(viewer, author).await {
        Ok(_) => Ok(()),
        Err(error) if error.code() == ErrorCode::NotFound => Err(unknown_choice_error(AUTHOR)),
        Err(error) => Err(error),
    }
}

/// Body of `GET /api/recipes/{id}/get-link`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "42")]
    pub short_link: String,
}

/// List recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = RecipePageSchema),
        (status = 400, description = "Invalid filter or unknown author", body = Error),
        (status = 404, description = "Page out of range", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes")]
pub async fn list_recipes(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Page<RecipeView>>> {
    let viewer = viewer(&session, &state).await?;
    let filter = query.filter()?;
    if let Some(author) = filter.author {
        ensure_author_exists(&state, viewer, author).await?;
    }
    let params = page_params(&state, query.page, query.limit)?;
    let slice = state.recipes_query.list(viewer, filter, params).await?;
    Ok(web::Json(envelope(&req, slice, params)))
}

/// Publish a recipe.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Created", body = RecipeView),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    let draft = RecipeDraft::try_from(payload.into_inner())?;
    let recipe = state.recipes.create(actor, draft).await?;
    Ok(HttpResponse::Created().json(recipe))
}

/// Fetch one recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeView),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id:\\d+}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeView>> {
    let viewer = viewer(&session, &state).await?;
    let recipe = state
        .recipes_query
        .get(viewer, RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(recipe))
}

/// Replace a recipe; every field except `image` is required.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Replaced", body = RecipeView),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
#[put("/recipes/{id:\\d+}")]
pub async fn replace_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeView>> {
    let actor = require_actor(&session, &state).await?;
    let changes = replacement(payload.into_inner())?;
    let recipe = state
        .recipes
        .update(actor, RecipeId::new(path.into_inner()), changes)
        .await?;
    Ok(web::Json(recipe))
}

/// Partially update a recipe; `ingredients` is still required.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Updated", body = RecipeView),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id:\\d+}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeView>> {
    let actor = require_actor(&session, &state).await?;
    let changes = RecipeChanges::try_from(payload.into_inner())?;
    let recipe = state
        .recipes
        .update(actor, RecipeId::new(path.into_inner()), changes)
        .await?;
    Ok(web::Json(recipe))
}

/// Delete a recipe.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id:\\d+}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    state
        .recipes
        .delete(actor, RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Short link for sharing a recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "recipeShortLink",
    security([])
)]
#[get("/recipes/{id:\\d+}/get-link")]
pub async fn short_link(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let short_link = state
        .recipes_query
        .short_link(RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ShortLinkResponse { short_link }))
}

async fn add_relation(
    state: &HttpState,
    session: &SessionContext,
    kind: RecipeRelation,
    id: i64,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(session, state).await?;
    let summary = state
        .relations
        .add(actor, kind, RecipeId::new(id))
        .await?;
    Ok(HttpResponse::Created().json(summary))
}

async fn remove_relation(
    state: &HttpState,
    session: &SessionContext,
    kind: RecipeRelation,
    id: i64,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(session, state).await?;
    state
        .relations
        .remove(actor, kind, RecipeId::new(id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a recipe to favorites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryView),
        (status = 400, description = "Already a favorite", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id:\\d+}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_relation(&state, &session, RecipeRelation::Favorite, path.into_inner()).await
}

/// Remove a recipe from favorites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Was not a favorite", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id:\\d+}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_relation(&state, &session, RecipeRelation::Favorite, path.into_inner()).await
}

/// Add a recipe to the shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryView),
        (status = 400, description = "Already in the cart", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id:\\d+}/shopping_cart")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_relation(
        &state,
        &session,
        RecipeRelation::ShoppingCart,
        path.into_inner(),
    )
    .await
}

/// Remove a recipe from the shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Was not in the cart", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id:\\d+}/shopping_cart")]
pub async fn remove_from_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_relation(
        &state,
        &session,
        RecipeRelation::ShoppingCart,
        path.into_inner(),
    )
    .await
}

/// Download the aggregated shopping list as a text attachment.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 400, description = "Cart is empty", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = require_actor(&session, &state).await?;
    let list = state.shopping_list.shopping_list(actor).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_owned())],
    };
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(disposition)
        .body(list.render()))
}

/// Register every recipe route; the export precedes the `{id}` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(download_shopping_cart)
        .service(list_recipes)
        .service(create_recipe)
        .service(get_recipe)
        .service(replace_recipe)
        .service(update_recipe)
        .service(delete_recipe)
        .service(short_link)
        .service(add_favorite)
        .service(remove_favorite)
        .service(add_to_cart)
        .service(remove_from_cart);
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
