//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for ingredients, recipes, users
//! and the relation edges between them, plus the services that implement
//! the driving ports. Nothing here depends on HTTP or a particular store.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - Recipe, Ingredient, User: stored entities.
//! - Edge with `add_edge`/`remove_edge`: the shared relation toggle.
//! - ShoppingList: cart aggregation and text rendering.
//! - ViewProjector: per-viewer read projections.

mod account_service;
pub mod auth;
pub mod error;
pub mod identifiers;
pub mod image;
pub mod ingredient;
mod ingredient_service;
pub mod listing;
mod media;
pub mod ports;
pub mod projection;
pub mod recipe;
mod recipe_service;
pub mod relation;
mod relation_service;
pub mod shopping_list;
pub mod trace_id;
pub mod user;
pub mod viewer;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordDigest, PasswordDigestError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifiers::{IngredientId, InvalidIdentifier, RecipeId, UserId};
pub use self::image::{ImageFormat, ImageKind, ImageRef, ImageUpload};
pub use self::ingredient::{
    INGREDIENT_NAME_MAX, ImportReport, Ingredient, IngredientValidationError,
    MEASUREMENT_UNIT_MAX, NewIngredient, matches_prefix,
};
pub use self::ingredient_service::{IngredientCatalogService, IngredientRecord};
pub use self::listing::{PageParams, PageSlice, paginate};
pub use self::projection::{
    AuthorView, IngredientAmountView, RecipeSummaryView, RecipeView, RegisteredUserView,
    UserView, ViewProjector, project_author,
};
pub use self::recipe::{
    AMOUNT_MAX, AMOUNT_MIN, Amount, AuthorRecipes, COOKING_TIME_MAX, COOKING_TIME_MIN,
    CookingTime, IngredientLine, IngredientLines, NewRecipe, RECIPE_NAME_MAX, Recipe,
    RecipeChanges, RecipeDraft, RecipeFilter, RecipeIngredient, RecipeName, RecipeSummary,
    RecipeText, RecipeUpdate, RecipeValidationError,
};
pub use self::recipe_service::RecipeService;
pub use self::relation::{
    Edge, EdgeDelete, EdgeInsert, EdgeMessages, FAVORITE_MESSAGES, RecipeRelation,
    SELF_SUBSCRIPTION, SHOPPING_CART_MESSAGES, SUBSCRIPTION_MESSAGES, add_edge, remove_edge,
};
pub use self::relation_service::RelationService;
pub use self::shopping_list::{
    EMPTY_SHOPPING_LIST, SHOPPING_LIST_FILENAME, SHOPPING_LIST_HEADER, ShoppingList,
    ShoppingListLine,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NewUser, PERSON_NAME_MAX, PersonName, USERNAME_MAX, User, Username,
    UserValidationError,
};
pub use self::viewer::{Actor, Viewer};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use foodgram_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
