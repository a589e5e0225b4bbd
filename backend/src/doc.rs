//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the pagination envelope schemas
//! and the session cookie security scheme. Swagger UI serves it in debug
//! builds and `openapi-dump` exports it for tooling.

use crate::domain::{
    AuthorView, Error, ErrorCode, Ingredient, IngredientAmountView, RecipeSummaryView, RecipeView,
    RegisteredUserView, UserView,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::recipes::{IngredientAmountRequest, RecipeRequest, ShortLinkResponse};
use crate::inbound::http::schemas::{AuthorPageSchema, RecipePageSchema, UserPageSchema};
use crate::inbound::http::users::{
    AvatarRequest, AvatarResponse, RegisterRequest, SetPasswordRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram backend API",
        description = "Recipes, favorites, shopping lists and author subscriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::me,
        crate::inbound::http::users::subscriptions,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::remove_avatar,
        crate::inbound::http::users::set_password,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::ingredients::search_ingredients,
        crate::inbound::http::ingredients::get_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::short_link,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_cart,
        crate::inbound::http::recipes::remove_from_cart,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        SetPasswordRequest,
        AvatarRequest,
        AvatarResponse,
        RegisteredUserView,
        UserView,
        AuthorView,
        Ingredient,
        IngredientAmountView,
        IngredientAmountRequest,
        RecipeRequest,
        RecipeView,
        RecipeSummaryView,
        ShortLinkResponse,
        UserPageSchema,
        AuthorPageSchema,
        RecipePageSchema,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Accounts, avatars and subscriptions"),
        (name = "ingredients", description = "Ingredient catalogue"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/auth/login")]
    #[case("/api/users")]
    #[case("/api/users/{id}/subscribe")]
    #[case("/api/ingredients")]
    #[case("/api/recipes/{id}")]
    #[case("/api/recipes/{id}/get-link")]
    #[case("/api/recipes/download_shopping_cart")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn recipes_support_full_and_partial_updates() {
        let doc = ApiDoc::openapi();
        let item = doc.paths.paths.get("/api/recipes/{id}").expect("recipe path");
        let put = item.put.as_ref().expect("PUT documented");
        assert_eq!(put.operation_id.as_deref(), Some("replaceRecipe"));
        assert!(item.patch.is_some(), "PATCH documented");
    }

    #[rstest]
    #[case("RecipeRequest", "ingredients")]
    #[case("RecipeView", "is_in_shopping_cart")]
    #[case("UserView", "is_subscribed")]
    #[case("RecipePage", "results")]
    fn schemas_expose_their_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
