//! OpenAPI schemas for the pagination envelope.
//!
//! The `pagination` crate stays free of framework derives, so each concrete
//! `Page<T>` returned by a handler gets a mirror here.

use utoipa::ToSchema;

use crate::domain::{AuthorView, RecipeView, UserView};

macro_rules! page_schema {
    ($schema:ident, $alias:ident, $item:ty) => {
        #[doc = concat!("Page of `", stringify!($item), "` rows.")]
        #[derive(ToSchema)]
        #[schema(as = $alias)]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $schema {
            /// Total number of rows across all pages.
            #[schema(example = 12)]
            count: u64,
            /// Absolute URL of the following page.
            #[schema(example = "http://localhost:8080/api/recipes?page=3")]
            next: Option<String>,
            /// Absolute URL of the preceding page.
            #[schema(example = "http://localhost:8080/api/recipes")]
            previous: Option<String>,
            results: Vec<$item>,
        }
    };
}

page_schema!(UserPageSchema, UserPage, UserView);
page_schema!(AuthorPageSchema, AuthorPage, AuthorView);
page_schema!(RecipePageSchema, RecipePage, RecipeView);
