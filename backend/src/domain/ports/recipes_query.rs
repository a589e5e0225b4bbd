//! Driving port for recipe reads.

use async_trait::async_trait;

use crate::domain::{Error, PageParams, PageSlice, RecipeId, RecipeView, UserId, Viewer};

/// Listing filters as requested by the caller.
///
/// The two flags refer to the viewer's own relations and are ignored for
/// anonymous viewers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeListFilter {
    pub author: Option<UserId>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesQuery: Send + Sync {
    /// One page of recipes, newest first.
    async fn list(
        &self,
        viewer: Viewer,
        filter: RecipeListFilter,
        page: PageParams,
    ) -> Result<PageSlice<RecipeView>, Error>;

    /// One recipe, or `NotFound`.
    async fn get(&self, viewer: Viewer, id: RecipeId) -> Result<RecipeView, Error>;

    /// Short link token for an existing recipe.
    async fn short_link(&self, id: RecipeId) -> Result<String, Error>;
}
