//! Port for recipe persistence.
//!
//! A recipe row and its ingredient lines are one unit: `create` and `update`
//! must either store both or nothing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{
    AuthorRecipes, NewRecipe, PageParams, PageSlice, Recipe, RecipeFilter, RecipeId, RecipeUpdate,
    ShoppingListLine, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// A referenced ingredient or author vanished while writing.
        MissingReference { message: String } => "recipe references a missing row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe with its lines and return the new id.
    async fn create(&self, recipe: NewRecipe) -> Result<RecipeId, RecipeRepositoryError>;

    /// Apply `update`, replacing every ingredient line. Returns `false` when
    /// the recipe does not exist.
    async fn update(
        &self,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<bool, RecipeRepositoryError>;

    /// Delete a recipe; its lines and relation edges go with it.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Fetch a recipe with author and lines.
    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// One page of recipes matching `filter`, newest first.
    async fn list(
        &self,
        filter: RecipeFilter,
        page: PageParams,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError>;

    /// Recipes of each author, newest first, truncated to `limit` when set.
    /// Authors without recipes map to an empty entry or are omitted.
    async fn author_recipes(
        &self,
        authors: Vec<UserId>,
        limit: Option<u32>,
    ) -> Result<HashMap<UserId, AuthorRecipes>, RecipeRepositoryError>;

    /// Ingredient totals over the user's shopping cart, grouped by
    /// `(name, unit)` and ordered by name.
    async fn shopping_list(
        &self,
        user: UserId,
    ) -> Result<Vec<ShoppingListLine>, RecipeRepositoryError>;
}
