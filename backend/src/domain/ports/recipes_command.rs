//! Driving port for recipe mutations.
//!
//! Every successful write answers with the read projection of the stored
//! recipe, fetched again after the write.

use async_trait::async_trait;

use crate::domain::{Actor, Error, RecipeChanges, RecipeDraft, RecipeId, RecipeView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesCommand: Send + Sync {
    /// Publish a recipe authored by `actor`.
    async fn create(&self, actor: Actor, draft: RecipeDraft) -> Result<RecipeView, Error>;

    /// Apply a partial update; author or admin only.
    async fn update(
        &self,
        actor: Actor,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<RecipeView, Error>;

    /// Delete a recipe; author or admin only.
    async fn delete(&self, actor: Actor, id: RecipeId) -> Result<(), Error>;
}
