//! Driving port for the favorite and shopping-cart toggles.

use async_trait::async_trait;

use crate::domain::{Actor, Error, RecipeId, RecipeRelation, RecipeSummaryView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRelationsCommand: Send + Sync {
    /// Add the recipe to the actor's `kind` list and return its summary.
    async fn add(
        &self,
        actor: Actor,
        kind: RecipeRelation,
        recipe: RecipeId,
    ) -> Result<RecipeSummaryView, Error>;

    /// Remove the recipe from the actor's `kind` list.
    async fn remove(&self, actor: Actor, kind: RecipeRelation, recipe: RecipeId)
    -> Result<(), Error>;
}
