//! Driving port for catalogue lookups.

use async_trait::async_trait;

use crate::domain::{Error, Ingredient, IngredientId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientsQuery: Send + Sync {
    /// Ingredients whose name starts with `prefix`, ordered by name.
    async fn search(&self, prefix: Option<String>) -> Result<Vec<Ingredient>, Error>;

    /// One ingredient, or `NotFound`.
    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error>;
}
