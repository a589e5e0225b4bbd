//! Port for the ingredient catalogue.

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientId, NewIngredient};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ingredient repository adapters.
    pub enum IngredientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ingredient repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ingredient repository query failed: {message}",
    }
}

/// Read access to the catalogue plus the bulk loader's write path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Ingredients whose name starts with `prefix` (case-sensitive), ordered
    /// by name. `None` returns the whole catalogue.
    async fn search(
        &self,
        prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError>;

    /// Fetch one ingredient.
    async fn find(&self, id: IngredientId)
    -> Result<Option<Ingredient>, IngredientRepositoryError>;

    /// The subset of `ids` with no catalogue entry, in input order.
    async fn missing(
        &self,
        ids: Vec<IngredientId>,
    ) -> Result<Vec<IngredientId>, IngredientRepositoryError>;

    /// Insert entries whose name is not stored yet; returns the number of
    /// rows written.
    async fn insert_missing(
        &self,
        ingredients: Vec<NewIngredient>,
    ) -> Result<usize, IngredientRepositoryError>;
}
