//! Ingredient catalogue service.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{IngredientRepository, IngredientRepositoryError, IngredientsQuery};
use crate::domain::{Error, ImportReport, Ingredient, IngredientId, NewIngredient};

pub(crate) const INGREDIENT_NOT_FOUND: &str = "Ингредиент не найден.";

pub(crate) fn map_ingredient_error(error: IngredientRepositoryError) -> Error {
    match error {
        IngredientRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ingredient repository unavailable: {message}"))
        }
        IngredientRepositoryError::Query { message } => {
            Error::internal(format!("ingredient repository error: {message}"))
        }
    }
}

/// One entry of a bulk-import file; either field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientRecord {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

/// Catalogue lookups plus the bulk import used by `load-ingredients`.
pub struct IngredientCatalogService<R> {
    repo: Arc<R>,
}

impl<R> IngredientCatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> IngredientCatalogService<R>
where
    R: IngredientRepository,
{
    /// Insert every valid record whose name is not catalogued yet.
    ///
    /// Invalid records, repeated names within `records` and names already
    /// stored all count as skipped.
    ///
    /// # Errors
    ///
    /// Fails only when the repository does.
    pub async fn import(&self, records: Vec<IngredientRecord>) -> Result<ImportReport, Error> {
        let total = records.len();
        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            match NewIngredient::try_new(
                record.name.as_deref(),
                record.measurement_unit.as_deref(),
            ) {
                Ok(ingredient) if seen.insert(ingredient.name().to_owned()) => {
                    fresh.push(ingredient);
                }
                Ok(ingredient) => {
                    debug!(index, name = ingredient.name(), "duplicate ingredient in import");
                }
                Err(reason) => debug!(index, %reason, "ingredient record skipped"),
            }
        }
        let loaded = if fresh.is_empty() {
            0
        } else {
            self.repo
                .insert_missing(fresh)
                .await
                .map_err(map_ingredient_error)?
        };
        Ok(ImportReport {
            loaded,
            skipped: total - loaded,
        })
    }
}

#[async_trait]
impl<R> IngredientsQuery for IngredientCatalogService<R>
where
    R: IngredientRepository,
{
    async fn search(&self, prefix: Option<String>) -> Result<Vec<Ingredient>, Error> {
        let prefix = prefix.filter(|value| !value.is_empty());
        self.repo.search(prefix).await.map_err(map_ingredient_error)
    }

    async fn get(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.repo
            .find(id)
            .await
            .map_err(map_ingredient_error)?
            .ok_or_else(|| Error::not_found(INGREDIENT_NOT_FOUND))
    }
}
