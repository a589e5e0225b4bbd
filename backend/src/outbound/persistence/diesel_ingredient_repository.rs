//! PostgreSQL-backed `IngredientRepository`.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IngredientRepository, IngredientRepositoryError};
use crate::domain::{Ingredient, IngredientId, NewIngredient};

use super::diesel_helpers::{like_prefix, map_diesel_error, map_pool_error};
use super::models::{IngredientRow, NewIngredientRow};
use super::pool::{DbPool, PoolError};
use super::schema::ingredients;

/// Diesel-backed ingredient catalogue.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> IngredientRepositoryError {
    map_pool_error(error, IngredientRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> IngredientRepositoryError {
    map_diesel_error(
        error,
        IngredientRepositoryError::query,
        IngredientRepositoryError::connection,
    )
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn search(
        &self,
        prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order_by(ingredients::name.asc())
            .into_boxed();
        if let Some(prefix) = prefix {
            query = query.filter(ingredients::name.like(like_prefix(&prefix)));
        }

        let rows: Vec<IngredientRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn find(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<IngredientRow> = ingredients::table
            .find(id.get())
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(Ingredient::from))
    }

    async fn missing(
        &self,
        ids: Vec<IngredientId>,
    ) -> Result<Vec<IngredientId>, IngredientRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let found: HashSet<i64> = ingredients::table
            .filter(ingredients::id.eq_any(&raw))
            .select(ingredients::id)
            .load::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .collect();

        Ok(ids
            .into_iter()
            .filter(|id| !found.contains(&id.get()))
            .collect())
    }

    async fn insert_missing(
        &self,
        batch: Vec<NewIngredient>,
    ) -> Result<usize, IngredientRepositoryError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<NewIngredientRow<'_>> = batch
            .iter()
            .map(|ingredient| NewIngredientRow {
                name: ingredient.name(),
                measurement_unit: ingredient.measurement_unit(),
            })
            .collect();

        diesel::insert_into(ingredients::table)
            .values(&rows)
            .on_conflict(ingredients::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)
    }
}
