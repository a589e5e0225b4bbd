//! PostgreSQL-backed `RelationRepository` over the favorites, shopping-cart
//! and subscriptions tables.
//!
//! Inserts use `ON CONFLICT DO NOTHING` against each table's unique pair
//! constraint, so a concurrent duplicate reports `AlreadyExists` instead of
//! failing. A foreign-key violation means an endpoint was deleted between
//! the service's lookup and the insert.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{RelationRepository, RelationRepositoryError};
use crate::domain::{Edge, EdgeDelete, EdgeInsert, RecipeId, RecipeRelation, UserId};

use super::diesel_helpers::{Violation, map_diesel_error, map_pool_error, violation};
use super::models::{NewFavoriteRow, NewShoppingCartRow, NewSubscriptionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorites, shopping_cart, subscriptions};

/// Diesel-backed implementation of the `RelationRepository` port.
#[derive(Clone)]
pub struct DieselRelationRepository {
    pool: DbPool,
}

impl DieselRelationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RelationRepositoryError {
    map_pool_error(error, RelationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RelationRepositoryError {
    match violation(&error) {
        Some(Violation::ForeignKey { constraint }) => {
            debug!(%constraint, "relation endpoint vanished during insert");
            if constraint.contains("recipe") {
                RelationRepositoryError::missing_endpoint("Рецепт не найден.")
            } else {
                RelationRepositoryError::missing_endpoint("Пользователь не найден.")
            }
        }
        _ => map_diesel_error(
            error,
            RelationRepositoryError::query,
            RelationRepositoryError::connection,
        ),
    }
}

fn inserted(rows: usize) -> EdgeInsert {
    if rows == 0 {
        EdgeInsert::AlreadyExists
    } else {
        EdgeInsert::Created
    }
}

fn deleted(rows: usize) -> EdgeDelete {
    if rows == 0 {
        EdgeDelete::Missing
    } else {
        EdgeDelete::Removed
    }
}

fn recipe_ids(rows: Vec<i64>) -> HashSet<RecipeId> {
    rows.into_iter().map(RecipeId::new).collect()
}

#[async_trait]
impl RelationRepository for DieselRelationRepository {
    async fn insert(
        &self,
        edge: Edge,
        added_at: DateTime<Utc>,
    ) -> Result<EdgeInsert, RelationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = match edge {
            Edge::Recipe {
                kind: RecipeRelation::Favorite,
                user,
                recipe,
            } => {
                diesel::insert_into(favorites::table)
                    .values(&NewFavoriteRow {
                        user_id: user.get(),
                        recipe_id: recipe.get(),
                        added_at,
                    })
                    .on_conflict((favorites::user_id, favorites::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
            Edge::Recipe {
                kind: RecipeRelation::ShoppingCart,
                user,
                recipe,
            } => {
                diesel::insert_into(shopping_cart::table)
                    .values(&NewShoppingCartRow {
                        user_id: user.get(),
                        recipe_id: recipe.get(),
                        added_at,
                    })
                    .on_conflict((shopping_cart::user_id, shopping_cart::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
            Edge::Subscription { follower, author } => {
                diesel::insert_into(subscriptions::table)
                    .values(&NewSubscriptionRow {
                        follower_id: follower.get(),
                        author_id: author.get(),
                        created_at: added_at,
                    })
                    .on_conflict((subscriptions::follower_id, subscriptions::author_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;

        Ok(inserted(rows))
    }

    async fn delete(&self, edge: Edge) -> Result<EdgeDelete, RelationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = match edge {
            Edge::Recipe {
                kind: RecipeRelation::Favorite,
                user,
                recipe,
            } => {
                diesel::delete(
                    favorites::table
                        .filter(favorites::user_id.eq(user.get()))
                        .filter(favorites::recipe_id.eq(recipe.get())),
                )
                .execute(&mut conn)
                .await
            }
            Edge::Recipe {
                kind: RecipeRelation::ShoppingCart,
                user,
                recipe,
            } => {
                diesel::delete(
                    shopping_cart::table
                        .filter(shopping_cart::user_id.eq(user.get()))
                        .filter(shopping_cart::recipe_id.eq(recipe.get())),
                )
                .execute(&mut conn)
                .await
            }
            Edge::Subscription { follower, author } => {
                diesel::delete(
                    subscriptions::table
                        .filter(subscriptions::follower_id.eq(follower.get()))
                        .filter(subscriptions::author_id.eq(author.get())),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(diesel_error)?;

        Ok(deleted(rows))
    }

    async fn recipe_memberships(
        &self,
        kind: RecipeRelation,
        user: UserId,
        recipes: Vec<RecipeId>,
    ) -> Result<HashSet<RecipeId>, RelationRepositoryError> {
        if recipes.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = recipes.iter().map(|id| id.get()).collect();

        let rows: Vec<i64> = match kind {
            RecipeRelation::Favorite => {
                favorites::table
                    .filter(favorites::user_id.eq(user.get()))
                    .filter(favorites::recipe_id.eq_any(&raw))
                    .select(favorites::recipe_id)
                    .load(&mut conn)
                    .await
            }
            RecipeRelation::ShoppingCart => {
                shopping_cart::table
                    .filter(shopping_cart::user_id.eq(user.get()))
                    .filter(shopping_cart::recipe_id.eq_any(&raw))
                    .select(shopping_cart::recipe_id)
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;

        Ok(recipe_ids(rows))
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: Vec<UserId>,
    ) -> Result<HashSet<UserId>, RelationRepositoryError> {
        if authors.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let raw: Vec<i64> = authors.iter().map(|id| id.get()).collect();

        let rows: Vec<i64> = subscriptions::table
            .filter(subscriptions::follower_id.eq(follower.get()))
            .filter(subscriptions::author_id.eq_any(&raw))
            .select(subscriptions::author_id)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(rows.into_iter().map(UserId::new).collect())
    }
}
